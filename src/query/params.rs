use url::form_urlencoded;

/// Filter entry as it appeared on the wire, before operator validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFilter {
    /// `filter[field]=value`
    Scalar(String),
    /// `filter[field][op]=value`, in request order
    Operators(Vec<(String, String)>),
}

/// Decoded query string. Keeps every pair in request order so that
/// pagination links can carry the non-page parameters forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self { pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value for a plain (unbracketed) key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First value for `namespace[member]`
    pub fn member(&self, namespace: &str, member: &str) -> Option<&str> {
        self.pairs.iter().find_map(|(k, v)| match split_key(k) {
            Some((name, segments)) if name == namespace && segments == [member] => Some(v.as_str()),
            _ => None,
        })
    }

    /// All `namespace[member]=value` pairs with exactly one bracket segment
    pub fn members(&self, namespace: &str) -> Vec<(&str, &str)> {
        self.pairs
            .iter()
            .filter_map(|(k, v)| match split_key(k) {
                Some((name, segments)) if name == namespace && segments.len() == 1 => {
                    Some((segments[0], v.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    /// Group the `filter` namespace by field, preserving first-seen order.
    /// Keys with no field or more than one operator segment are ignored.
    pub fn filters(&self) -> Vec<(String, RawFilter)> {
        let mut grouped: Vec<(String, RawFilter)> = Vec::new();

        for (key, value) in &self.pairs {
            let Some((name, segments)) = split_key(key) else { continue };
            if name != "filter" {
                continue;
            }
            let (field, operator) = match segments.as_slice() {
                [field] => (*field, None),
                [field, op] => (*field, Some(*op)),
                _ => continue,
            };

            let Some(idx) = grouped.iter().position(|(f, _)| f == field) else {
                let initial = match operator {
                    None => RawFilter::Scalar(value.clone()),
                    Some(op) => RawFilter::Operators(vec![(op.to_string(), value.clone())]),
                };
                grouped.push((field.to_string(), initial));
                continue;
            };

            let entry = &mut grouped[idx].1;
            *entry = match (std::mem::replace(entry, RawFilter::Operators(Vec::new())), operator) {
                (RawFilter::Scalar(_), None) => RawFilter::Scalar(value.clone()),
                (RawFilter::Scalar(previous), Some(op)) => RawFilter::Operators(vec![
                    ("eq".to_string(), previous),
                    (op.to_string(), value.clone()),
                ]),
                (RawFilter::Operators(mut ops), op) => {
                    ops.push((op.unwrap_or("eq").to_string(), value.clone()));
                    RawFilter::Operators(ops)
                }
            };
        }

        grouped
    }

    /// Every pair except the `page[...]` family
    pub fn without_page(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .filter(|(k, _)| !k.starts_with("page["))
            .cloned()
            .collect()
    }
}

/// Split `filter[a][b]` into `("filter", ["a", "b"])`. Returns `None` for
/// keys with unbalanced or nested brackets.
pub fn split_key(key: &str) -> Option<(&str, Vec<&str>)> {
    let Some(open) = key.find('[') else {
        return Some((key, Vec::new()));
    };
    let (name, mut rest) = key.split_at(open);
    let mut segments = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.contains('[') {
            return None;
        }
        segments.push(segment);
        rest = &inner[close + 1..];
    }
    Some((name, segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_percent_encoded_brackets() {
        let params = QueryParams::parse("?filter%5Bage%5D%5Bgte%5D=18&sort=-title");
        assert_eq!(params.pairs()[0], ("filter[age][gte]".to_string(), "18".to_string()));
        assert_eq!(params.first("sort"), Some("-title"));
    }

    #[test]
    fn split_key_handles_malformed_keys() {
        assert_eq!(split_key("sort"), Some(("sort", vec![])));
        assert_eq!(split_key("filter[a][b]"), Some(("filter", vec!["a", "b"])));
        assert_eq!(split_key("filter[a"), None);
        assert_eq!(split_key("filter[a]x"), None);
        assert_eq!(split_key("filter[a[b]]"), None);
    }

    #[test]
    fn filters_group_operators_by_field() {
        let params = QueryParams::parse(
            "filter[age][gte]=18&filter[status]=published&filter[age][lt]=65&filter[a][b][c]=1&filter=x",
        );
        assert_eq!(
            params.filters(),
            vec![
                (
                    "age".to_string(),
                    RawFilter::Operators(vec![
                        ("gte".to_string(), "18".to_string()),
                        ("lt".to_string(), "65".to_string()),
                    ])
                ),
                ("status".to_string(), RawFilter::Scalar("published".to_string())),
            ]
        );
    }

    #[test]
    fn scalar_and_operator_forms_combine() {
        let params = QueryParams::parse("filter[age]=30&filter[age][ne]=31");
        assert_eq!(
            params.filters(),
            vec![(
                "age".to_string(),
                RawFilter::Operators(vec![
                    ("eq".to_string(), "30".to_string()),
                    ("ne".to_string(), "31".to_string()),
                ])
            )]
        );
    }

    #[test]
    fn members_and_without_page() {
        let params = QueryParams::parse("fields[articles]=title&page[limit]=5&include=author");
        assert_eq!(params.members("fields"), vec![("articles", "title")]);
        assert_eq!(params.member("page", "limit"), Some("5"));
        assert_eq!(
            params.without_page(),
            vec![
                ("fields[articles]".to_string(), "title".to_string()),
                ("include".to_string(), "author".to_string()),
            ]
        );
    }
}
