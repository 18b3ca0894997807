use serde::Serialize;
use url::form_urlencoded;

/// Collection navigation links. `prev`/`next` serialize as explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

/// What the link builder needs to know about the current request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
    /// Absolute or relative collection URL without a query string
    pub base_url: String,
    /// Caller's query pairs; `page[...]` entries are replaced
    pub params: Vec<(String, String)>,
}

impl PageContext {
    pub fn meta(&self) -> PageMeta {
        PageMeta { offset: self.offset, limit: self.limit, total: self.total }
    }

    pub fn links(&self) -> PaginationLinks {
        build_links(&self.base_url, &self.params, self.offset, self.limit, self.total)
    }
}

/// Offsets for first/last/prev/next from `{offset, limit, total}`
pub fn page_offsets(offset: u64, limit: u64, total: u64) -> (u64, u64, Option<u64>, Option<u64>) {
    let limit = limit.max(1);
    let total_pages = total.div_ceil(limit);
    let current_page = offset / limit;

    let last = total_pages.saturating_sub(1) * limit;
    let prev = (current_page > 0).then(|| offset.saturating_sub(limit));
    let next = (offset + limit < total).then_some(offset + limit);

    (0, last, prev, next)
}

pub fn build_links(
    base_url: &str,
    params: &[(String, String)],
    offset: u64,
    limit: u64,
    total: u64,
) -> PaginationLinks {
    let preserved: Vec<&(String, String)> = params.iter().filter(|(k, _)| !k.starts_with("page[")).collect();
    let link = |page_offset: u64| {
        let mut query: Vec<String> = preserved
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect();
        query.push(format!("page[offset]={}", page_offset));
        query.push(format!("page[limit]={}", limit.max(1)));
        format!("{}?{}", base_url, query.join("&"))
    };

    let (first, last, prev, next) = page_offsets(offset, limit, total);
    PaginationLinks {
        first: link(first),
        last: link(last),
        prev: prev.map(link),
        next: next.map(link),
    }
}

// brackets and commas stay readable in generated links
fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace("%5B", "[")
        .replace("%5D", "]")
        .replace("%2C", ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn middle_of_three_pages() {
        assert_eq!(page_offsets(20, 20, 45), (0, 40, Some(0), Some(40)));
    }

    #[test]
    fn last_page_has_no_next() {
        let (_, last, prev, next) = page_offsets(40, 20, 45);
        assert_eq!(last, 40);
        assert_eq!(prev, Some(20));
        assert_eq!(next, None);
    }

    #[test]
    fn first_page_has_no_prev() {
        let (_, _, prev, next) = page_offsets(0, 20, 45);
        assert_eq!(prev, None);
        assert_eq!(next, Some(20));
    }

    #[test]
    fn empty_collection() {
        assert_eq!(page_offsets(0, 10, 0), (0, 0, None, None));
    }

    #[test]
    fn unaligned_offset_floors_prev_at_zero() {
        let (_, _, prev, _) = page_offsets(15, 10, 100);
        assert_eq!(prev, Some(5));
        let (_, _, prev, _) = page_offsets(12, 10, 100);
        assert_eq!(prev, Some(2));
    }

    #[test]
    fn links_preserve_non_page_params() {
        let params = vec![
            ("filter[status]".to_string(), "published".to_string()),
            ("page[offset]".to_string(), "20".to_string()),
            ("include".to_string(), "author,comments".to_string()),
            ("page[limit]".to_string(), "20".to_string()),
        ];
        let links = build_links("/api/articles", &params, 20, 20, 45);
        assert_eq!(
            links.next.as_deref(),
            Some("/api/articles?filter[status]=published&include=author,comments&page[offset]=40&page[limit]=20")
        );
        assert_eq!(
            links.first,
            "/api/articles?filter[status]=published&include=author,comments&page[offset]=0&page[limit]=20"
        );
        assert!(links.prev.unwrap().contains("page[offset]=0"));
        assert!(links.last.contains("page[offset]=40"));
    }

    #[test]
    fn missing_links_serialize_as_null() {
        let links = build_links("/api/articles", &[], 0, 10, 5);
        let value = serde_json::to_value(&links).unwrap();
        assert!(value["prev"].is_null());
        assert!(value["next"].is_null());
        assert!(value.as_object().unwrap().contains_key("prev"));
    }
}
