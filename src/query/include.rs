use std::collections::BTreeMap;

/// Comma-separated include paths; existence is checked later by the serializer.
pub fn parse_include(raw: &str) -> Vec<String> {
    split_list(raw)
}

/// `fields[type]=a,b` pairs into a per-type sparse fieldset map
pub fn parse_fields<'a>(members: impl IntoIterator<Item = (&'a str, &'a str)>) -> BTreeMap<String, Vec<String>> {
    let mut fields = BTreeMap::new();
    for (resource_type, list) in members {
        let resource_type = resource_type.trim();
        if resource_type.is_empty() {
            continue;
        }
        fields.insert(resource_type.to_string(), split_list(list));
    }
    fields
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
