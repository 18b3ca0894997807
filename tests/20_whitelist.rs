mod common;

use pretty_assertions::assert_eq;

use monk_jsonapi::query::{apply_whitelist, is_field_allowed, OnDisallowed, QueryParser, ViolationCode, WhitelistOptions};

fn list(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn ancestor_entries_allow_descendants_only() {
    let allowed = strings(&["author", "comments.author"]);
    assert!(is_field_allowed("author", &allowed));
    assert!(is_field_allowed("author.profile.name", &allowed));
    assert!(is_field_allowed("comments.author.name", &allowed));
    assert!(!is_field_allowed("comments", &allowed));
    assert!(!is_field_allowed("authors", &allowed));
    assert!(!is_field_allowed("comments.body", &allowed));
}

#[test]
fn fixture_whitelist_drops_and_warns() {
    let fixture = common::fixture();
    let options = &fixture.whitelists["articles"];
    let parsed = QueryParser::default()
        .parse_str(
            "filter[status]=published&filter[internal_notes][like]=x&filter[author.name]=Ann\
             &sort=-views,body&include=author,comments.author,comments.author.articles\
             &fields[articles]=title,internal_notes&fields[comments]=body",
        )
        .unwrap();

    let result = apply_whitelist(&parsed, options);
    assert!(!result.is_rejected());
    assert_eq!(
        result.warning_messages(),
        vec![
            "Filter field 'internal_notes' is not allowed",
            "Sort field 'body' is not allowed",
            "Include 'comments.author.articles' exceeds max depth of 2",
            "Field 'internal_notes' for type 'articles' is not allowed",
        ]
    );

    let kept: Vec<_> = result.parsed.filter.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(kept, vec!["status", "author.name"]);
    assert_eq!(result.parsed.sort.len(), 1);
    assert_eq!(result.parsed.include, vec!["author", "comments.author"]);
    assert_eq!(result.parsed.fields["articles"], vec!["title"]);
    // no allow-list for comments, so the request stands
    assert_eq!(result.parsed.fields["comments"], vec!["body"]);
}

#[test]
fn error_mode_reports_every_violation_at_once() {
    let options = WhitelistOptions {
        allowed_filters: list(&["name"]),
        allowed_sorts: list(&[]),
        allowed_includes: list(&["articles"]),
        on_disallowed: OnDisallowed::Error,
        ..Default::default()
    };
    let parsed = QueryParser::default()
        .parse_str("filter[email]=a@b.c&sort=name&include=articles,articles.comments,password")
        .unwrap();

    let result = apply_whitelist(&parsed, &options);
    assert!(result.is_rejected());
    assert!(result.warnings.is_empty());

    let codes: Vec<_> = result.errors.iter().map(|v| v.code).collect();
    assert_eq!(
        codes,
        vec![ViolationCode::DisallowedFilter, ViolationCode::DisallowedSort, ViolationCode::DisallowedInclude]
    );
    assert_eq!(result.errors[2].message, "Include 'password' is not allowed");
    assert_eq!(result.errors[0].parameter, "filter[email]");
    // rejected items are still removed from the derived parse
    assert_eq!(result.parsed.include, vec!["articles", "articles.comments"]);
}

#[test]
fn depth_is_checked_before_the_allow_list() {
    let options = WhitelistOptions {
        allowed_includes: list(&["author"]),
        max_include_depth: Some(1),
        ..Default::default()
    };
    let parsed = QueryParser::default().parse_str("include=author.articles").unwrap();
    let result = apply_whitelist(&parsed, &options);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, ViolationCode::IncludeDepthExceeded);
}

#[test]
fn absent_lists_allow_everything() {
    let parsed = QueryParser::default()
        .parse_str("filter[anything]=1&sort=whatever&include=a.b.c.d&fields[x]=y")
        .unwrap();
    let result = apply_whitelist(&parsed, &WhitelistOptions::default());
    assert_eq!(result.parsed, parsed);
    assert!(result.warnings.is_empty() && result.errors.is_empty());
}
