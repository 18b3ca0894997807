mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use monk_jsonapi::query::PageDefaults;
use monk_jsonapi::ServeOptions;

#[tokio::test]
async fn health_reports_registered_types() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(&app, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], json!("ok"));
    assert_eq!(body["meta"]["types"], json!(["articles", "people", "comments"]));
    Ok(())
}

#[tokio::test]
async fn responses_use_jsonapi_media_type() -> Result<()> {
    let response = common::app()
        .oneshot(Request::builder().uri("/api/articles").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/vnd.api+json");
    Ok(())
}

#[tokio::test]
async fn collection_with_filter_sort_and_paging() -> Result<()> {
    let app = common::app();

    let (status, body) = common::get(&app, "/api/articles?filter[status]=published&sort=-views").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonapi"], json!({ "version": "1.1" }));
    assert_eq!(common::ids(&body), vec!["1", "2"]);
    assert_eq!(body["meta"]["page"], json!({ "offset": 0, "limit": 20, "total": 2 }));
    assert!(body["data"][0]["attributes"].get("internal_notes").is_none());

    let (_, body) = common::get(&app, "/api/articles?page[limit]=1&page[offset]=1&sort=views").await?;
    assert_eq!(common::ids(&body), vec!["4"]);
    assert_eq!(body["meta"]["page"]["total"], json!(4));
    assert_eq!(body["links"]["first"], json!("/api/articles?sort=views&page[offset]=0&page[limit]=1"));
    assert_eq!(body["links"]["prev"], json!("/api/articles?sort=views&page[offset]=0&page[limit]=1"));
    assert_eq!(body["links"]["next"], json!("/api/articles?sort=views&page[offset]=2&page[limit]=1"));
    assert_eq!(body["links"]["last"], json!("/api/articles?sort=views&page[offset]=3&page[limit]=1"));
    Ok(())
}

#[tokio::test]
async fn filters_on_renamed_and_related_fields() -> Result<()> {
    let app = common::app();

    let (_, body) = common::get(&app, "/api/articles?filter[publishedAt][gte]=2024-01-01&sort=publishedAt").await?;
    assert_eq!(common::ids(&body), vec!["1", "2"]);

    let (_, body) = common::get(&app, "/api/articles?filter[author.name]=Bo%20Chen").await?;
    assert_eq!(common::ids(&body), vec!["2"]);

    let (_, body) = common::get(&app, "/api/articles?filter[publishedAt][null]=true").await?;
    assert_eq!(common::ids(&body), vec!["3"]);
    Ok(())
}

#[tokio::test]
async fn relationship_id_and_attribute_filters_combine() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(&app, "/api/articles?filter[author]=1&filter[author.name]=Ann%20Lee").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::ids(&body), vec!["1", "3"]);
    Ok(())
}

#[tokio::test]
async fn non_ascii_digits_in_dates_are_plain_strings() -> Result<()> {
    let app = common::app();
    let (status, body) =
        common::get(&app, "/api/articles?filter[publishedAt][gt]=2024-01-01T00:00:00-0%D9%A1:00").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_array());
    Ok(())
}

#[tokio::test]
async fn record_with_includes_and_sparse_fields() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(
        &app,
        "/api/articles/1?include=author,comments.author&fields[articles]=title&fields[people]=name",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attributes"], json!({ "title": "Understanding Ownership" }));
    assert_eq!(body["data"]["relationships"]["author"]["data"], json!({ "type": "people", "id": "1" }));
    assert_eq!(
        common::included_keys(&body),
        vec!["people:1", "comments:c1", "comments:c2", "people:2", "people:3"]
    );
    assert_eq!(body["included"][0]["attributes"], json!({ "name": "Ann Lee" }));
    assert!(body.get("meta").is_none());
    Ok(())
}

#[tokio::test]
async fn ignored_violations_surface_as_warnings() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(
        &app,
        "/api/articles/2?filter[internal_notes]=x&include=comments.author.articles&fields[people]=email",
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["meta"]["warnings"],
        json!([
            "Filter field 'internal_notes' is not allowed",
            "Include 'comments.author.articles' exceeds max depth of 2",
            "Field 'email' for type 'people' is not allowed"
        ])
    );
    assert!(body.get("included").is_none());
    Ok(())
}

#[tokio::test]
async fn error_mode_rejects_with_jsonapi_errors() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(&app, "/api/people?filter[email]=ann@example.com&sort=email").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "jsonapi": { "version": "1.1" },
            "errors": [
                {
                    "status": "400",
                    "code": "DISALLOWED_FILTER",
                    "title": "Disallowed filter",
                    "detail": "Filter field 'email' is not allowed",
                    "source": { "parameter": "filter[email]" }
                },
                {
                    "status": "400",
                    "code": "DISALLOWED_SORT",
                    "title": "Disallowed sort",
                    "detail": "Sort field 'email' is not allowed",
                    "source": { "parameter": "sort" }
                }
            ]
        })
    );
    Ok(())
}

#[tokio::test]
async fn malformed_operands_are_bad_requests() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(&app, "/api/articles?filter[views][between]=10").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["code"], json!("INVALID_FILTER_VALUE"));
    assert_eq!(body["errors"][0]["source"]["parameter"], json!("filter[views][between]"));
    Ok(())
}

#[tokio::test]
async fn unknown_types_and_records_are_not_found() -> Result<()> {
    let app = common::app();

    let (status, body) = common::get(&app, "/api/widgets").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["code"], json!("NOT_FOUND"));

    let (status, body) = common::get(&app, "/api/articles/99").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["detail"], json!("Resource 'articles' with id '99' not found"));
    Ok(())
}

#[tokio::test]
async fn describe_returns_metadata_whitelist_and_rules() -> Result<()> {
    let app = common::app();
    let (status, body) = common::get(&app, "/meta/articles").await?;

    assert_eq!(status, StatusCode::OK);
    let meta = &body["meta"];
    assert_eq!(meta["resource"]["type"], json!("articles"));
    assert_eq!(meta["resource"]["relationships"][0]["targetType"], json!("people"));
    assert_eq!(meta["whitelist"]["maxIncludeDepth"], json!(2));
    assert_eq!(meta["rules"].as_array().map(Vec::len), Some(3));

    let (_, body) = common::get(&app, "/meta/comments").await?;
    assert_eq!(body["meta"]["rules"], json!([]));
    assert_eq!(body["meta"]["whitelist"], json!({ "onDisallowed": "ignore" }));
    Ok(())
}

#[tokio::test]
async fn configured_limits_and_base_url_apply() -> Result<()> {
    let app = common::app_with(ServeOptions {
        page_defaults: PageDefaults { default_limit: 2, max_limit: 3 },
        max_include_depth: Some(1),
        base_url: "https://api.example.com".into(),
        ..Default::default()
    });

    let (_, body) = common::get(&app, "/api/articles?sort=views").await?;
    assert_eq!(common::ids(&body), vec!["3", "4"]);
    assert_eq!(body["links"]["next"], json!("https://api.example.com/api/articles?sort=views&page[offset]=2&page[limit]=2"));

    let (_, body) = common::get(&app, "/api/comments?page[limit]=50").await?;
    assert_eq!(body["meta"]["page"]["limit"], json!(3));

    // articles keep their own depth of 2, comments fall back to 1
    let (_, body) = common::get(&app, "/api/comments/c1?include=article.author").await?;
    assert_eq!(body["meta"]["warnings"], json!(["Include 'article.author' exceeds max depth of 1"]));
    let (_, body): (StatusCode, Value) = common::get(&app, "/api/articles/1?include=comments.author").await?;
    assert!(body.get("meta").is_none());
    Ok(())
}
