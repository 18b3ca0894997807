#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use monk_jsonapi::fixture::Fixture;
use monk_jsonapi::{router, AppState, ServeOptions};

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/blog.yaml")
}

pub fn fixture() -> Fixture {
    Fixture::load(fixture_path()).expect("blog fixture loads")
}

pub fn app() -> Router {
    app_with(ServeOptions::default())
}

pub fn app_with(options: ServeOptions) -> Router {
    router(AppState::from_fixture(fixture(), options))
}

/// Query strings in tests are written with literal brackets for readability
pub fn encode_brackets(uri: &str) -> String {
    uri.replace('[', "%5B").replace(']', "%5D")
}

/// Drive the router in-process and decode the JSON body
pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .uri(encode_brackets(uri))
        .body(Body::empty())
        .context("failed to build request")?;

    let response = app.clone().oneshot(request).await.context("router failed")?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body for {}", uri))?;
    Ok((status, body))
}

pub fn ids(document: &Value) -> Vec<String> {
    document["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_str().map(String::from)).collect())
        .unwrap_or_default()
}

pub fn included_keys(document: &Value) -> Vec<String> {
    document["included"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| format!("{}:{}", item["type"].as_str().unwrap_or(""), item["id"].as_str().unwrap_or("")))
                .collect()
        })
        .unwrap_or_default()
}
