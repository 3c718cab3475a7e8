//! Common test utilities: a mock searchcode API and response fixtures

#![allow(dead_code)]

use searchcode::SearchcodeClient;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Mock API server plus a client pointed at it
pub struct MockApi {
    pub server: MockServer,
    pub client: SearchcodeClient,
}

impl MockApi {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client = SearchcodeClient::new("searchcode tests").with_base_url(&format!("{}/api", server.uri()));
        Self { server, client }
    }

    /// Query pairs of every request the server has seen, in arrival order
    pub async fn received_queries(&self) -> Vec<Vec<(String, String)>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                request
                    .url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .collect()
    }
}

/// A single search result as the API returns it
pub fn result_json(id: u64, filename: &str, language: &str) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "repo": "https://github.com/example/project",
        "language": language,
        "linescount": 120,
        "location": "/src",
        "name": "project",
        "url": format!("https://searchcode.com/codesearch/view/{id}/"),
        "md5hash": "d41d8cd98f00b204e9800998ecf8427e",
        "lines": {
            "3": "fn main() {",
            "4": "    println!(\"hi\");"
        }
    })
}

/// A search response page with `count` results numbered from `first_id`
pub fn page_json(first_id: u64, count: u64, total: u64) -> Value {
    let results: Vec<Value> = (first_id..first_id + count)
        .map(|id| result_json(id, &format!("file{id}.rs"), "Rust"))
        .collect();
    json!({
        "matchterm": "fn main()",
        "previouspage": null,
        "searchterm": "fn main()",
        "query": "fn main()",
        "total": total,
        "page": 0,
        "nextpage": 1,
        "results": results,
        "language_filters": [],
        "source_filters": []
    })
}
