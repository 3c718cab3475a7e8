use crate::codec::{self, JsonValue};
use crate::config::Config;
use crate::error::{Result, SearchcodeError};
use crate::filters;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{
    results_from_tree, CodeRecord, PagedResults, SearchOutcome, SearchRequest, SearchResponse,
    SearchResult,
};
use std::sync::Arc;
use std::time::Duration;

/// Public searchcode API root
pub const DEFAULT_BASE_URL: &str = "https://searchcode.com/api";

/// Upper bound on pages fetched by one aggregated search
pub const MAX_PAGES: u32 = 5;

const PROJECT_URL: &str = "https://crates.io/crates/searchcode";

/// Progress of an aggregated search, reported after every page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-based index of the page just fetched
    pub iteration: u32,
    /// Effective page bound after clamping
    pub pages: u32,
    pub collected: usize,
}

/// searchcode API client
///
/// Holds no mutable state after construction, so one instance can be cloned
/// or shared between tasks freely.
#[derive(Clone)]
pub struct SearchcodeClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    user_agent: String,
}

impl SearchcodeClient {
    /// Create a client for the public API.
    ///
    /// `user_agent` identifies the caller; spaces are replaced with `-`.
    pub fn new(user_agent: &str) -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: user_agent_header(user_agent),
        }
    }

    /// Build a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = match config.timeout_secs {
            Some(secs) => ReqwestTransport::with_timeout(Duration::from_secs(secs))?,
            None => ReqwestTransport::new(),
        };

        Ok(Self::new(&config.user_agent)
            .with_base_url(&config.base_url)
            .with_transport(Arc::new(transport)))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Full `User-Agent` header value sent with every request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search the code index.
    ///
    /// With a callback set the JSONP endpoint is used and the body is returned
    /// untouched. Otherwise the body is decoded and `results` is cut down to at
    /// most `per_page` entries.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        request.validate()?;
        let params = search_params(request)?;

        let endpoint = if request.is_jsonp() {
            "jsonp_codesearch_I/"
        } else {
            "codesearch_I/"
        };

        tracing::debug!(
            query = %request.query,
            page = request.page,
            per_page = request.per_page,
            jsonp = request.is_jsonp(),
            "searching code index"
        );

        let body = self.get(endpoint, &params).await?;
        if request.is_jsonp() {
            return Ok(SearchOutcome::Jsonp(body));
        }

        let mut response = SearchResponse::from_tree(parse_body(endpoint, body)?, endpoint)?;
        warn_on_facet_drift(&response);

        let per_page = request.per_page as usize;
        if response.results.len() > per_page {
            tracing::debug!(
                received = response.results.len(),
                per_page,
                "server returned more results than requested, truncating"
            );
            response.results.truncate(per_page);
        }

        tracing::debug!(
            result_count = response.results.len(),
            total = response.total,
            "search completed"
        );

        Ok(SearchOutcome::Results(response))
    }

    /// Fetch up to `pages` consecutive pages starting at `request.page`.
    pub async fn search_pages(&self, request: &SearchRequest, pages: u32) -> Result<PagedResults> {
        self.search_pages_with_progress(request, pages, |_| {}).await
    }

    /// Like [`search_pages`](Self::search_pages), calling `on_page` after each page.
    ///
    /// `pages` is clamped to `1..=MAX_PAGES`. Pages are requested one after
    /// another and the loop stops once the collected count reaches the
    /// reported total, a page comes back empty, or the bound is used up.
    pub async fn search_pages_with_progress<F>(
        &self,
        request: &SearchRequest,
        pages: u32,
        mut on_page: F,
    ) -> Result<PagedResults>
    where
        F: FnMut(PageProgress),
    {
        if request.is_jsonp() {
            return Err(SearchcodeError::InvalidRequest(
                "JSONP requests are single-shot and cannot be paginated".into(),
            ));
        }

        let pages = clamp_pages(pages);
        let mut collected = PagedResults {
            results: Vec::new(),
            total: 0,
            pages_fetched: 0,
        };
        let mut page_request = request.clone();

        for iteration in 1..=pages {
            let outcome = self.search(&page_request).await?;
            let Some(response) = outcome.into_results() else {
                break;
            };
            collected.pages_fetched += 1;

            if response.results.is_empty() {
                tracing::debug!(page = page_request.page, "empty page, stopping");
                break;
            }

            collected.total = response.total;
            collected.results.extend(response.results);

            on_page(PageProgress {
                iteration,
                pages,
                collected: collected.results.len(),
            });

            if collected.results.len() as u64 >= collected.total {
                tracing::debug!(total = collected.total, "all results collected");
                break;
            }

            let Some(next_page) = page_request.page.checked_add(1) else {
                tracing::debug!(page = page_request.page, "page number exhausted, stopping");
                break;
            };
            page_request.page = next_page;
        }

        Ok(collected)
    }

    /// Raw contents of one indexed file.
    ///
    /// An unknown id is not an error: the returned record has no code.
    pub async fn code_result(&self, id: u64) -> Result<CodeRecord> {
        let endpoint = format!("result/{id}");
        let body = self.get(&endpoint, &[]).await?;
        let record = CodeRecord::from_tree(parse_body(&endpoint, body)?, &endpoint)?;

        if !record.is_found() {
            tracing::debug!(id, "no code file for id");
        }
        Ok(record)
    }

    /// Results the service considers duplicates of `id`
    pub async fn related_results(&self, id: u64) -> Result<Vec<SearchResult>> {
        let endpoint = format!("related_results/{id}");
        let body = self.get(&endpoint, &[]).await?;
        results_from_tree(parse_body(&endpoint, body)?, &endpoint)
    }

    async fn get(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let headers = [("User-Agent", self.user_agent.clone())];

        tracing::debug!(url = %url, param_count = params.len(), "sending request");

        let response = self.transport.get(&url, params, &headers).await?;

        if !response.is_success() {
            tracing::warn!(
                status = response.status,
                endpoint = %endpoint,
                body = %excerpt(&response.body),
                "searchcode api returned error"
            );
            return Err(SearchcodeError::Request {
                status: response.status,
                endpoint: endpoint.to_string(),
            });
        }

        tracing::trace!(status = response.status, bytes = response.body.len(), "response received");
        Ok(response.body)
    }
}

/// Wire parameters for a search, in the order they are sent.
///
/// Filters are resolved here, so unknown names fail before any request is made.
/// Absent optional values produce no parameter at all.
pub fn search_params(request: &SearchRequest) -> Result<Vec<(&'static str, String)>> {
    let language_ids = filters::language_ids(request.languages.as_slice())?;
    let source_ids = filters::source_ids(request.sources.as_slice())?;

    let mut params = vec![
        ("q", request.query.clone()),
        ("p", request.page.to_string()),
        ("per_page", request.per_page.to_string()),
    ];
    if let Some(gt) = request.lines_of_code_gt {
        params.push(("loc", gt.to_string()));
    }
    if let Some(lt) = request.lines_of_code_lt {
        params.push(("loc2", lt.to_string()));
    }
    if let Some(callback) = &request.callback {
        params.push(("callback", callback.clone()));
    }
    params.extend(language_ids.into_iter().map(|id| ("lan", id.to_string())));
    params.extend(source_ids.into_iter().map(|id| ("src", id.to_string())));

    Ok(params)
}

/// Clamp a requested page count into `1..=MAX_PAGES`
pub fn clamp_pages(pages: u32) -> u32 {
    pages.clamp(1, MAX_PAGES)
}

fn warn_on_facet_drift(response: &SearchResponse) {
    let drift = filters::facet_drift(filters::FilterKind::Language, &response.language_filters)
        .into_iter()
        .chain(filters::facet_drift(filters::FilterKind::Source, &response.source_filters));
    for entry in drift {
        tracing::warn!(
            kind = %entry.kind,
            name = %entry.name,
            service_id = entry.service_id,
            table_id = ?entry.table_id,
            "filter table disagrees with service facets"
        );
    }
}

fn user_agent_header(identifier: &str) -> String {
    format!(
        "{} (Rust searchcode/{} on {}-{}; +{})",
        identifier.trim().replace(' ', "-"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        PROJECT_URL
    )
}

fn parse_body(endpoint: &str, body: String) -> Result<JsonValue> {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => Ok(codec::decode(value)),
        Err(source) => Err(SearchcodeError::Decode {
            endpoint: endpoint.to_string(),
            body,
            source,
        }),
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Recorded {
        url: String,
        query: Vec<(&'static str, String)>,
        headers: Vec<(&'static str, String)>,
    }

    /// Replays canned responses in order, repeating the last one
    struct FakeTransport {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<Recorded>>,
    }

    impl FakeTransport {
        fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn json(values: Vec<serde_json::Value>) -> Arc<Self> {
            Self::new(
                values
                    .into_iter()
                    .map(|v| HttpResponse {
                        status: 200,
                        body: v.to_string(),
                    })
                    .collect(),
            )
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(
            &self,
            url: &str,
            query: &[(&'static str, String)],
            headers: &[(&'static str, String)],
        ) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(Recorded {
                url: url.to_string(),
                query: query.to_vec(),
                headers: headers.to_vec(),
            });
            let mut responses = self.responses.lock().unwrap();
            let response = if responses.len() > 1 {
                responses.pop_front().unwrap()
            } else {
                responses.front().cloned().unwrap()
            };
            Ok(response)
        }
    }

    fn client(transport: Arc<FakeTransport>) -> SearchcodeClient {
        SearchcodeClient::new("unit tests")
            .with_base_url("http://fake/api/")
            .with_transport(transport)
    }

    fn page(count: usize, total: u64) -> serde_json::Value {
        let results: Vec<_> = (0..count)
            .map(|i| json!({"id": i, "filename": format!("f{i}.rs"), "lines": {}}))
            .collect();
        json!({"results": results, "total": total})
    }

    fn keys(query: &[(&'static str, String)]) -> Vec<&'static str> {
        query.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_user_agent_header_format() {
        let ua = user_agent_header("my tool");
        assert!(ua.starts_with("my-tool (Rust searchcode/"));
        assert!(ua.ends_with("; +https://crates.io/crates/searchcode)"));
    }

    #[test]
    fn test_search_params_omit_absent_values() {
        let params = search_params(&SearchRequest::new("gsub")).unwrap();
        assert_eq!(keys(&params), vec!["q", "p", "per_page"]);
    }

    #[test]
    fn test_search_params_zero_bound_is_sent() {
        let params = search_params(&SearchRequest::new("gsub").lines_of_code_gt(0)).unwrap();
        assert!(params.contains(&("loc", "0".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "loc2"));
    }

    #[test]
    fn test_search_params_full() {
        let request = SearchRequest::new("fn main()")
            .page(2)
            .per_page(10)
            .languages(["Rust", "Go"])
            .sources(["github"])
            .lines_of_code_gt(5)
            .lines_of_code_lt(500)
            .callback("cb");
        let params = search_params(&request).unwrap();
        assert_eq!(
            params,
            vec![
                ("q", "fn main()".to_string()),
                ("p", "2".to_string()),
                ("per_page", "10".to_string()),
                ("loc", "5".to_string()),
                ("loc2", "500".to_string()),
                ("callback", "cb".to_string()),
                ("lan", "49".to_string()),
                ("lan", "24".to_string()),
                ("src", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_clamp_pages() {
        assert_eq!(clamp_pages(0), 1);
        assert_eq!(clamp_pages(3), 3);
        assert_eq!(clamp_pages(37), MAX_PAGES);
    }

    #[tokio::test]
    async fn test_unknown_filter_issues_no_request() {
        let transport = FakeTransport::json(vec![page(1, 1)]);
        let err = client(transport.clone())
            .search(&SearchRequest::new("q").languages(["UnknownXYZ"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchcodeError::UnknownFilter(ref e) if e.name == "UnknownXYZ"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_truncates_to_per_page() {
        let transport = FakeTransport::json(vec![page(8, 100)]);
        let outcome = client(transport.clone())
            .search(&SearchRequest::new("q").per_page(3))
            .await
            .unwrap();

        let response = outcome.into_results().unwrap();
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.total, 100);
        assert_eq!(response.results[0].id(), Some(0));

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://fake/api/codesearch_I/");
        assert_eq!(requests[0].headers[0].0, "User-Agent");
        assert!(requests[0].headers[0].1.starts_with("unit-tests ("));
    }

    #[tokio::test]
    async fn test_jsonp_returns_raw_text_from_one_request() {
        let transport = FakeTransport::new(vec![HttpResponse {
            status: 200,
            body: "cb({\"results\": []})".to_string(),
        }]);
        let outcome = client(transport.clone())
            .search(&SearchRequest::new("q").callback("cb"))
            .await
            .unwrap();

        assert_eq!(outcome, SearchOutcome::Jsonp("cb({\"results\": []})".to_string()));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://fake/api/jsonp_codesearch_I/");
    }

    #[tokio::test]
    async fn test_search_pages_rejects_jsonp() {
        let transport = FakeTransport::json(vec![page(1, 1)]);
        let err = client(transport.clone())
            .search_pages(&SearchRequest::new("q").callback("cb"), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchcodeError::InvalidRequest(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_pages_clamps_to_one() {
        let transport = FakeTransport::json(vec![page(2, 1000)]);
        let paged = client(transport.clone())
            .search_pages(&SearchRequest::new("q").per_page(2), 0)
            .await
            .unwrap();

        assert_eq!(paged.pages_fetched, 1);
        assert_eq!(paged.results.len(), 2);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_search_pages_clamps_to_max_and_increments_page() {
        let transport = FakeTransport::json(vec![page(2, 1000)]);
        let mut progress = Vec::new();
        let paged = client(transport.clone())
            .search_pages_with_progress(&SearchRequest::new("q").page(3).per_page(2), 37, |p| {
                progress.push(p)
            })
            .await
            .unwrap();

        assert_eq!(paged.pages_fetched, MAX_PAGES);
        assert_eq!(paged.results.len(), 10);
        assert_eq!(paged.total, 1000);

        let pages: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| r.query.iter().find(|(k, _)| *k == "p").unwrap().1.clone())
            .collect();
        assert_eq!(pages, vec!["3", "4", "5", "6", "7"]);

        assert_eq!(progress.len(), 5);
        assert_eq!(progress[4], PageProgress { iteration: 5, pages: 5, collected: 10 });
    }

    #[tokio::test]
    async fn test_search_pages_stops_at_total() {
        let transport = FakeTransport::json(vec![page(2, 3), page(2, 3), page(2, 3)]);
        let paged = client(transport.clone())
            .search_pages(&SearchRequest::new("q").per_page(2), 5)
            .await
            .unwrap();

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(paged.results.len(), 4);
        assert_eq!(paged.total, 3);
    }

    #[tokio::test]
    async fn test_search_pages_stops_on_empty_page() {
        let transport = FakeTransport::json(vec![page(2, 50), page(0, 50)]);
        let paged = client(transport.clone())
            .search_pages(&SearchRequest::new("q").per_page(2), 5)
            .await
            .unwrap();

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(paged.pages_fetched, 2);
        assert_eq!(paged.results.len(), 2);
    }

    #[tokio::test]
    async fn test_search_pages_stops_at_last_page_number() {
        let transport = FakeTransport::json(vec![page(1, 1000)]);
        let paged = client(transport.clone())
            .search_pages(&SearchRequest::new("q").page(u32::MAX).per_page(1), 2)
            .await
            .unwrap();

        assert_eq!(paged.pages_fetched, 1);
        assert_eq!(paged.results.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_search_keeps_results_when_facets_disagree() {
        let transport = FakeTransport::json(vec![json!({
            "total": 1,
            "results": [{"id": 1}],
            "language_filters": [{"count": 1, "id": 9999, "language": "Rust"}]
        })]);
        let response = client(transport)
            .search(&SearchRequest::new("q"))
            .await
            .unwrap()
            .into_results()
            .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.language_filters[0].id, 9999);
    }

    #[tokio::test]
    async fn test_code_result_not_found_is_empty_record() {
        let transport = FakeTransport::json(vec![json!({})]);
        let record = client(transport.clone()).code_result(42).await.unwrap();

        assert!(!record.is_found());
        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://fake/api/result/42");
        assert!(requests[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_maps_to_request_error() {
        let transport = FakeTransport::new(vec![HttpResponse {
            status: 503,
            body: "unavailable".into(),
        }]);
        let err = client(transport.clone()).related_results(7).await.unwrap_err();

        match err {
            SearchcodeError::Request { status, endpoint } => {
                assert_eq!(status, 503);
                assert_eq!(endpoint, "related_results/7");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_body() {
        let transport = FakeTransport::new(vec![HttpResponse {
            status: 200,
            body: "<html>oops</html>".into(),
        }]);
        let err = client(transport).search(&SearchRequest::new("q")).await.unwrap_err();

        match err {
            SearchcodeError::Decode { endpoint, body, .. } => {
                assert_eq!(endpoint, "codesearch_I/");
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_excerpt_limits_length() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), 200);
        assert_eq!(excerpt("short"), "short");
    }
}
