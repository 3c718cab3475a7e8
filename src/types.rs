use crate::codec::JsonValue;
use crate::error::{Result, SearchcodeError};

/// Largest page size the API accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Largest valid value for either line-count bound
pub const MAX_LINES_OF_CODE: u32 = 10_000;

/// Parameters of a code search
///
/// ```
/// use searchcode::SearchRequest;
///
/// let request = SearchRequest::new("fn main()")
///     .per_page(20)
///     .languages(["Rust", "Go"])
///     .lines_of_code_lt(500);
/// assert_eq!(request.query, "fn main()");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search term. Textual filters such as `ext:erb`, `lang:python` or
    /// `repo:quake` can be embedded directly.
    pub query: String,
    /// Result page, starting at 0
    pub page: u32,
    /// Results per page, 1 to 100
    pub per_page: u32,
    pub languages: Vec<String>,
    pub sources: Vec<String>,
    /// Only files with more lines than this (sent as `loc`)
    pub lines_of_code_gt: Option<u32>,
    /// Only files with fewer lines than this (sent as `loc2`)
    pub lines_of_code_lt: Option<u32>,
    /// JSONP callback name. Switches the request to the JSONP endpoint.
    pub callback: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 0,
            per_page: MAX_PER_PAGE,
            languages: Vec::new(),
            sources: Vec::new(),
            lines_of_code_gt: None,
            lines_of_code_lt: None,
            callback: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn languages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn sources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn lines_of_code_gt(mut self, lines: u32) -> Self {
        self.lines_of_code_gt = Some(lines);
        self
    }

    pub fn lines_of_code_lt(mut self, lines: u32) -> Self {
        self.lines_of_code_lt = Some(lines);
        self
    }

    pub fn callback(mut self, name: impl Into<String>) -> Self {
        self.callback = Some(name.into());
        self
    }

    pub fn is_jsonp(&self) -> bool {
        self.callback.is_some()
    }

    /// Client-side range checks. Ordering of the two line bounds is left to the server.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SearchcodeError::InvalidRequest("query cannot be empty".into()));
        }
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(SearchcodeError::InvalidRequest(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.per_page
            )));
        }
        for (name, bound) in [
            ("lines_of_code_gt", self.lines_of_code_gt),
            ("lines_of_code_lt", self.lines_of_code_lt),
        ] {
            if let Some(value) = bound {
                if value > MAX_LINES_OF_CODE {
                    return Err(SearchcodeError::InvalidRequest(format!(
                        "{name} must be between 0 and {MAX_LINES_OF_CODE}, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One matched code fragment, viewed over its decoded mapping
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    node: JsonValue,
}

impl SearchResult {
    pub(crate) fn from_tree(node: JsonValue, endpoint: &str) -> Result<Self> {
        if node.as_mapping().is_none() {
            return Err(unexpected(endpoint, "result mapping", &node));
        }
        Ok(Self { node })
    }

    pub fn id(&self) -> Option<u64> {
        self.node.get("id").and_then(as_count)
    }

    pub fn filename(&self) -> Option<&str> {
        self.str_field("filename")
    }

    pub fn repo(&self) -> Option<&str> {
        self.str_field("repo")
    }

    /// Language as reported by the server. Not checked against the filter table.
    pub fn language(&self) -> Option<&str> {
        self.str_field("language")
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn lines_count(&self) -> Option<u64> {
        self.node.get("linescount").and_then(as_count)
    }

    /// Matched lines sorted by line number.
    ///
    /// The map is sparse; only lines the server chose to include are present.
    pub fn lines(&self) -> Vec<(u32, &str)> {
        let mut lines: Vec<(u32, &str)> = self
            .node
            .get("lines")
            .and_then(JsonValue::as_mapping)
            .unwrap_or_default()
            .iter()
            .filter_map(|(number, text)| Some((number.trim().parse::<u32>().ok()?, text.as_str()?)))
            .collect();
        lines.sort_by_key(|(number, _)| *number);
        lines
    }

    /// Any other field of the result
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.node.get(key)
    }

    pub fn as_tree(&self) -> &JsonValue {
        &self.node
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.node.get(key).and_then(JsonValue::as_str)
    }
}

/// A decoded page of search results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// Total matches known to the server, may exceed the page
    pub total: u64,
    /// Results in the order the server ranked them
    pub results: Vec<SearchResult>,
    /// Language facets the server reported for this query
    pub language_filters: Vec<FilterFacet>,
    /// Source facets the server reported for this query
    pub source_filters: Vec<FilterFacet>,
}

impl SearchResponse {
    pub(crate) fn from_tree(tree: JsonValue, endpoint: &str) -> Result<Self> {
        let JsonValue::Mapping(entries) = tree else {
            return Err(unexpected(endpoint, "response mapping", &tree));
        };

        let mut response = Self {
            total: 0,
            results: Vec::new(),
            language_filters: Vec::new(),
            source_filters: Vec::new(),
        };
        for (key, value) in entries {
            match key.as_str() {
                "total" => response.total = as_count(&value).unwrap_or(0),
                "results" => response.results = results_from_tree(value, endpoint)?,
                "language_filters" => response.language_filters = facets_from_tree(&value, "language"),
                "source_filters" => response.source_filters = facets_from_tree(&value, "source"),
                _ => {}
            }
        }

        Ok(response)
    }
}

/// One entry of a `language_filters` or `source_filters` facet list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFacet {
    /// Wire id the service uses for `lan=` / `src=`
    pub id: u32,
    pub name: String,
    /// Matches for the query within this facet
    pub count: u64,
}

/// Facet lists are informational; malformed entries are skipped.
fn facets_from_tree(tree: &JsonValue, name_key: &str) -> Vec<FilterFacet> {
    tree.as_sequence()
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| {
            Some(FilterFacet {
                id: u32::try_from(entry.get("id").and_then(as_count)?).ok()?,
                name: entry.get(name_key).and_then(JsonValue::as_str)?.to_string(),
                count: entry.get("count").and_then(as_count).unwrap_or(0),
            })
        })
        .collect()
}

/// Outcome of [`crate::SearchcodeClient::search`]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(SearchResponse),
    /// Raw JSONP payload, returned untouched
    Jsonp(String),
}

impl SearchOutcome {
    pub fn into_results(self) -> Option<SearchResponse> {
        match self {
            SearchOutcome::Results(response) => Some(response),
            SearchOutcome::Jsonp(_) => None,
        }
    }

    pub fn into_jsonp(self) -> Option<String> {
        match self {
            SearchOutcome::Jsonp(text) => Some(text),
            SearchOutcome::Results(_) => None,
        }
    }
}

/// Results gathered across several pages
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResults {
    pub results: Vec<SearchResult>,
    /// Last total reported by the server
    pub total: u64,
    pub pages_fetched: u32,
}

/// Full contents of one indexed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeRecord {
    /// `None` when the server has no file for the requested id
    pub code: Option<String>,
    pub language: Option<String>,
}

impl CodeRecord {
    pub(crate) fn from_tree(tree: JsonValue, endpoint: &str) -> Result<Self> {
        match &tree {
            JsonValue::Null => Ok(Self::default()),
            JsonValue::Mapping(_) => Ok(Self {
                code: tree
                    .get("code")
                    .and_then(JsonValue::as_str)
                    .filter(|code| !code.is_empty())
                    .map(str::to_string),
                language: tree
                    .get("language")
                    .and_then(JsonValue::as_str)
                    .filter(|language| !language.is_empty())
                    .map(str::to_string),
            }),
            other => Err(unexpected(endpoint, "code mapping", other)),
        }
    }

    pub fn is_found(&self) -> bool {
        self.code.is_some()
    }
}

pub(crate) fn results_from_tree(tree: JsonValue, endpoint: &str) -> Result<Vec<SearchResult>> {
    match tree {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Sequence(items) => items
            .into_iter()
            .map(|item| SearchResult::from_tree(item, endpoint))
            .collect(),
        other => Err(unexpected(endpoint, "result sequence", &other)),
    }
}

/// Numbers sometimes arrive as strings
fn as_count(value: &JsonValue) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn unexpected(endpoint: &str, expected: &'static str, found: &JsonValue) -> SearchcodeError {
    SearchcodeError::UnexpectedShape {
        endpoint: endpoint.to_string(),
        expected,
        found: found.kind(),
    }
}
