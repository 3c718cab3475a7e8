//! searchcode client library
//!
//! A typed client for the searchcode code search API plus the pieces the `sc`
//! command-line tool is built from.
//!
//! ```no_run
//! use searchcode::{SearchRequest, SearchcodeClient};
//!
//! # async fn demo() -> searchcode::Result<()> {
//! let client = SearchcodeClient::new("my-tool/1.0");
//! let request = SearchRequest::new("fn main()").languages(["Rust", "Go"]).per_page(10);
//! if let Some(response) = client.search(&request).await?.into_results() {
//!     for result in &response.results {
//!         println!("{:?} {:?}", result.filename(), result.language());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod filters;
pub mod license;
pub mod logging;
pub mod render;
pub mod transport;
pub mod types;

pub use client::{PageProgress, SearchcodeClient, MAX_PAGES};
pub use codec::JsonValue;
pub use error::{Result, SearchcodeError};
pub use filters::{FacetDrift, FilterKind, UnknownFilterError};
pub use types::{CodeRecord, FilterFacet, PagedResults, SearchOutcome, SearchRequest, SearchResponse, SearchResult};
