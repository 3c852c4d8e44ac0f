//! Search Backends
//!
//! Abstractions over where search results come from.

mod fixture;
mod http;

pub use fixture::StaticBackend;
pub use http::HttpScholarBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{ScholarResult, SearchQuery};

/// Search backend trait (Strategy pattern)
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a validated query, returning at most `query.num_results` hits
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScholarResult>>;

    /// Backend name
    fn name(&self) -> &str;
}
