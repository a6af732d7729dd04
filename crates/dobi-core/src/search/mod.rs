//! Web search port.
//!
//! The search result is opaque, untrusted text destined for the
//! `compressed_web_search_results` prompt slot. One call, no retries.

use std::future::Future;
use std::pin::Pin;

use dobi_types::error::SearchError;

pub trait WebSearch: Send + Sync {
    /// Provider name for logs (e.g., "google").
    fn name(&self) -> &str;

    fn search(&self, query: &str) -> impl Future<Output = Result<String, SearchError>> + Send;
}

/// Object-safe version of [`WebSearch`] with boxed futures.
pub trait WebSearchDyn: Send + Sync {
    fn name_dyn(&self) -> &str;

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>>;
}

impl<T: WebSearch> WebSearchDyn for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>> {
        Box::pin(self.search(query))
    }
}

/// Type-erased web search provider.
pub struct BoxWebSearch {
    inner: Box<dyn WebSearchDyn + Send + Sync>,
}

impl BoxWebSearch {
    pub fn new<T: WebSearch + 'static>(search: T) -> Self {
        Self {
            inner: Box::new(search),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name_dyn()
    }

    pub async fn search(&self, query: &str) -> Result<String, SearchError> {
        self.inner.search_boxed(query).await
    }
}

/// Used when `search.enabled = false`: always returns empty text.
pub struct DisabledSearch;

impl WebSearch for DisabledSearch {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn search(&self, _query: &str) -> Result<String, SearchError> {
        Ok(String::new())
    }
}
