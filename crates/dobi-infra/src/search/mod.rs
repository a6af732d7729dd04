//! Web search providers.

pub mod google;

use dobi_core::search::{BoxWebSearch, DisabledSearch};
use dobi_types::config::SearchConfig;
use dobi_types::error::{CredentialError, SearchError};

use crate::secret::{EnvCredentials, GOOGLE_API_KEY, GOOGLE_CSE_ID};

#[derive(Debug, thiserror::Error)]
pub enum SearchInitError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Build the configured search provider.
///
/// Google credentials are only required when search is enabled.
pub fn create_search(
    config: &SearchConfig,
    credentials: &EnvCredentials,
) -> Result<BoxWebSearch, SearchInitError> {
    if !config.enabled {
        tracing::info!("web search disabled");
        return Ok(BoxWebSearch::new(DisabledSearch));
    }
    let api_key = credentials.require(GOOGLE_API_KEY)?;
    let cse_id = credentials.require(GOOGLE_CSE_ID)?;
    let search = google::GoogleSearch::new(api_key, cse_id, config.num_results)?;
    Ok(BoxWebSearch::new(search))
}
