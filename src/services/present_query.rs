use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SearchConfig;
use crate::database::{Present, PresentStore};
use crate::filter::PresentFilter;
use crate::services::error::PresentError;

/// Read-side views over presents. Every call goes to the store; nothing is cached.
pub struct PresentQueryService {
    store: Arc<dyn PresentStore>,
    search: SearchConfig,
}

impl PresentQueryService {
    pub fn new(store: Arc<dyn PresentStore>, search: SearchConfig) -> Self {
        Self { store, search }
    }

    /// All presents on a wishlist, reserved or not
    pub async fn load_wishlist_presents(
        &self,
        wishlist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, PresentError> {
        self.load(PresentFilter::wishlist(wishlist_id), None, cancel).await
    }

    pub async fn load_wishlist_unreserved_presents(
        &self,
        wishlist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, PresentError> {
        self.load(PresentFilter::unreserved(wishlist_id), None, cancel).await
    }

    /// Presents reserved by `user_id` across every wishlist
    pub async fn load_reserved_presents(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, PresentError> {
        self.load(PresentFilter::reserved_by(user_id), None, cancel).await
    }

    /// Blank keywords return nothing without a store round trip. Any other
    /// keyword is matched exactly as given, surrounding whitespace included.
    pub async fn search_presents_by_keyword(
        &self,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, PresentError> {
        if cancel.is_cancelled() {
            return Err(PresentError::Canceled);
        }
        if keyword.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.load(PresentFilter::keyword(keyword), self.search.max_results, cancel).await
    }

    async fn load(
        &self,
        filter: PresentFilter,
        limit: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, PresentError> {
        if cancel.is_cancelled() {
            return Err(PresentError::Canceled);
        }
        let presents = self.store.fetch(&filter, limit, cancel).await?;
        debug!(?filter, count = presents.len(), "Loaded presents");
        Ok(presents)
    }
}
