use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::database::models::Present;
use crate::database::repository::{ensure_active, PresentStore, ReserveOutcome, StoreError};
use crate::filter::{FilterError, PresentFilter};

/// Process-local present store.
///
/// Records keep insertion order. Every write takes the lock once, so the
/// reserve check and the reserve write cannot interleave with another writer.
#[derive(Default)]
pub struct MemoryPresentStore {
    presents: RwLock<Vec<Present>>,
}

impl MemoryPresentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.presents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.presents.read().await.is_empty()
    }
}

#[async_trait]
impl PresentStore for MemoryPresentStore {
    async fn fetch(
        &self,
        filter: &PresentFilter,
        limit: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Present>, StoreError> {
        ensure_active(cancel)?;
        if matches!(filter, PresentFilter::Keyword { keyword } if keyword.is_empty()) {
            return Err(FilterError::EmptyKeyword.into());
        }
        let cap = match limit {
            Some(n) if n < 0 => {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()).into())
            }
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => usize::MAX,
        };

        let presents = self.presents.read().await;
        Ok(presents
            .iter()
            .filter(|p| filter.matches(p))
            .take(cap)
            .cloned()
            .collect())
    }

    async fn fetch_one(&self, id: &str, cancel: &CancellationToken) -> Result<Option<Present>, StoreError> {
        ensure_active(cancel)?;
        let presents = self.presents.read().await;
        Ok(presents.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, present: &Present, cancel: &CancellationToken) -> Result<(), StoreError> {
        ensure_active(cancel)?;
        let mut presents = self.presents.write().await;
        if presents.iter().any(|p| p.id == present.id) {
            return Err(StoreError::Duplicate(present.id.clone()));
        }
        presents.push(present.clone());
        Ok(())
    }

    async fn update(&self, present: &Present, cancel: &CancellationToken) -> Result<bool, StoreError> {
        ensure_active(cancel)?;
        let mut presents = self.presents.write().await;
        match presents.iter_mut().find(|p| p.id == present.id) {
            Some(existing) => {
                existing.name = present.name.clone();
                existing.description = present.description.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reserve(
        &self,
        id: &str,
        reserver_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ReserveOutcome, StoreError> {
        ensure_active(cancel)?;
        let mut presents = self.presents.write().await;
        let Some(existing) = presents.iter_mut().find(|p| p.id == id) else {
            return Ok(ReserveOutcome::Missing);
        };
        if existing.is_reserved {
            return Ok(ReserveOutcome::AlreadyReserved);
        }
        if !existing.reserve(reserver_id) {
            return Err(StoreError::Constraint("reserver_id must be non-empty".to_string()));
        }
        Ok(ReserveOutcome::Reserved(existing.clone()))
    }

    async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<bool, StoreError> {
        ensure_active(cancel)?;
        let mut presents = self.presents.write().await;
        let before = presents.len();
        presents.retain(|p| p.id != id);
        Ok(presents.len() < before)
    }

    async fn health_check(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        ensure_active(cancel)
    }
}
