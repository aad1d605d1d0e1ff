//! Mutations on presents: add, delete and reserve.
//!
//! A present moves one way, `Unreserved -> Reserved`, and leaves existence
//! through delete from either state. The engine keeps no state between calls;
//! at-most-one-reserver is enforced by [`PresentStore::reserve`], which writes
//! only when the stored row is still unreserved.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::database::{Present, PresentStore, ReserveOutcome};
use crate::services::error::{require, PresentError};

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPresent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Accepted for compatibility and ignored: presents start unreserved
    #[serde(default)]
    pub reserver_id: Option<String>,
    #[serde(default)]
    pub wishlist_id: String,
}

pub struct ReservationEngine {
    store: Arc<dyn PresentStore>,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn PresentStore>) -> Self {
        Self { store }
    }

    pub async fn add_present(
        &self,
        request: NewPresent,
        cancel: &CancellationToken,
    ) -> Result<Present, PresentError> {
        if cancel.is_cancelled() {
            return Err(PresentError::Canceled);
        }
        require("name", &request.name)?;
        require("wishlistId", &request.wishlist_id)?;

        if request.reserver_id.as_deref().is_some_and(|id| !id.is_empty()) {
            warn!(wishlist_id = %request.wishlist_id, "Ignoring reserverId on new present");
        }

        let present = Present::new(request.name, request.description, request.wishlist_id);
        self.store.insert(&present, cancel).await?;

        info!(present_id = %present.id, wishlist_id = %present.wishlist_id, "Added present");
        Ok(present)
    }

    pub async fn delete_present(&self, present_id: &str, cancel: &CancellationToken) -> Result<(), PresentError> {
        if cancel.is_cancelled() {
            return Err(PresentError::Canceled);
        }
        require("presentId", present_id)?;

        if !self.store.delete(present_id, cancel).await? {
            return Err(PresentError::NotFound(present_id.to_string()));
        }

        info!(present_id = %present_id, "Deleted present");
        Ok(())
    }

    pub async fn reserve_present(
        &self,
        present_id: &str,
        reserver_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Present, PresentError> {
        if cancel.is_cancelled() {
            return Err(PresentError::Canceled);
        }
        require("presentId", present_id)?;
        require("reserverId", reserver_id)?;

        match self.store.reserve(present_id, reserver_id, cancel).await? {
            ReserveOutcome::Reserved(present) => {
                info!(present_id = %present_id, reserver_id = %reserver_id, "Reserved present");
                Ok(present)
            }
            ReserveOutcome::AlreadyReserved => {
                warn!(present_id = %present_id, reserver_id = %reserver_id, "Present already reserved");
                Err(PresentError::AlreadyReserved(present_id.to_string()))
            }
            ReserveOutcome::Missing => Err(PresentError::NotFound(present_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::MockPresentStore;
    use crate::database::{MemoryPresentStore, StoreError};
    use crate::filter::PresentFilter;

    fn lego(wishlist: &str) -> NewPresent {
        NewPresent {
            name: "Lego".to_string(),
            description: "set".to_string(),
            reserver_id: None,
            wishlist_id: wishlist.to_string(),
        }
    }

    #[tokio::test]
    async fn add_generates_id_and_ignores_reserver() {
        let mut store = MockPresentStore::new();
        store
            .expect_insert()
            .withf(|p, _| {
                !p.id.is_empty()
                    && p.name == "Toy"
                    && p.description == "A fun toy"
                    && p.wishlist_id == "wishlist123"
                    && !p.is_reserved
                    && p.reserver_id.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let engine = ReservationEngine::new(Arc::new(store));

        let present = engine
            .add_present(
                NewPresent {
                    name: "Toy".to_string(),
                    description: "A fun toy".to_string(),
                    reserver_id: Some("user123".to_string()),
                    wishlist_id: "wishlist123".to_string(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(present.is_consistent());
        assert!(!present.is_reserved);
    }

    #[tokio::test]
    async fn add_validates_required_fields() {
        // No expectations: any store call fails the test
        let engine = ReservationEngine::new(Arc::new(MockPresentStore::new()));
        let cancel = CancellationToken::new();

        let err = engine
            .add_present(NewPresent { name: "  ".to_string(), ..lego("W1") }, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PresentError::Validation { field: "name", .. }));

        let err = engine.add_present(lego(""), &cancel).await.unwrap_err();
        assert!(matches!(err, PresentError::Validation { field: "wishlistId", .. }));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let mut store = MockPresentStore::new();
        store
            .expect_delete()
            .withf(|id, _| id == "present123")
            .times(1)
            .returning(|_, _| Ok(false));
        let engine = ReservationEngine::new(Arc::new(store));

        let err = engine.delete_present("present123", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PresentError::NotFound(id) if id == "present123"));
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let engine = ReservationEngine::new(Arc::new(MemoryPresentStore::new()));
        let cancel = CancellationToken::new();
        let present = engine.add_present(lego("W1"), &cancel).await.unwrap();

        engine.delete_present(&present.id, &cancel).await.unwrap();
        let err = engine.delete_present(&present.id, &cancel).await.unwrap_err();
        assert!(matches!(err, PresentError::NotFound(_)));
    }

    #[tokio::test]
    async fn reserve_maps_store_outcomes() {
        let mut store = MockPresentStore::new();
        store
            .expect_reserve()
            .withf(|id, reserver, _| id == "taken" && reserver == "U2")
            .returning(|_, _, _| Ok(ReserveOutcome::AlreadyReserved));
        store
            .expect_reserve()
            .withf(|id, _, _| id == "ghost")
            .returning(|_, _, _| Ok(ReserveOutcome::Missing));
        let engine = ReservationEngine::new(Arc::new(store));
        let cancel = CancellationToken::new();

        let err = engine.reserve_present("taken", "U2", &cancel).await.unwrap_err();
        assert!(matches!(err, PresentError::AlreadyReserved(_)));
        let err = engine.reserve_present("ghost", "U2", &cancel).await.unwrap_err();
        assert!(matches!(err, PresentError::NotFound(_)));
    }

    #[tokio::test]
    async fn reserve_validates_ids() {
        let engine = ReservationEngine::new(Arc::new(MockPresentStore::new()));
        let cancel = CancellationToken::new();
        let err = engine.reserve_present("", "U1", &cancel).await.unwrap_err();
        assert!(matches!(err, PresentError::Validation { field: "presentId", .. }));
        let err = engine.reserve_present("p1", " ", &cancel).await.unwrap_err();
        assert!(matches!(err, PresentError::Validation { field: "reserverId", .. }));
    }

    #[tokio::test]
    async fn cancelled_token_issues_no_writes() {
        let engine = ReservationEngine::new(Arc::new(MockPresentStore::new()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(engine.add_present(lego("W1"), &cancel).await, Err(PresentError::Canceled)));
        assert!(matches!(engine.delete_present("p1", &cancel).await, Err(PresentError::Canceled)));
        assert!(matches!(engine.reserve_present("p1", "U1", &cancel).await, Err(PresentError::Canceled)));
    }

    #[tokio::test]
    async fn store_cancellation_surfaces_as_canceled() {
        let mut store = MockPresentStore::new();
        store.expect_delete().returning(|_, _| Err(StoreError::Canceled));
        let engine = ReservationEngine::new(Arc::new(store));
        let err = engine.delete_present("p1", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PresentError::Canceled));
    }

    #[tokio::test]
    async fn store_failures_are_not_swallowed() {
        let mut store = MockPresentStore::new();
        store
            .expect_insert()
            .returning(|_, _| Err(StoreError::Connection("refused".to_string())));
        let engine = ReservationEngine::new(Arc::new(store));
        let err = engine.add_present(lego("W1"), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PresentError::Store(StoreError::Connection(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservers_have_one_winner() {
        let store = Arc::new(MemoryPresentStore::new());
        let engine = Arc::new(ReservationEngine::new(store.clone()));
        let cancel = CancellationToken::new();
        let present = engine.add_present(lego("W1"), &cancel).await.unwrap();

        let reservers: Vec<String> = (0..16).map(|i| format!("U{}", i)).collect();
        let attempts = reservers.iter().cloned().map(|user| {
            let engine = engine.clone();
            let id = present.id.clone();
            tokio::spawn(async move {
                let result = engine.reserve_present(&id, &user, &CancellationToken::new()).await;
                (user, result)
            })
        });
        let results = futures::future::join_all(attempts).await;

        let mut winners = Vec::new();
        for joined in results {
            let (user, result) = joined.unwrap();
            match result {
                Ok(_) => winners.push(user),
                Err(PresentError::AlreadyReserved(_)) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(winners.len(), 1, "winners: {:?}", winners);

        let stored = store.fetch_one(&present.id, &cancel).await.unwrap().unwrap();
        assert!(stored.is_consistent());
        assert_eq!(stored.reserver_id.as_deref(), Some(winners[0].as_str()));

        let mine = store
            .fetch(&PresentFilter::reserved_by(winners[0].clone()), None, &cancel)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
    }
}
