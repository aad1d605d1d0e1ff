use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A gift item on a wishlist.
///
/// `is_reserved` is true exactly when `reserver_id` holds a non-empty id.
/// The only way to change either field is [`Present::reserve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Present {
    pub id: String,
    pub name: String,
    pub description: String,
    pub wishlist_id: String,
    pub reserver_id: Option<String>,
    pub is_reserved: bool,
}

impl Present {
    /// Builds an unreserved present with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        wishlist_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            wishlist_id: wishlist_id.into(),
            reserver_id: None,
            is_reserved: false,
        }
    }

    /// Marks the present as reserved by `reserver_id`.
    ///
    /// Returns `false` and leaves the record untouched when it is already
    /// reserved or the reserver id is blank.
    pub fn reserve(&mut self, reserver_id: &str) -> bool {
        if self.is_reserved || reserver_id.trim().is_empty() {
            return false;
        }
        self.reserver_id = Some(reserver_id.to_string());
        self.is_reserved = true;
        true
    }

    pub fn reserved_by(&self, user_id: &str) -> bool {
        self.is_reserved && self.reserver_id.as_deref() == Some(user_id)
    }

    pub fn is_consistent(&self) -> bool {
        let has_reserver = self
            .reserver_id
            .as_deref()
            .map(|id| !id.is_empty())
            .unwrap_or(false);
        self.is_reserved == has_reserver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_present_is_unreserved_with_unique_id() {
        let a = Present::new("Lego", "set", "W1");
        let b = Present::new("Lego", "set", "W1");
        assert!(!a.is_reserved);
        assert!(a.reserver_id.is_none());
        assert!(a.is_consistent());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn reserve_is_one_way() {
        let mut present = Present::new("Book", "", "W1");
        assert!(present.reserve("U1"));
        assert!(present.reserved_by("U1"));
        assert!(!present.reserve("U2"));
        assert!(present.reserved_by("U1"));
        assert!(present.is_consistent());
    }

    #[test]
    fn blank_reserver_is_rejected() {
        let mut present = Present::new("Book", "", "W1");
        assert!(!present.reserve("  "));
        assert!(!present.is_reserved);
    }

    #[test]
    fn serializes_camel_case() {
        let present = Present::new("Book", "paperback", "W1");
        let json = serde_json::to_value(&present).unwrap();
        assert_eq!(json["wishlistId"], "W1");
        assert_eq!(json["isReserved"], false);
        assert!(json["reserverId"].is_null());
    }
}
