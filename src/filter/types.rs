use crate::database::models::Present;

/// The read shapes the store adapter understands.
///
/// Every query path goes through one of these variants so the adapter exposes
/// a single `fetch` instead of a method per view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentFilter {
    /// Every present on a wishlist.
    Wishlist { wishlist_id: String },
    /// Presents on a wishlist nobody has reserved yet.
    Unreserved { wishlist_id: String },
    /// Presents reserved by a user, across all wishlists.
    ReservedBy { user_id: String },
    /// Case-insensitive substring match on name or description.
    Keyword { keyword: String },
}

impl PresentFilter {
    pub fn wishlist(wishlist_id: impl Into<String>) -> Self {
        PresentFilter::Wishlist { wishlist_id: wishlist_id.into() }
    }

    pub fn unreserved(wishlist_id: impl Into<String>) -> Self {
        PresentFilter::Unreserved { wishlist_id: wishlist_id.into() }
    }

    pub fn reserved_by(user_id: impl Into<String>) -> Self {
        PresentFilter::ReservedBy { user_id: user_id.into() }
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        PresentFilter::Keyword { keyword: keyword.into() }
    }

    /// Evaluates the filter against a record already in memory.
    pub fn matches(&self, present: &Present) -> bool {
        match self {
            PresentFilter::Wishlist { wishlist_id } => present.wishlist_id == *wishlist_id,
            PresentFilter::Unreserved { wishlist_id } => {
                present.wishlist_id == *wishlist_id && !present.is_reserved
            }
            PresentFilter::ReservedBy { user_id } => present.reserved_by(user_id),
            PresentFilter::Keyword { keyword } => {
                if keyword.is_empty() {
                    return false;
                }
                let needle = keyword.to_lowercase();
                present.name.to_lowercase().contains(&needle)
                    || present.description.to_lowercase().contains(&needle)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
