use tokio::sync::RwLock;

use crate::dto::NoteResponse;

/// Single-entry cache of the rendered notes listing.
///
/// Holds the whole listing or nothing. Mutating operations invalidate it so
/// the next read goes back to the store; there is no TTL, keying, or partial
/// invalidation.
pub struct ListingCache {
    listing: RwLock<Option<Vec<NoteResponse>>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self {
            listing: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Option<Vec<NoteResponse>> {
        self.listing.read().await.clone()
    }

    pub async fn fill(&self, listing: Vec<NoteResponse>) {
        *self.listing.write().await = Some(listing);
    }

    pub async fn invalidate(&self) {
        *self.listing.write().await = None;
    }
}
