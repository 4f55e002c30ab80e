use crate::{
    cache::ListingCache,
    dto::{CreateNoteRequest, NoteResponse},
    repository::{NoteStore, StoreError},
};

use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    listing: Arc<ListingCache>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            listing: Arc::new(ListingCache::new()),
        }
    }

    /// Creates a note with a store-assigned id and a creation timestamp
    /// stamped here. A request with no title (absent or empty) is a silent
    /// no-op and returns `Ok(None)` without touching the store or the cache.
    pub async fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> Result<Option<NoteResponse>, StoreError> {
        let Some(title) = request.title.filter(|title| !title.is_empty()) else {
            tracing::debug!("create request without a title, nothing to do");
            return Ok(None);
        };

        let note = self
            .store
            .insert_note(title, request.description.unwrap_or_default(), Utc::now())
            .await?;

        self.listing.invalidate().await;

        Ok(Some(NoteResponse {
            id: note.id,
            title: note.title,
            description: note.description,
            created_at: note.created_at,
        }))
    }

    /// Deletes a note by id. An id with no matching row is a no-op; the
    /// listing cache is invalidated either way.
    pub async fn delete_note(&self, id: i64) -> Result<(), StoreError> {
        let removed = self.store.delete_note(id).await?;

        if !removed {
            tracing::debug!(id, "delete requested for a note that does not exist");
        }

        self.listing.invalidate().await;

        Ok(())
    }

    /// Returns the full collection, served from the listing cache when a
    /// mutation has not invalidated it since the last read.
    pub async fn list_notes(&self) -> Result<Vec<NoteResponse>, StoreError> {
        if let Some(listing) = self.listing.get().await {
            return Ok(listing);
        }

        let listing: Vec<NoteResponse> = self
            .store
            .list_notes()
            .await?
            .into_iter()
            .map(|note| NoteResponse {
                id: note.id,
                title: note.title,
                description: note.description,
                created_at: note.created_at,
            })
            .collect();

        self.listing.fill(listing.clone()).await;

        Ok(listing)
    }
}
