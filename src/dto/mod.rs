use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note description
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title; a request without one creates nothing
    #[serde(default)]
    pub title: Option<String>,
    /// Note description
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// User ID assigned by the identity provider
    pub id: String,
    /// Email address, if the provider exposes one
    #[serde(default)]
    pub email: Option<String>,
    /// Account creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
