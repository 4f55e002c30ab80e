mod embedded;

use embedded::migrations;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::{Client, NoTls};

use crate::models::Note;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("data store request failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// Access to the external notes table. The store owns id generation and
/// whatever consistency guarantees apply; callers issue single requests
/// and impose no transaction discipline of their own.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert_note(
        &self,
        title: String,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Result<Note, StoreError>;

    /// Returns whether a row was actually removed.
    async fn delete_note(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;
}

pub struct Repository {
    client: Client,
}

impl Repository {
    pub async fn new(database_dsn: String) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(&database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), refinery::Error> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

#[async_trait]
impl NoteStore for Repository {
    async fn insert_note(
        &self,
        title: String,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Result<Note, StoreError> {
        let row = self.client.query_one(
            "INSERT INTO notes (title, description, created_at) VALUES ($1, $2, $3) \
             RETURNING id, title, description, created_at",
            &[&title, &description, &created_at],
        ).await?;

        Ok(Note {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            created_at: row.get("created_at"),
        })
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows == 1)
    }

    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let rows = self
            .client
            .query("SELECT id, title, description, created_at FROM notes", &[])
            .await?;

        let mut vec: Vec<Note> = Vec::new();

        for row in rows {
            vec.push(Note {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                created_at: row.get("created_at"),
            });
        }

        Ok(vec)
    }
}
