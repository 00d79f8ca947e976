//! Session Store: persists sessions as ordered role-tagged message lists.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`; production uses `PgSessionStore`.
//! Concurrent appends to one session are not serialised: both land, in commit order.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{
    Message, MessageRow, Role, Session, SessionRow, DEFAULT_TITLE,
};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session for `owner_id` seeded with a single system message.
    async fn create(&self, owner_id: Uuid, system_prompt: &str) -> Result<Session, AppError>;

    /// Loads a session only if it exists and belongs to `owner_id`.
    async fn find(&self, owner_id: Uuid, session_id: Uuid) -> Result<Option<Session>, AppError>;

    /// Appends messages in order. Fails with `NotFound` for unknown, foreign or deleted sessions.
    async fn append(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        messages: &[Message],
    ) -> Result<(), AppError>;

    /// All of the owner's sessions, most recently updated first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Session>, AppError>;

    /// Removes the session and its messages. Returns false if nothing was deleted.
    async fn delete(&self, owner_id: Uuid, session_id: Uuid) -> Result<bool, AppError>;
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_messages(&self, session_ids: &[Uuid]) -> Result<Vec<MessageRow>, AppError> {
        Ok(sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT seq, session_id, role, content, created_at
            FROM chat_messages
            WHERE session_id = ANY($1)
            ORDER BY seq ASC
            "#,
        )
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await?)
    }
}

fn message_from_row(row: MessageRow) -> Result<Message, AppError> {
    let role = Role::parse(&row.role).ok_or_else(|| {
        AppError::Internal(anyhow!(
            "Message {} has unknown role '{}'",
            row.seq,
            row.role
        ))
    })?;
    Ok(Message {
        role,
        content: row.content,
        timestamp: row.created_at,
    })
}

fn assemble(row: SessionRow, messages: Vec<Message>) -> Session {
    Session {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        messages,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, owner_id: Uuid, system_prompt: &str) -> Result<Session, AppError> {
        let id = Uuid::new_v4();
        let system = Message::new(Role::System, system_prompt);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO chat_sessions (id, owner_id, title)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, title, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(DEFAULT_TITLE)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO chat_messages (session_id, role, content, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(system.role.as_str())
        .bind(&system.content)
        .bind(system.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Created chat session {id} for owner {owner_id}");
        Ok(assemble(row, vec![system]))
    }

    async fn find(&self, owner_id: Uuid, session_id: Uuid) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_id, title, created_at, updated_at
            FROM chat_sessions
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(session_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let messages = self
            .load_messages(&[row.id])
            .await?
            .into_iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(assemble(row, messages)))
    }

    async fn append(
        &self,
        owner_id: Uuid,
        session_id: Uuid,
        messages: &[Message],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query(
            "UPDATE chat_sessions SET updated_at = $1 WHERE id = $2 AND owner_id = $3",
        )
        .bind(Utc::now())
        .bind(session_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if touched == 0 {
            return Err(AppError::NotFound("Chat not found".to_string()));
        }

        for message in messages {
            sqlx::query(
                "INSERT INTO chat_messages (session_id, role, content, created_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(session_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Session>, AppError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_id, title, created_at, updated_at
            FROM chat_sessions
            WHERE owner_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut by_session: HashMap<Uuid, Vec<Message>> = HashMap::new();
        for message_row in self.load_messages(&ids).await? {
            let session_id = message_row.session_id;
            by_session
                .entry(session_id)
                .or_default()
                .push(message_from_row(message_row)?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let messages = by_session.remove(&row.id).unwrap_or_default();
                assemble(row, messages)
            })
            .collect())
    }

    async fn delete(&self, owner_id: Uuid, session_id: Uuid) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND owner_id = $2")
            .bind(session_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            info!("Deleted chat session {session_id} for owner {owner_id}");
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySessionStore;

    #[test]
    fn test_message_from_row_rejects_unknown_role() {
        let row = MessageRow {
            seq: 1,
            session_id: Uuid::new_v4(),
            role: "tool".to_string(),
            content: "x".to_string(),
            created_at: Utc::now(),
        };
        assert!(message_from_row(row).is_err());
    }

    #[tokio::test]
    async fn test_append_round_trip_preserves_order_and_roles() {
        let store = MemorySessionStore::default();
        let owner = Uuid::new_v4();
        let session = store.create(owner, "system").await.unwrap();

        let exchange = [
            Message::new(Role::User, "What should I learn next?"),
            Message::new(Role::Assistant, "Distributed systems."),
        ];
        store.append(owner, session.id, &exchange).await.unwrap();

        let reloaded = store.find(owner, session.id).await.unwrap().unwrap();
        assert_eq!(reloaded.messages.len(), 3);
        assert_eq!(&reloaded.messages[1..], &exchange);
    }

    #[tokio::test]
    async fn test_foreign_owner_cannot_see_or_append() {
        let store = MemorySessionStore::default();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let session = store.create(owner, "system").await.unwrap();

        assert!(store.find(intruder, session.id).await.unwrap().is_none());
        let err = store
            .append(intruder, session.id, &[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deleted_session_is_terminal() {
        let store = MemorySessionStore::default();
        let owner = Uuid::new_v4();
        let session = store.create(owner, "system").await.unwrap();

        assert!(store.delete(owner, session.id).await.unwrap());
        assert!(!store.delete(owner, session.id).await.unwrap());
        assert!(store.find(owner, session.id).await.unwrap().is_none());
        assert!(store.list(owner).await.unwrap().is_empty());
        assert!(store
            .append(owner, session.id, &[Message::new(Role::User, "hi")])
            .await
            .is_err());
    }
}
