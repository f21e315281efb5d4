use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::event_model::{ListEventsResponse, UserEventLog};

/// Log de actividad (auditoría). El append es fire-and-forget: si la
/// escritura falla se registra localmente y se traga el error, nunca
/// bloquea ni hace fallar al motor.
#[derive(Clone, Debug)]
pub struct EventLogService {
    db_pool: Pool<Sqlite>,
}

impl EventLogService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        EventLogService { db_pool }
    }

    pub async fn append(&self, event: UserEventLog) {
        if let Err(e) = self.insert_event(&event).await {
            log::error!(
                "(append) No se pudo registrar evento '{}' para user_id={}: {:?}",
                event.action,
                event.user_id,
                e
            );
        }
    }

    async fn insert_event(&self, event: &UserEventLog) -> Result<()> {
        let event_id = Uuid::new_v4().to_string();
        let timestamp = event.timestamp.to_rfc3339();
        let details = event.details.to_string();

        sqlx::query(
            r#"
            INSERT INTO user_event_log (
                id, user_id, action, details, timestamp, campaign_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&event_id)
        .bind(&event.user_id)
        .bind(&event.action)
        .bind(&details)
        .bind(&timestamp)
        .bind(&event.campaign_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar user_event_log")?;

        Ok(())
    }

    /// Lista eventos del usuario con paginación, más recientes primero
    pub async fn list_events(
        &self,
        user_id: &str,
        page: u64,
        page_size: u64,
    ) -> Result<ListEventsResponse> {
        let offset = (page - 1) * page_size;

        let total_row =
            sqlx::query("SELECT COUNT(*) as cnt FROM user_event_log WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.db_pool)
                .await?;
        let total = total_row.try_get::<i64, _>("cnt")? as u64;

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, action, details, timestamp, campaign_id
            FROM user_event_log
            WHERE user_id = ?1
            ORDER BY timestamp DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(user_id)
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&self.db_pool)
        .await?;

        let mut items = Vec::new();
        for r in rows {
            let details_json: String = r.try_get("details")?;
            let timestamp: String = r.try_get("timestamp")?;

            items.push(UserEventLog {
                id: Some(r.try_get("id")?),
                user_id: r.try_get("user_id")?,
                action: r.try_get("action")?,
                details: serde_json::from_str(&details_json)
                    .context("Campo 'details' con JSON inválido")?,
                timestamp: timestamp.parse::<DateTime<Utc>>()?,
                campaign_id: r.try_get("campaign_id")?,
            });
        }

        Ok(ListEventsResponse {
            total,
            page,
            page_size,
            items,
        })
    }
}
