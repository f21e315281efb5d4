use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::campaign_recipient_model::{CampaignRecipient, DeliveryStatus};

#[derive(Clone, Debug)]
pub struct CampaignRecipientService {
    db_pool: Pool<Sqlite>,
}

impl CampaignRecipientService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignRecipientService { db_pool }
    }

    /// Crea una fila por destinatario con status=pending y attempts=0.
    pub async fn add_recipients(&self, campaign_id: &str, recipient_ids: &[String]) -> Result<()> {
        for recipient_id in recipient_ids {
            let row_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO campaign_recipients (
                    id, campaign_id, recipient_id, status,
                    sent_datetime, attempts, error_message
                )
                VALUES (?1, ?2, ?3, 'pending', NULL, 0, NULL)
                "#,
            )
            .bind(&row_id)
            .bind(campaign_id)
            .bind(recipient_id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al insertar campaign_recipient")?;
        }

        Ok(())
    }

    /// Filas de la campaña en el orden estable del store (sin sort explícito;
    /// SQLite devuelve el orden de inserción para este scan).
    pub async fn list_for_campaign(&self, campaign_id: &str) -> Result<Vec<CampaignRecipient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, campaign_id, recipient_id, status,
                   sent_datetime, attempts, error_message
            FROM campaign_recipients
            WHERE campaign_id = ?1
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.db_pool)
        .await?;

        let mut result = Vec::new();
        for r in rows {
            result.push(map_row(&r)?);
        }
        Ok(result)
    }

    /// Persiste el resultado de un intento de entrega sobre la fila.
    /// sent_datetime solo en éxito; error_message solo si hubo error.
    pub async fn update_delivery(
        &self,
        row_id: &str,
        status: DeliveryStatus,
        sent_datetime: Option<DateTime<Utc>>,
        attempts: u32,
        error_message: Option<&str>,
    ) -> Result<()> {
        let sent = sent_datetime.map(|dt| dt.to_rfc3339());

        sqlx::query(
            r#"
            UPDATE campaign_recipients
            SET status = ?2,
                sent_datetime = ?3,
                attempts = ?4,
                error_message = ?5
            WHERE id = ?1
            "#,
        )
        .bind(row_id)
        .bind(status.as_str())
        .bind(&sent)
        .bind(attempts as i64)
        .bind(error_message)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar campaign_recipient")?;

        Ok(())
    }
}

fn map_row(row: &SqliteRow) -> Result<CampaignRecipient> {
    let status: String = row.try_get("status")?;
    let sent_datetime: Option<String> = row.try_get("sent_datetime")?;
    let attempts: i64 = row.try_get("attempts")?;

    Ok(CampaignRecipient {
        id: row.try_get("id")?,
        campaign_id: row.try_get("campaign_id")?,
        recipient_id: row.try_get("recipient_id")?,
        status: DeliveryStatus::parse(&status)?,
        sent_datetime: match sent_datetime {
            Some(s) => Some(s.parse::<DateTime<Utc>>()?),
            None => None,
        },
        attempts: attempts as u32,
        error_message: row.try_get("error_message")?,
    })
}
