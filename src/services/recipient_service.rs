use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::recipient_model::{ProcessingResult, Recipient, UploadRecipient};
use crate::services::event_log_service::EventLogService;

#[derive(Clone, Debug)]
pub struct RecipientService {
    db_pool: Pool<Sqlite>,
    event_log_service: EventLogService,
}

impl RecipientService {
    pub fn new(db_pool: Pool<Sqlite>, event_log_service: EventLogService) -> Self {
        RecipientService {
            db_pool,
            event_log_service,
        }
    }

    /// Directorio completo, más recientes primero, con tope de filas.
    pub async fn list_recipients(&self, limit: i64) -> Result<Vec<Recipient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, telephone, email, interests,
                   created_datetime, updated_datetime
            FROM recipients
            ORDER BY created_datetime DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        let mut result = Vec::new();
        for r in rows {
            result.push(map_recipient_row(&r)?);
        }
        Ok(result)
    }

    /// Búsqueda por teléfono normalizado (clave de deduplicación)
    pub async fn get_by_phone(&self, telephone: &str) -> Result<Option<Recipient>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, telephone, email, interests,
                   created_datetime, updated_datetime
            FROM recipients
            WHERE telephone = ?1
            LIMIT 1
            "#,
        )
        .bind(telephone)
        .fetch_optional(&self.db_pool)
        .await?;

        match row {
            Some(r) => Ok(Some(map_recipient_row(&r)?)),
            None => Ok(None),
        }
    }

    pub async fn create_recipient(&self, rec: &UploadRecipient, telephone: &str) -> Result<String> {
        let recipient_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let interests_json = serde_json::to_string(&rec.interests)?;

        sqlx::query(
            r#"
            INSERT INTO recipients (
                id, name, telephone, email, interests,
                created_datetime, updated_datetime
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&recipient_id)
        .bind(&rec.name)
        .bind(telephone)
        .bind(rec.email.to_lowercase())
        .bind(&interests_json)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar recipient")?;

        Ok(recipient_id)
    }

    pub async fn update_recipient(&self, recipient_id: &str, rec: &UploadRecipient) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let interests_json = serde_json::to_string(&rec.interests)?;

        sqlx::query(
            r#"
            UPDATE recipients
            SET name = ?2,
                email = ?3,
                interests = ?4,
                updated_datetime = ?5
            WHERE id = ?1
            "#,
        )
        .bind(recipient_id)
        .bind(&rec.name)
        .bind(rec.email.to_lowercase())
        .bind(&interests_json)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar recipient")?;

        Ok(())
    }

    /// Upsert masivo de una carga de lista: deduplica por teléfono dentro del
    /// lote, valida cada fila y crea o actualiza contra el directorio.
    /// Los errores por fila se acumulan sin abortar la carga.
    pub async fn process_recipients(
        &self,
        recipients: &[UploadRecipient],
        user_id: &str,
    ) -> Result<ProcessingResult> {
        let mut result = ProcessingResult {
            success: true,
            processed: 0,
            created: 0,
            updated: 0,
            duplicates: 0,
            errors: Vec::new(),
        };

        let mut seen_phones: HashSet<String> = HashSet::new();

        for rec in recipients {
            let telephone = match normalize_telephone(&rec.telephone) {
                Ok(t) => t,
                Err(e) => {
                    result.errors.push(format!("{}: {}", rec.name, e));
                    result.success = false;
                    continue;
                }
            };

            if !is_valid_email(&rec.email) {
                result
                    .errors
                    .push(format!("{}: Email inválido: {}", rec.name, rec.email));
                result.success = false;
                continue;
            }

            // Duplicado dentro del mismo archivo
            if !seen_phones.insert(telephone.clone()) {
                result.duplicates += 1;
                continue;
            }

            let outcome = match self.get_by_phone(&telephone).await {
                Ok(Some(existing)) => self
                    .update_recipient(&existing.id, rec)
                    .await
                    .map(|_| false),
                Ok(None) => self.create_recipient(rec, &telephone).await.map(|_| true),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(created) => {
                    if created {
                        result.created += 1;
                    } else {
                        result.updated += 1;
                    }
                    result.processed += 1;
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("Error procesando {}: {}", rec.name, e));
                    result.success = false;
                }
            }
        }

        self.event_log_service
            .append(crate::models::event_model::UserEventLog::new(
                user_id,
                "recipients_uploaded",
                serde_json::json!({
                    "total_processed": result.processed,
                    "created": result.created,
                    "updated": result.updated,
                    "duplicates": result.duplicates,
                    "errors": result.errors.len(),
                }),
                None,
            ))
            .await;

        Ok(result)
    }
}

/// Quita espacios, guiones y paréntesis, y valida el formato resultante:
/// '+' opcional, primer dígito 1-9, de 4 a 15 dígitos en total.
pub fn normalize_telephone(raw: &str) -> Result<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let valid = !digits.is_empty()
        && digits.len() >= 4
        && digits.len() <= 15
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if !valid {
        return Err(anyhow!("Teléfono inválido: {}", raw));
    }

    Ok(cleaned)
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn map_recipient_row(row: &SqliteRow) -> Result<Recipient> {
    let interests_json: String = row.try_get("interests")?;
    let interests: Vec<String> = serde_json::from_str(&interests_json)
        .context("Campo 'interests' con JSON inválido")?;

    let created_datetime: String = row.try_get("created_datetime")?;
    let updated_datetime: String = row.try_get("updated_datetime")?;

    Ok(Recipient {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        telephone: row.try_get("telephone")?,
        email: row.try_get("email")?,
        interests,
        created_datetime: created_datetime.parse::<DateTime<Utc>>()?,
        updated_datetime: updated_datetime.parse::<DateTime<Utc>>()?,
    })
}
