use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::campaign_model::{
    Campaign, CampaignStatus, CreateCampaignRequest, DeliveryMethod, ListCampaignsResponse,
};

#[derive(Clone, Debug)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await?;
        Ok(())
    }

    /// Crea la campaña en DB con estado "draft"
    pub async fn create_campaign(&self, req: &CreateCampaignRequest) -> Result<String> {
        if req.methods.is_empty() {
            return Err(anyhow!("La campaña requiere al menos un canal de entrega"));
        }

        let campaign_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let methods_json = serde_json::to_string(&req.methods)?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, name, description, methods, message_text,
                status, created_datetime, end_datetime, created_by
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)
            "#,
        )
        .bind(&campaign_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&methods_json)
        .bind(&req.message_text)
        .bind(CampaignStatus::Draft.as_str())
        .bind(&now)
        .bind(&req.created_by)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar campaign")?;

        Ok(campaign_id)
    }

    /// Obtiene la info de una campaña
    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, methods, message_text,
                   status, created_datetime, end_datetime, created_by
            FROM campaigns
            WHERE id = ?1
            "#,
        )
        .bind(campaign_id)
        .fetch_one(&self.db_pool)
        .await
        .context("No se encontró campaña con ese id")?;

        map_campaign_row(&row)
    }

    /// Lista campañas del usuario con paginación, más recientes primero
    pub async fn list_campaigns(
        &self,
        created_by: &str,
        page: u64,
        page_size: u64,
    ) -> Result<ListCampaignsResponse> {
        let offset = (page - 1) * page_size;

        let total_row =
            sqlx::query("SELECT COUNT(*) as cnt FROM campaigns WHERE created_by = ?1")
                .bind(created_by)
                .fetch_one(&self.db_pool)
                .await?;
        let total = total_row.try_get::<i64, _>("cnt")? as u64;

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, methods, message_text,
                   status, created_datetime, end_datetime, created_by
            FROM campaigns
            WHERE created_by = ?1
            ORDER BY created_datetime DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(created_by)
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&self.db_pool)
        .await?;

        let mut items = Vec::new();
        for r in rows {
            items.push(map_campaign_row(&r)?);
        }

        Ok(ListCampaignsResponse {
            total,
            page,
            page_size,
            items,
        })
    }

    /// Transición condicional draft -> sending. Actúa como lease de
    /// ejecución: devuelve false si la campaña no estaba en "draft"
    /// (otra ejecución la tomó o ya terminó).
    pub async fn try_begin_sending(&self, campaign_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'sending'
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(campaign_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar campaña como 'sending'")?;

        Ok(result.rows_affected() == 1)
    }

    /// Marca la campaña como completada con timestamp de cierre
    pub async fn mark_completed(&self, campaign_id: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'completed',
                end_datetime = ?2
            WHERE id = ?1
            "#,
        )
        .bind(campaign_id)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar campaña como 'completed'")?;

        Ok(())
    }

    /// Rollback a "draft" tras una falla fatal de ejecución
    pub async fn reset_to_draft(&self, campaign_id: &str) -> Result<()> {
        sqlx::query(r#"UPDATE campaigns SET status = 'draft' WHERE id = ?1"#)
            .bind(campaign_id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al regresar campaña a 'draft'")?;

        Ok(())
    }
}

fn map_campaign_row(row: &SqliteRow) -> Result<Campaign> {
    let methods_json: String = row.try_get("methods")?;
    let methods: Vec<DeliveryMethod> = serde_json::from_str(&methods_json)
        .context("Campo 'methods' con JSON inválido")?;

    let created_datetime: String = row.try_get("created_datetime")?;
    let end_datetime: Option<String> = row.try_get("end_datetime")?;
    let status: String = row.try_get("status")?;

    Ok(Campaign {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        methods,
        message_text: row.try_get("message_text")?,
        created_datetime: created_datetime.parse::<DateTime<Utc>>()?,
        end_datetime: match end_datetime {
            Some(s) => Some(s.parse::<DateTime<Utc>>()?),
            None => None,
        },
        created_by: row.try_get("created_by")?,
        status: CampaignStatus::parse(&status)?,
    })
}
