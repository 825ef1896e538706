use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::AppError;
use scolaris_models::opportunities::{
    CreateOpportunityDto, Opportunity, OpportunityFilterParams, OpportunityType,
    PaginatedOpportunitiesResponse, UpdateOpportunityDto,
};

use crate::utils::db::{SqlFilters, fetch_page};

const OPPORTUNITY_COLUMNS: &str = "id, title, opportunity_type, description, company, location, \
     profile, created_at, updated_at";

fn parse_type(raw: &str) -> Result<OpportunityType, AppError> {
    raw.parse::<OpportunityType>().map_err(|s| {
        AppError::bad_request(anyhow!(
            "Invalid opportunity type: {}. Expected 'stage' or 'offre d'emploi'",
            s
        ))
    })
}

pub struct OpportunityService;

impl OpportunityService {
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateOpportunityDto) -> Result<Opportunity, AppError> {
        let kind = parse_type(&dto.opportunity_type)?;

        let opportunity = sqlx::query_as::<_, Opportunity>(&format!(
            "INSERT INTO opportunities (title, opportunity_type, description, company, location, profile)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {OPPORTUNITY_COLUMNS}"
        ))
        .bind(dto.title.trim())
        .bind(kind.as_str())
        .bind(&dto.description)
        .bind(dto.company.trim())
        .bind(dto.location.trim())
        .bind(&dto.profile)
        .fetch_one(db)
        .await?;

        Ok(opportunity)
    }

    /// Newest first.
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: OpportunityFilterParams,
    ) -> Result<PaginatedOpportunitiesResponse, AppError> {
        let mut where_sql = SqlFilters::new();
        if let Some(kind) = &filters.opportunity_type {
            where_sql.push("opportunity_type = ${}", parse_type(kind)?.as_str());
        }
        if let Some(company) = &filters.company {
            where_sql.push_ilike("company", company);
        }

        let (data, meta) = fetch_page(
            db,
            OPPORTUNITY_COLUMNS,
            "opportunities",
            &where_sql,
            "created_at DESC",
            &filters.pagination,
        )
        .await?;

        Ok(PaginatedOpportunitiesResponse { data, meta })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Opportunity, AppError> {
        sqlx::query_as::<_, Opportunity>(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Opportunity not found")))
    }

    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        dto: UpdateOpportunityDto,
    ) -> Result<Opportunity, AppError> {
        let kind = dto.opportunity_type.as_deref().map(parse_type).transpose()?;

        sqlx::query_as::<_, Opportunity>(&format!(
            "UPDATE opportunities SET
                title = COALESCE($2, title),
                opportunity_type = COALESCE($3, opportunity_type),
                description = COALESCE($4, description),
                company = COALESCE($5, company),
                location = COALESCE($6, location),
                profile = COALESCE($7, profile),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {OPPORTUNITY_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(kind.map(OpportunityType::as_str))
        .bind(&dto.description)
        .bind(dto.company.as_deref().map(str::trim))
        .bind(dto.location.as_deref().map(str::trim))
        .bind(&dto.profile)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Opportunity not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Opportunity not found")));
        }

        Ok(())
    }
}
