//! PostgreSQL-backed seat claim repository using the `seat_claims` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use lectern_application::SeatClaimRepository;
use lectern_core::{AppError, AppResult};
use lectern_domain::{SeatClaim, SeatSourceKey, SeatSourceType, UserId};

/// PostgreSQL implementation of the seat claim repository port.
#[derive(Clone)]
pub struct PostgresSeatClaimRepository {
    pool: PgPool,
}

impl PostgresSeatClaimRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SeatClaimRow {
    id: Uuid,
    source_type: String,
    source_id: String,
    user_id: String,
    claimed_at: DateTime<Utc>,
    released_at: Option<DateTime<Utc>>,
}

impl TryFrom<SeatClaimRow> for SeatClaim {
    type Error = AppError;

    fn try_from(row: SeatClaimRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            source: SeatSourceKey {
                source_type: row.source_type.parse::<SeatSourceType>()?,
                source_id: row.source_id,
            },
            user_id: UserId::new(row.user_id)?,
            claimed_at: row.claimed_at,
            released_at: row.released_at,
        })
    }
}

#[async_trait]
impl SeatClaimRepository for PostgresSeatClaimRepository {
    async fn find_active_claim(
        &self,
        source: &SeatSourceKey,
        user_id: &UserId,
    ) -> AppResult<Option<SeatClaim>> {
        let row = sqlx::query_as::<_, SeatClaimRow>(
            r#"
            SELECT id, source_type, source_id, user_id, claimed_at, released_at
            FROM seat_claims
            WHERE source_type = $1
              AND source_id = $2
              AND user_id = $3
              AND released_at IS NULL
            "#,
        )
        .bind(source.source_type.as_str())
        .bind(source.source_id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find seat claim: {error}")))?;

        row.map(SeatClaim::try_from).transpose()
    }

    async fn count_active_claims(&self, source: &SeatSourceKey) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM seat_claims
            WHERE source_type = $1
              AND source_id = $2
              AND released_at IS NULL
            "#,
        )
        .bind(source.source_type.as_str())
        .bind(source.source_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count seat claims: {error}")))?;

        u64::try_from(count)
            .map_err(|error| AppError::Internal(format!("invalid seat claim count: {error}")))
    }

    async fn insert_claim(&self, claim: SeatClaim) -> AppResult<()> {
        if !claim.is_active() {
            return Err(AppError::Validation(format!(
                "seat claim '{}' is already released",
                claim.id
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO seat_claims (id, source_type, source_id, user_id, claimed_at, released_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(claim.id)
        .bind(claim.source.source_type.as_str())
        .bind(claim.source.source_id.as_str())
        .bind(claim.user_id.as_str())
        .bind(claim.claimed_at)
        .bind(claim.released_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23505")
                {
                    return Err(AppError::Conflict(format!(
                        "user '{}' already holds a seat on '{}'",
                        claim.user_id, claim.source
                    )));
                }

                Err(AppError::Internal(format!(
                    "failed to insert seat claim: {error}"
                )))
            }
        }
    }
}
