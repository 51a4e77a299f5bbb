use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use udyam_core::error::StoreError;
use udyam_core::ports::{Result, SubmissionStore};
use udyam_core::types::{NewSubmission, SubmissionRecord};

#[derive(Debug, FromRow)]
struct PgSubmissionRow {
    id: Uuid,
    step: i32,
    aadhaar: Option<String>,
    mobile: Option<String>,
    otp: Option<String>,
    pan: Option<String>,
    pincode: Option<String>,
    state: Option<String>,
    city: Option<String>,
    raw_json: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PgSubmissionRow> for SubmissionRecord {
    type Error = StoreError;

    fn try_from(row: PgSubmissionRow) -> std::result::Result<Self, Self::Error> {
        let step = u32::try_from(row.step)
            .map_err(|_| StoreError::CorruptRow(format!("negative step {} on {}", row.step, row.id)))?;
        Ok(SubmissionRecord {
            id: row.id,
            step,
            aadhaar: row.aadhaar,
            mobile: row.mobile,
            otp: row.otp,
            pan: row.pan,
            pincode: row.pincode,
            state: row.state,
            city: row.city,
            raw_json: row.raw_json,
            created_at: row.created_at,
        })
    }
}

/// Postgres-backed submission store.
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord> {
        let step = i32::try_from(submission.step)
            .map_err(|_| StoreError::Internal(anyhow!("step {} out of range", submission.step)))?;

        let row = sqlx::query_as::<_, PgSubmissionRow>(
            r#"
            INSERT INTO udyam_submissions
                (id, step, aadhaar, mobile, otp, pan, pincode, state, city, raw_json, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING id, step, aadhaar, mobile, otp, pan, pincode, state, city, raw_json, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(step)
        .bind(&submission.aadhaar)
        .bind(&submission.mobile)
        .bind(&submission.otp)
        .bind(&submission.pan)
        .bind(&submission.pincode)
        .bind(&submission.state)
        .bind(&submission.city)
        .bind(&submission.raw_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>> {
        let row = sqlx::query_as::<_, PgSubmissionRow>(
            r#"
            SELECT id, step, aadhaar, mobile, otp, pan, pincode, state, city, raw_json, created_at
            FROM udyam_submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;

        row.map(SubmissionRecord::try_from).transpose()
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM udyam_submissions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(count.max(0) as u64)
    }
}
