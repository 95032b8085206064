//! Claims repository implementation
//!
//! Claims are always read joined with their client so a row maps straight
//! to a [`ClaimRecord`]. Writes happen inside the adapter's transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{ClaimCode, ClientCode, ClientId, ClientReference, ShipmentId};
use domain_claims::filter::ClientSelector;
use domain_claims::{
    Branch, Claim, ClaimFilter, ClaimRecord, ClaimStatus, Client, SettlementStatus,
};

use crate::error::DatabaseError;
use crate::repositories::clients::escape_like;

const SELECT_RECORD: &str = r#"
    SELECT
        cl.id, cl.claim_no, cl.claim_id, cl.client_reference, cl.client_id,
        cl.branch, cl.brand, cl.claimant,
        cl.intent_to_claim, cl.intent_date, cl.formal_claim_received, cl.formal_claim_date,
        cl.claimed_amount, cl.paid_by_carrier, cl.paid_by_intermediary, cl.paid_by_insurer,
        cl.total_savings, cl.financial_exposure, cl.settlement_status, cl.status,
        cl.closed_date, cl.created_at, cl.updated_at,
        c.client_id AS client_code, c.name AS client_name, c.created_at AS client_created_at
    FROM claims cl
    JOIN clients c ON c.id = cl.client_id
"#;

const ORDER_NEWEST_FIRST: &str = " ORDER BY cl.created_at DESC, cl.id DESC";

/// Database row for a claim joined with its client
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub claim_no: String,
    pub claim_id: Option<String>,
    pub client_reference: Option<String>,
    pub client_id: Uuid,
    pub branch: Option<String>,
    pub brand: Option<String>,
    pub claimant: Option<String>,
    pub intent_to_claim: Option<bool>,
    pub intent_date: Option<NaiveDate>,
    pub formal_claim_received: Option<bool>,
    pub formal_claim_date: Option<NaiveDate>,
    pub claimed_amount: Option<Decimal>,
    pub paid_by_carrier: Option<Decimal>,
    pub paid_by_intermediary: Option<Decimal>,
    pub paid_by_insurer: Option<Decimal>,
    pub total_savings: Option<Decimal>,
    pub financial_exposure: Option<Decimal>,
    pub settlement_status: Option<String>,
    pub status: String,
    pub closed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client_code: String,
    pub client_name: String,
    pub client_created_at: DateTime<Utc>,
}

fn parse_optional<T>(
    column: &str,
    value: Option<String>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, DatabaseError> {
    value
        .map(|v| parse(&v).ok_or_else(|| DatabaseError::invalid_column(column, &v)))
        .transpose()
}

impl TryFrom<ClaimRow> for ClaimRecord {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let client = Client {
            id: ClientId::from_uuid(row.client_id),
            client_id: ClientCode::parse(&row.client_code)
                .map_err(|_| DatabaseError::invalid_column("clients.client_id", &row.client_code))?,
            name: row.client_name,
            created_at: row.client_created_at,
        };

        let status = ClaimStatus::parse(&row.status)
            .ok_or_else(|| DatabaseError::invalid_column("claims.status", &row.status))?;

        let claim = Claim {
            id: ShipmentId::from_uuid(row.id),
            claim_no: row.claim_no,
            claim_id: parse_optional("claims.claim_id", row.claim_id, |v| ClaimCode::parse(v).ok())?,
            client_reference: parse_optional(
                "claims.client_reference",
                row.client_reference,
                ClientReference::parse,
            )?,
            client_id: client.id,
            branch: parse_optional("claims.branch", row.branch, Branch::parse)?,
            brand: row.brand,
            claimant: row.claimant,
            intent_to_claim: row.intent_to_claim,
            intent_date: row.intent_date,
            formal_claim_received: row.formal_claim_received,
            formal_claim_date: row.formal_claim_date,
            claimed_amount: row.claimed_amount,
            paid_by_carrier: row.paid_by_carrier,
            paid_by_intermediary: row.paid_by_intermediary,
            paid_by_insurer: row.paid_by_insurer,
            total_savings: row.total_savings,
            financial_exposure: row.financial_exposure,
            settlement_status: parse_optional(
                "claims.settlement_status",
                row.settlement_status,
                SettlementStatus::parse,
            )?,
            status,
            closed_date: row.closed_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        Ok(ClaimRecord { claim, client })
    }
}

/// Appends the `WHERE` clause for `filter`
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ClaimFilter) {
    builder.push(" WHERE TRUE");

    if let Some(term) = filter.claim_no_term() {
        let pattern = format!("%{}%", escape_like(term));
        builder
            .push(" AND (cl.claim_no ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR cl.claim_id ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    match filter.client_selector() {
        Some(ClientSelector::Id(id)) => {
            builder.push(" AND c.id = ").push_bind(*id.as_uuid());
        }
        Some(ClientSelector::NameContains(term)) => {
            builder
                .push(" AND c.name ILIKE ")
                .push_bind(format!("%{}%", escape_like(&term)));
        }
        None => {}
    }

    if let Some(code) = filter.client_unique_id_term() {
        builder.push(" AND c.client_id = ").push_bind(code.to_string());
    }

    if let Some(branch) = filter.branch_term() {
        builder.push(" AND cl.branch = ").push_bind(branch.to_string());
    }

    // NULL dates drop out of any comparison, matching the in-memory filter
    if let Some(from) = filter.intent_date_from {
        builder.push(" AND cl.intent_date >= ").push_bind(from);
    }
    if let Some(to) = filter.intent_date_to {
        builder.push(" AND cl.intent_date <= ").push_bind(to);
    }
    if let Some(from) = filter.formal_date_from {
        builder.push(" AND cl.formal_claim_date >= ").push_bind(from);
    }
    if let Some(to) = filter.formal_date_to {
        builder.push(" AND cl.formal_claim_date <= ").push_bind(to);
    }
}

/// Repository for managing claims
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ClaimRow>, DatabaseError> {
        let sql = format!("{} WHERE cl.id = $1", SELECT_RECORD);
        Ok(sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_number(&self, claim_no: &str) -> Result<Option<ClaimRow>, DatabaseError> {
        let sql = format!("{} WHERE cl.claim_no = $1", SELECT_RECORD);
        Ok(sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_no)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Claims matching `filter`, newest first
    pub async fn list(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRow>, DatabaseError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_RECORD);
        push_filter(&mut builder, filter);
        builder.push(ORDER_NEWEST_FIRST);
        Ok(builder
            .build_query_as::<ClaimRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn count_for_client(&self, client_id: Uuid) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM claims WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM claims WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM claims").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    // ------------------------------------------------------------------
    // Transaction-bound
    // ------------------------------------------------------------------

    /// Id of another claim holding `claim_no`
    pub async fn number_taken(
        conn: &mut PgConnection,
        claim_no: &str,
        own: Uuid,
    ) -> Result<Option<Uuid>, DatabaseError> {
        Ok(
            sqlx::query_scalar("SELECT id FROM claims WHERE claim_no = $1 AND id <> $2")
                .bind(claim_no)
                .bind(own)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    /// Stored references of `client_id` shaped `{name}-%-{YYYYMMDD}`
    pub async fn references_for(
        conn: &mut PgConnection,
        client_id: Uuid,
        sanitized_name: &str,
        day: NaiveDate,
    ) -> Result<Vec<String>, DatabaseError> {
        let pattern = format!(
            "{}%{}",
            escape_like(&ClientReference::name_prefix(sanitized_name)),
            escape_like(&ClientReference::date_suffix(day))
        );
        Ok(sqlx::query_scalar(
            "SELECT client_reference FROM claims WHERE client_id = $1 AND client_reference LIKE $2",
        )
        .bind(client_id)
        .bind(pattern)
        .fetch_all(&mut *conn)
        .await?)
    }

    /// Inserts or updates a claim, keeping `created_at` of an existing row
    ///
    /// Returns the stored `created_at`.
    pub async fn upsert(conn: &mut PgConnection, claim: &Claim) -> Result<DateTime<Utc>, DatabaseError> {
        Ok(sqlx::query_scalar(
            r#"
            INSERT INTO claims (
                id, claim_no, claim_id, client_reference, client_id,
                branch, brand, claimant,
                intent_to_claim, intent_date, formal_claim_received, formal_claim_date,
                claimed_amount, paid_by_carrier, paid_by_intermediary, paid_by_insurer,
                total_savings, financial_exposure, settlement_status, status,
                closed_date, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            ON CONFLICT (id) DO UPDATE SET
                claim_no = EXCLUDED.claim_no,
                claim_id = EXCLUDED.claim_id,
                client_reference = EXCLUDED.client_reference,
                client_id = EXCLUDED.client_id,
                branch = EXCLUDED.branch,
                brand = EXCLUDED.brand,
                claimant = EXCLUDED.claimant,
                intent_to_claim = EXCLUDED.intent_to_claim,
                intent_date = EXCLUDED.intent_date,
                formal_claim_received = EXCLUDED.formal_claim_received,
                formal_claim_date = EXCLUDED.formal_claim_date,
                claimed_amount = EXCLUDED.claimed_amount,
                paid_by_carrier = EXCLUDED.paid_by_carrier,
                paid_by_intermediary = EXCLUDED.paid_by_intermediary,
                paid_by_insurer = EXCLUDED.paid_by_insurer,
                total_savings = EXCLUDED.total_savings,
                financial_exposure = EXCLUDED.financial_exposure,
                settlement_status = EXCLUDED.settlement_status,
                status = EXCLUDED.status,
                closed_date = EXCLUDED.closed_date,
                updated_at = EXCLUDED.updated_at
            RETURNING created_at
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(&claim.claim_no)
        .bind(claim.claim_id.map(|c| c.to_string()))
        .bind(claim.client_reference.as_ref().map(ToString::to_string))
        .bind(claim.client_id.as_uuid())
        .bind(claim.branch.map(|b| b.code()))
        .bind(&claim.brand)
        .bind(&claim.claimant)
        .bind(claim.intent_to_claim)
        .bind(claim.intent_date)
        .bind(claim.formal_claim_received)
        .bind(claim.formal_claim_date)
        .bind(claim.claimed_amount)
        .bind(claim.paid_by_carrier)
        .bind(claim.paid_by_intermediary)
        .bind(claim.paid_by_insurer)
        .bind(claim.total_savings)
        .bind(claim.financial_exposure)
        .bind(claim.settlement_status.map(|s| s.as_str()))
        .bind(claim.status.as_str())
        .bind(claim.closed_date)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .fetch_one(&mut *conn)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> ClaimRow {
        let now = Utc::now();
        ClaimRow {
            id: Uuid::now_v7(),
            claim_no: "S100".to_string(),
            claim_id: Some("CLM000007".to_string()),
            client_reference: Some("AcmeCorp-2-20250601".to_string()),
            client_id: Uuid::now_v7(),
            branch: Some("HOU".to_string()),
            brand: None,
            claimant: Some("Jane".to_string()),
            intent_to_claim: Some(true),
            intent_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            formal_claim_received: None,
            formal_claim_date: None,
            claimed_amount: Some(dec!(500)),
            paid_by_carrier: Some(dec!(200)),
            paid_by_intermediary: None,
            paid_by_insurer: None,
            total_savings: Some(dec!(300)),
            financial_exposure: None,
            settlement_status: Some("PARTIAL".to_string()),
            status: "OPEN".to_string(),
            closed_date: None,
            created_at: now,
            updated_at: now,
            client_code: "CL00001".to_string(),
            client_name: "Acme Corp".to_string(),
            client_created_at: now,
        }
    }

    #[test]
    fn test_row_maps_to_record() {
        let record = ClaimRecord::try_from(row()).unwrap();
        assert_eq!(record.claim.claim_id.unwrap().sequence(), 7);
        assert_eq!(record.claim.client_reference.unwrap().number(), 2);
        assert_eq!(record.claim.branch, Some(Branch::Hou));
        assert_eq!(record.claim.settlement_status, Some(SettlementStatus::Partial));
        assert_eq!(record.client.client_id.to_string(), "CL00001");
        assert_eq!(record.claim.client_id, record.client.id);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut bad = row();
        bad.status = "ARCHIVED".to_string();
        assert!(matches!(
            ClaimRecord::try_from(bad),
            Err(DatabaseError::SerializationError(_))
        ));
    }

    #[test]
    fn test_filter_sql_binds_every_criterion() {
        let filter = ClaimFilter {
            claim_no: Some("S1".into()),
            client: Some("acme".into()),
            client_unique_id: Some("CL00001".into()),
            branch: Some("HOU".into()),
            intent_date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            formal_date_to: NaiveDate::from_ymd_opt(2025, 12, 31),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM claims cl JOIN clients c ON TRUE");
        push_filter(&mut builder, &filter);
        let sql = builder.sql();
        assert!(sql.contains("cl.claim_no ILIKE $1 OR cl.claim_id ILIKE $2"));
        assert!(sql.contains("c.name ILIKE $3"));
        assert!(sql.contains("c.client_id = $4"));
        assert!(sql.contains("cl.branch = $5"));
        assert!(sql.contains("cl.intent_date >= $6"));
        assert!(sql.contains("cl.formal_claim_date <= $7"));
    }

    #[test]
    fn test_empty_filter_has_no_criteria() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1");
        push_filter(&mut builder, &ClaimFilter::default());
        assert_eq!(builder.sql(), "SELECT 1 WHERE TRUE");
    }
}
