//! Sequence counters
//!
//! One `id_sequences` row per [`SequenceKind`]. `next_value` advances it
//! with `UPDATE ... RETURNING`, which takes the row lock until the
//! enclosing transaction ends, so concurrent writers queue behind each
//! other and never see the same value.
//!
//! `reconcile` runs at startup and lifts each counter to at least the
//! highest code already stored, which covers rows written before the
//! counters existed or restored from a backup.

use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use core_kernel::{AllocationError, SequenceKind};
use domain_claims::allocator::max_sequence;

use crate::error::DatabaseError;

fn to_sequence(kind: SequenceKind, value: i64) -> Result<u64, AllocationError> {
    u64::try_from(value).map_err(|_| AllocationError::OutOfRange { kind, value })
}

fn to_column(kind: SequenceKind, value: u64) -> Result<i64, AllocationError> {
    i64::try_from(value).map_err(|_| AllocationError::Exhausted {
        kind,
        max: kind.max_value(),
    })
}

/// Advances the counter of `kind` and returns the new value
///
/// Must run inside the transaction that stores the identifier.
pub async fn next_value(conn: &mut PgConnection, kind: SequenceKind) -> Result<u64, DatabaseError> {
    let value: Option<i64> = sqlx::query_scalar(
        "UPDATE id_sequences SET last_value = last_value + 1 WHERE kind = $1 RETURNING last_value",
    )
    .bind(kind.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let value = match value {
        Some(value) => value,
        // Counter row missing, e.g. deleted by hand: recreate it at 1
        None => {
            sqlx::query_scalar(
                r#"
                INSERT INTO id_sequences (kind, last_value) VALUES ($1, 1)
                ON CONFLICT (kind) DO UPDATE SET last_value = id_sequences.last_value + 1
                RETURNING last_value
                "#,
            )
            .bind(kind.as_str())
            .fetch_one(&mut *conn)
            .await?
        }
    };

    let value = to_sequence(kind, value)?;
    if value > kind.max_value() {
        return Err(AllocationError::Exhausted {
            kind,
            max: kind.max_value(),
        }
        .into());
    }
    Ok(value)
}

/// Takes the row lock of the counter of `kind` without advancing it
///
/// Used to serialize lookups that may end in an allocation.
pub async fn lock(conn: &mut PgConnection, kind: SequenceKind) -> Result<(), DatabaseError> {
    sqlx::query("SELECT last_value FROM id_sequences WHERE kind = $1 FOR UPDATE")
        .bind(kind.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(())
}

/// Current counter value without advancing it
pub async fn current_value(pool: &PgPool, kind: SequenceKind) -> Result<u64, DatabaseError> {
    let value: Option<i64> = sqlx::query_scalar("SELECT last_value FROM id_sequences WHERE kind = $1")
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await?;
    Ok(to_sequence(kind, value.unwrap_or(0))?)
}

async fn stored_codes(pool: &PgPool, kind: SequenceKind) -> Result<Vec<String>, DatabaseError> {
    let sql = match kind {
        SequenceKind::Client => "SELECT client_id FROM clients",
        SequenceKind::Claim => "SELECT claim_id FROM claims WHERE claim_id IS NOT NULL",
    };
    Ok(sqlx::query_scalar(sql).fetch_all(pool).await?)
}

/// Lifts every counter to the highest stored code
///
/// Fails when a stored code does not parse.
#[instrument(skip(pool))]
pub async fn reconcile(pool: &PgPool) -> Result<(), DatabaseError> {
    for kind in [SequenceKind::Client, SequenceKind::Claim] {
        let codes = stored_codes(pool, kind).await?;
        let highest = max_sequence(kind, codes.iter().map(String::as_str))?;
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO id_sequences (kind, last_value) VALUES ($1, $2)
            ON CONFLICT (kind) DO UPDATE
                SET last_value = GREATEST(id_sequences.last_value, EXCLUDED.last_value)
            RETURNING last_value
            "#,
        )
        .bind(kind.as_str())
        .bind(to_column(kind, highest)?)
        .fetch_one(pool)
        .await?;
        info!(%kind, stored = codes.len(), counter = value, "Sequence reconciled");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_counter_is_out_of_range() {
        assert_eq!(
            to_sequence(SequenceKind::Claim, -1),
            Err(AllocationError::OutOfRange {
                kind: SequenceKind::Claim,
                value: -1
            })
        );
        assert_eq!(to_sequence(SequenceKind::Claim, 12), Ok(12));
    }

    #[test]
    fn test_column_conversion() {
        assert_eq!(to_column(SequenceKind::Client, 99_999), Ok(99_999));
        assert!(to_column(SequenceKind::Client, u64::MAX).is_err());
    }
}
