//! Clients repository implementation
//!
//! Methods on [`ClientRepository`] run against the pool. The associated
//! functions taking a `PgConnection` are meant for use inside a transaction
//! opened by the adapter.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{ClientCode, ClientId};
use domain_claims::Client;

use crate::error::DatabaseError;

const CLIENT_COLUMNS: &str = "id, client_id, name, created_at";

/// Escapes `%`, `_` and `\` for use inside a `LIKE` pattern
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Database row for client
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub client_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ClientRow {
    pub fn from_client(client: &Client) -> Self {
        Self {
            id: *client.id.as_uuid(),
            client_id: client.client_id.to_string(),
            name: client.name.clone(),
            created_at: client.created_at,
        }
    }
}

impl TryFrom<ClientRow> for Client {
    type Error = DatabaseError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let code = ClientCode::parse(&row.client_id)
            .map_err(|_| DatabaseError::invalid_column("clients.client_id", &row.client_id))?;
        Ok(Client {
            id: ClientId::from_uuid(row.id),
            client_id: code,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

/// Repository for managing clients
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clients ordered by name
    pub async fn list(&self) -> Result<Vec<ClientRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM clients ORDER BY name, created_at", CLIENT_COLUMNS);
        Ok(sqlx::query_as::<_, ClientRow>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ClientRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<ClientRow>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_name_in(&mut conn, name).await
    }

    /// Case-insensitive substring search, ordered by name
    pub async fn search(&self, term: &str) -> Result<Vec<ClientRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM clients WHERE name ILIKE $1 ORDER BY name, created_at",
            CLIENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(format!("%{}%", escape_like(term)))
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Option<ClientRow>, DatabaseError> {
        let sql = format!(
            "UPDATE clients SET name = $2 WHERE id = $1 RETURNING {}",
            CLIENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Deletes a client; its claims go with it through the cascade
    ///
    /// Returns the number of claims removed, `None` when the client did
    /// not exist.
    pub async fn delete(&self, id: Uuid) -> Result<Option<u64>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let claims: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims WHERE client_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok((deleted > 0).then_some(claims as u64))
    }

    // ------------------------------------------------------------------
    // Transaction-bound
    // ------------------------------------------------------------------

    /// Oldest client whose name matches case-insensitively
    pub async fn find_by_name_in(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<ClientRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM clients WHERE LOWER(name) = LOWER($1) ORDER BY created_at, id LIMIT 1",
            CLIENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(name.trim())
            .fetch_optional(&mut *conn)
            .await?)
    }

    /// Reads a client and holds its row lock until the transaction ends
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<ClientRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM clients WHERE id = $1 FOR UPDATE", CLIENT_COLUMNS);
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?)
    }

    pub async fn insert(conn: &mut PgConnection, row: &ClientRow) -> Result<ClientRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO clients ({0}) VALUES ($1, $2, $3, $4) RETURNING {0}",
            CLIENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(row.id)
            .bind(&row.client_id)
            .bind(&row.name)
            .bind(row.created_at)
            .fetch_one(&mut *conn)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("acme"), "acme");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_row_with_bad_code_is_rejected() {
        let row = ClientRow {
            id: Uuid::now_v7(),
            client_id: "C-1".to_string(),
            name: "Acme".to_string(),
            created_at: Utc::now(),
        };
        let result = Client::try_from(row);
        assert!(matches!(result, Err(DatabaseError::SerializationError(_))));
    }

    #[test]
    fn test_row_round_trips_client() {
        let client = Client::new(ClientCode::first(), "Acme Corp", Utc::now());
        let back = Client::try_from(ClientRow::from_client(&client)).unwrap();
        assert_eq!(back, client);
    }
}
