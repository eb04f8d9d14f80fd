//! PostgreSQL identity store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestgate_auth::config::is_valid_table_name;
use guestgate_auth::{ConfigError, IdentityStore, Role, StoreError, User};
use guestgate_core::{GuestId, UserId};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

const COLUMNS: &str =
    "id, guest_id, google_id, display_name, role, is_guest, created_at, updated_at";

/// Row type for user queries.
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    guest_id: Uuid,
    google_id: Option<String>,
    display_name: String,
    role: String,
    is_guest: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, StoreError> {
        let id = UserId::from_str(&self.id).map_err(|e| StoreError::Corrupt {
            details: format!("invalid user id '{}': {}", self.id, e),
        })?;
        let role = Role::from_str(&self.role).map_err(|e| StoreError::Corrupt {
            details: format!("user {id}: {e}"),
        })?;

        Ok(User::with_all_fields(
            id,
            GuestId::from_uuid(self.guest_id),
            self.google_id,
            self.display_name,
            role,
            self.is_guest,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// SQL statements for one user table.
///
/// Built once from a validated table name.
#[derive(Debug, Clone)]
struct Queries {
    create_table: String,
    insert: String,
    select_by_id: String,
    touch: String,
}

impl Queries {
    fn for_table(table: &str) -> Self {
        Self {
            create_table: format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    guest_id UUID NOT NULL UNIQUE,
                    google_id TEXT UNIQUE,
                    display_name TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'USER',
                    is_guest BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                )
                "#
            ),
            insert: format!(
                r#"
                INSERT INTO {table} ({COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {COLUMNS}
                "#
            ),
            select_by_id: format!("SELECT {COLUMNS} FROM {table} WHERE id = $1"),
            touch: format!("UPDATE {table} SET updated_at = $2 WHERE id = $1"),
        }
    }
}

/// Identity store backed by a PostgreSQL table.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
    queries: Queries,
}

impl PgIdentityStore {
    /// Creates a store over `table_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTableName`] unless the name is a plain,
    /// optionally schema-qualified, SQL identifier.
    pub fn new(pool: PgPool, table_name: &str) -> Result<Self, ConfigError> {
        if !is_valid_table_name(table_name) {
            return Err(ConfigError::InvalidTableName {
                name: table_name.to_string(),
            });
        }
        Ok(Self {
            pool,
            queries: Queries::for_table(table_name),
        })
    }

    /// Creates the user table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn ensure_schema(&self) -> guestgate_core::Result<(), StoreError> {
        sqlx::query(&self.queries.create_table)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create(&self, user: &User) -> guestgate_core::Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(&self.queries.insert)
            .bind(id_column(user.id()))
            .bind(user.guest_id().as_uuid())
            .bind(user.google_id())
            .bind(user.display_name())
            .bind(user.role().as_str())
            .bind(user.is_guest())
            .bind(user.created_at())
            .bind(user.updated_at())
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        Ok(row.try_into_user()?)
    }

    async fn find_by_id(&self, id: UserId) -> guestgate_core::Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&self.queries.select_by_id)
            .bind(id_column(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        match row {
            Some(r) => Ok(Some(r.try_into_user()?)),
            None => Ok(None),
        }
    }

    async fn touch_updated_at(
        &self,
        id: UserId,
        now: DateTime<Utc>,
    ) -> guestgate_core::Result<(), StoreError> {
        let result = sqlx::query(&self.queries.touch)
            .bind(id_column(id))
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { user_id: id }.into());
        }
        Ok(())
    }
}

/// The `id` column holds the bare ULID, the same form as token subjects
/// and JSON bodies.
fn id_column(id: UserId) -> String {
    id.as_ulid().to_string()
}

/// Sorts a database error into the store's error kinds.
fn classify(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db)
            if db.is_unique_violation()
                || db.is_check_violation()
                || db.is_foreign_key_violation() =>
        {
            StoreError::ConstraintViolation {
                details: error.to_string(),
            }
        }
        sqlx::Error::Decode(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::RowNotFound => StoreError::Corrupt {
            details: error.to_string(),
        },
        _ => StoreError::Unavailable {
            details: error.to_string(),
        },
    }
}
