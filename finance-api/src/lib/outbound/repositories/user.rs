use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::DirectoryError;

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, status, \
     created_at, updated_at, created_by, updated_by";

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, DirectoryError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn record_audit(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &UserId,
        action: &str,
        performed_by: &str,
        details: String,
    ) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_audit_log (user_id, action, performed_by, details)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id.0)
        .bind(action)
        .bind(performed_by)
        .bind(details)
        .execute(&mut **tx)
        .await
        .map_err(database_error)?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, DirectoryError> {
        self.find_one("username", username.as_str()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        self.find_one("email", email).await
    }

    async fn create(&self, user: User) -> Result<UserId, DirectoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                               status, created_at, updated_at, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(&user.created_by)
        .bind(&user.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| uniqueness_error(e, &user))?;

        Self::record_audit(
            &mut tx,
            &user.id,
            "CREATE_USER",
            &user.created_by,
            format!("username={} status={}", user.username, user.status),
        )
        .await?;

        tx.commit().await.map_err(database_error)?;

        Ok(user.id)
    }

    async fn update(&self, user: User) -> Result<(), DirectoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4, status = $5,
                updated_at = $6, updated_by = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.status.as_str())
        .bind(user.updated_at.unwrap_or_else(Utc::now))
        .bind(&user.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| uniqueness_error(e, &user))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(user.id.to_string()));
        }

        let performed_by = user.updated_by.as_deref().unwrap_or("SYSTEM");
        Self::record_audit(
            &mut tx,
            &user.id,
            "UPDATE_USER",
            performed_by,
            format!("status={}", user.status),
        )
        .await?;

        tx.commit().await.map_err(database_error)?;

        Ok(())
    }

    async fn list_by_status(&self, status: UserStatus) -> Result<Vec<User>, DirectoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE status = $1 ORDER BY created_at",
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    created_by: String,
    updated_by: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = DirectoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            DirectoryError::Database(format!("Stored user {} has invalid {}: {}", row.id, field, e))
        };

        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username.clone()).map_err(|e| corrupt("username", &e))?,
            email: EmailAddress::new(row.email.clone()).map_err(|e| corrupt("email", &e))?,
            password_hash: row.password_hash.clone(),
            first_name: PersonName::new(row.first_name.clone())
                .map_err(|e| corrupt("first name", &e))?,
            last_name: PersonName::new(row.last_name.clone())
                .map_err(|e| corrupt("last name", &e))?,
            status: row.status.parse().map_err(|e| corrupt("status", &e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by.clone(),
            updated_by: row.updated_by.clone(),
        })
    }
}

fn database_error(e: sqlx::Error) -> DirectoryError {
    DirectoryError::Database(e.to_string())
}

fn uniqueness_error(e: sqlx::Error, user: &User) -> DirectoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some(USERNAME_CONSTRAINT) {
                return DirectoryError::DuplicateUsername(user.username.to_string());
            }
            if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                return DirectoryError::DuplicateEmail(user.email.to_string());
            }
        }
    }
    database_error(e)
}
