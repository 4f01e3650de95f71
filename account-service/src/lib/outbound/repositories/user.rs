use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use super::database_error;
use crate::domain::errors::PersistenceError;
use crate::domain::user::models::Credential;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Column list shared by every query returning a user.
pub(crate) const USER_COLUMNS: &str =
    "users.id, users.created_at, users.name, users.email, users.password_hash, users.activated, users.version";

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    email: String,
    password_hash: String,
    activated: bool,
    version: i32,
}

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let password = Credential::from_stored(row.password_hash).map_err(|e| {
            PersistenceError::Integrity(format!("user {}: {}", row.id, e))
        })?;

        Ok(User {
            id: UserId(row.id),
            created_at: row.created_at,
            name: row.name,
            email: row.email,
            password,
            activated: row.activated,
            version: row.version,
        })
    }
}

fn unique_email_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_CONSTRAINT))
        .unwrap_or(false)
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, query: &str, bind: FindBy<'_>) -> Result<Option<User>, UserError> {
        let query = sqlx::query_as::<_, UserRow>(query);
        let query = match bind {
            FindBy::Id(id) => query.bind(id),
            FindBy::Email(email) => query.bind(email),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(row.map(User::try_from).transpose()?)
    }
}

enum FindBy<'a> {
    Id(i64),
    Email(&'a str),
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, activated)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password.as_str())
        .bind(user.activated)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if unique_email_violation(&e) {
                return UserError::EmailAlreadyExists(user.email.clone());
            }
            UserError::Persistence(database_error(e))
        })?;

        Ok(User::try_from(row)?)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.find_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE users.id = $1"),
            FindBy::Id(id.0),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.find_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE users.email = $1"),
            FindBy::Email(email),
        )
        .await
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password.as_str())
        .bind(user.activated)
        .bind(user.id.0)
        .bind(user.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if unique_email_violation(&e) {
                return UserError::EmailAlreadyExists(user.email.clone());
            }
            UserError::Persistence(database_error(e))
        })?;

        match row {
            Some(row) => Ok(User::try_from(row)?),
            None => Err(UserError::EditConflict(user.id)),
        }
    }
}
