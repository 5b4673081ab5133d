//! Postgres-backed account repository.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, query_as, FromRow, PgPool, Postgres, Row};

use super::StoreError;
use crate::accounts::domain::{Role, User, UserId};
use crate::accounts::repository::UserRepository;

const INSERT_USER_SQL: &str = include_str!("sql/insert_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let stored = query_as::<Postgres, User>(INSERT_USER_SQL)
            .bind(user.id.0)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.label())
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = query_as::<Postgres, User>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;
        let role = role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: UserId(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn account(email: &str, role: Role) -> User {
        User {
            id: UserId::generate(),
            name: "Desk Admin".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role,
            created_at: DateTime::<Utc>::from_timestamp(1_748_000_000, 0).expect("timestamp"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn insert_then_find_by_email(pool: PgPool) -> Result<(), StoreError> {
        let repo = PgUserRepository::new(pool);
        let admin = account("admin@example.com", Role::Admin);

        assert_eq!(repo.insert(admin.clone()).await?, admin);
        assert_eq!(repo.find_by_email("admin@example.com").await?, Some(admin));
        assert_eq!(repo.find_by_email("nobody@example.com").await?, None);
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn duplicate_email_is_a_conflict(pool: PgPool) -> Result<(), StoreError> {
        let repo = PgUserRepository::new(pool);
        repo.insert(account("ann@example.com", Role::User)).await?;

        let duplicate = repo.insert(account("ann@example.com", Role::Admin)).await;
        assert!(matches!(duplicate, Err(StoreError::Conflict)));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn schema_requires_lowercase_emails(pool: PgPool) -> Result<(), StoreError> {
        let repo = PgUserRepository::new(pool);

        let result = repo.insert(account("Ann@Example.com", Role::User)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(repo.find_by_email("Ann@Example.com").await?, None);
        Ok(())
    }
}
