/*
 * Responsibility
 * - users テーブルから token の subject に対応するユーザーを引く (read-only)
 * - UserResolver の Postgres 実装
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::services::auth::user::{User, UserResolveError, UserResolver};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.to_string(),
            user_name: Some(row.user_name),
            image_url: row.image_url,
        }
    }
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", "imageUrl"
        FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Subjects are user UUIDs by convention; anything else resolves to no user.
#[derive(Debug, Clone)]
pub struct PgUserResolver {
    db: PgPool,
}

impl PgUserResolver {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserResolver for PgUserResolver {
    async fn resolve(&self, subject: &str) -> Result<Option<User>, UserResolveError> {
        let Ok(user_id) = Uuid::parse_str(subject) else {
            tracing::debug!(sub = %subject, "subject is not a user uuid");
            return Ok(None);
        };

        Ok(get(&self.db, user_id).await?.map(User::from))
    }
}
