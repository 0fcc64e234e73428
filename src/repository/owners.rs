use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnerAccount {
    pub id: Uuid,
    pub fullname: Option<String>,
    pub email: String,
}

#[derive(Clone)]
pub struct PgOwnerRepository {
    db: PgPool,
}

impl PgOwnerRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }

    pub async fn find_by_session(&self, token: &str) -> Result<Option<OwnerAccount>> {
        let owner = sqlx::query_as::<_, OwnerAccount>("SELECT id, fullname, email FROM store_owners WHERE session_token = $1")
            .bind(token)
            .fetch_optional(&self.db)
            .await?;
        Ok(owner)
    }
}
