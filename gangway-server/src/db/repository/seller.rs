//! Seller Repository

use super::{RepoError, RepoResult};
use shared::models::{Seller, SellerCreate, SellerUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, phone, is_active, created_at, updated_at";

pub async fn create(pool: &SqlitePool, data: SellerCreate) -> RepoResult<Seller> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Seller name must not be empty".into()));
    }
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO seller (id, name, phone, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, 1, ?4, ?4)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.phone)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create seller".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Seller>> {
    let seller = sqlx::query_as::<_, Seller>(&format!("SELECT {COLUMNS} FROM seller WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(seller)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Seller>> {
    let sellers =
        sqlx::query_as::<_, Seller>(&format!("SELECT {COLUMNS} FROM seller ORDER BY name ASC"))
            .fetch_all(pool)
            .await?;
    Ok(sellers)
}

/// Existence check used when resolving an explicit seller reference.
pub async fn exists(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seller WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

pub async fn update(pool: &SqlitePool, id: i64, data: SellerUpdate) -> RepoResult<Seller> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE seller SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), is_active = COALESCE(?3, is_active), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Seller {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Seller {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    #[tokio::test]
    async fn test_create_find_update() {
        let pool = test_pool().await;
        let s = create(
            &pool,
            SellerCreate {
                name: "Carmen".into(),
                phone: Some("600123456".into()),
            },
        )
        .await
        .unwrap();
        assert!(s.is_active);

        let mut conn = pool.acquire().await.unwrap();
        assert!(exists(&mut conn, s.id).await.unwrap());
        assert!(!exists(&mut conn, 424242).await.unwrap());
        drop(conn);

        let updated = update(
            &pool,
            s.id,
            SellerUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let pool = test_pool().await;
        let err = create(
            &pool,
            SellerCreate {
                name: "  ".into(),
                phone: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
