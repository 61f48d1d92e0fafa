use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_query::{ColumnDef, Expr, Order, Query, SqliteQueryBuilder, Table, Value};
use sea_query_binder::SqlxBinder;
use serde::Deserialize;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row};

use super::types::{Artwork, Artworks};
use crate::errors::Result;

#[derive(Clone, Deserialize)]
pub struct SqliteConfig {
    pub connection_string: String,
}

impl SqliteConfig {
    /// Opens the pool and creates the `artwork` table if it doesn't exist
    /// yet. The database file itself is created on first use.
    pub async fn new_metadata(&self) -> Result<SqliteMetadataPool> {
        let options =
            SqliteConnectOptions::from_str(&self.connection_string)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let sql = Table::create()
            .table(Artworks::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Artworks::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Artworks::Title).text())
            .col(ColumnDef::new(Artworks::Description).text())
            .col(ColumnDef::new(Artworks::ObjectKey).text().not_null())
            .col(ColumnDef::new(Artworks::CreatedAt).big_integer().not_null())
            .build(SqliteQueryBuilder);
        sqlx::query(&sql).execute(&pool).await?;

        Ok(SqliteMetadataPool { pool })
    }
}

#[derive(Clone)]
pub struct SqliteMetadataPool {
    pool: Pool<Sqlite>,
}

impl SqliteMetadataPool {
    pub async fn get_conn(&self) -> Result<SqliteMetadataConn> {
        Ok(SqliteMetadataConn {
            conn: self.pool.acquire().await?,
        })
    }
}

pub struct SqliteMetadataConn {
    conn: PoolConnection<Sqlite>,
}

impl SqliteMetadataConn {
    pub async fn insert_artwork(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        object_key: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let (sql, values) = Query::insert()
            .into_table(Artworks::Table)
            .columns([
                Artworks::Title,
                Artworks::Description,
                Artworks::ObjectKey,
                Artworks::CreatedAt,
            ])
            .values([
                Value::from(title).into(),
                Value::from(description).into(),
                Value::from(object_key).into(),
                created_at.timestamp_millis().into(),
            ])?
            .returning_col(Artworks::Id)
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(row.try_get("id")?)
    }

    /// All artwork rows, newest first. Rows sharing the same millisecond
    /// timestamp come back in unspecified relative order.
    pub async fn list_artworks(&mut self) -> Result<Vec<Artwork>> {
        let (sql, values) = Query::select()
            .from(Artworks::Table)
            .columns([
                Artworks::Id,
                Artworks::Title,
                Artworks::Description,
                Artworks::ObjectKey,
                Artworks::CreatedAt,
            ])
            .order_by(Artworks::CreatedAt, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, Artwork, _>(&sql, values)
            .fetch_all(&mut *self.conn)
            .await?)
    }

    pub async fn get_artwork(&mut self, id: i64) -> Result<Option<Artwork>> {
        let (sql, values) = Query::select()
            .from(Artworks::Table)
            .columns([
                Artworks::Id,
                Artworks::Title,
                Artworks::Description,
                Artworks::ObjectKey,
                Artworks::CreatedAt,
            ])
            .and_where(Expr::col(Artworks::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, Artwork, _>(&sql, values)
            .fetch_optional(&mut *self.conn)
            .await?)
    }

    /// Returns whether a row was actually removed.
    pub async fn delete_artwork(&mut self, id: i64) -> Result<bool> {
        let (sql, values) = Query::delete()
            .from_table(Artworks::Table)
            .and_where(Expr::col(Artworks::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool(dir: &tempfile::TempDir) -> SqliteMetadataPool {
        let config = SqliteConfig {
            connection_string: format!("sqlite://{}", dir.path().join("test.db").display()),
        };
        config.new_metadata().await.unwrap()
    }

    #[tokio::test]
    async fn insert_get_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let mut conn = pool.get_conn().await.unwrap();

        let id = conn
            .insert_artwork(
                Some("Cat".into()),
                None,
                "abc-cat.png",
                Utc::now(),
            )
            .await
            .unwrap();

        let artwork = conn.get_artwork(id).await.unwrap().unwrap();
        assert_eq!(artwork.title.as_deref(), Some("Cat"));
        assert_eq!(artwork.description, None);
        assert_eq!(artwork.object_key, "abc-cat.png");

        assert!(conn.delete_artwork(id).await.unwrap());
        assert!(conn.get_artwork(id).await.unwrap().is_none());
        assert!(!conn.delete_artwork(id).await.unwrap());
    }

    #[tokio::test]
    async fn table_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteConfig {
            connection_string: format!("sqlite://{}", dir.path().join("test.db").display()),
        };
        let pool = config.new_metadata().await.unwrap();
        let mut conn = pool.get_conn().await.unwrap();
        let id = conn
            .insert_artwork(None, None, "key", Utc::now())
            .await
            .unwrap();
        drop(conn);
        drop(pool);

        // reopening must not wipe existing rows
        let pool = config.new_metadata().await.unwrap();
        let mut conn = pool.get_conn().await.unwrap();
        assert!(conn.get_artwork(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn listing_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let mut conn = pool.get_conn().await.unwrap();

        let base = Utc::now();
        for (i, key) in ["first", "second", "third"].iter().enumerate() {
            conn.insert_artwork(
                None,
                None,
                key,
                base + chrono::Duration::milliseconds(i as i64 * 10),
            )
            .await
            .unwrap();
        }

        let rows = conn.list_artworks().await.unwrap();
        let keys: Vec<&str> = rows.iter().map(|r| r.object_key.as_str()).collect();
        assert_eq!(keys, vec!["third", "second", "first"]);
    }
}
