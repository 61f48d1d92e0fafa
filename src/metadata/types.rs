use chrono::{DateTime, Utc};
use sea_query::Iden;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// A single row in the `artwork` table.
///
/// `object_key` references a blob in the object store at creation time; the
/// system does not enforce that the blob stays live afterwards.
#[derive(Clone, Debug)]
pub struct Artwork {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub object_key: String,
    pub created_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, SqliteRow> for Artwork {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let millis: i64 = row.try_get("created_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            object_key: row.try_get("object_key")?,
            created_at: DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                sqlx::Error::ColumnDecode {
                    index: "created_at".to_string(),
                    source: format!("timestamp out of range: {}", millis).into(),
                }
            })?,
        })
    }
}

#[derive(Iden)]
pub(crate) enum Artworks {
    #[iden = "artwork"]
    Table,
    Id,
    Title,
    Description,
    ObjectKey,
    CreatedAt,
}
