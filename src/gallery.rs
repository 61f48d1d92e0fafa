use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{Error, Result};
use crate::metadata::SqliteMetadataPool;
use crate::objects::{ObjectKey, ObjectStore};

/// An incoming upload, already pulled out of the multipart body.
pub struct NewArtwork {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// What the listing endpoint returns for each artwork: the stored metadata
/// with the object key projected into a resolvable URL.
#[derive(Serialize, Debug)]
pub struct ArtworkEntry {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The coordination layer between the record store and the object store.
///
/// This is the only place the two stores are kept consistent, and the
/// guarantees are deliberately weak: uploads write the blob before the row so
/// a row never references a blob that was never written, and deletes remove
/// the row even when the blob delete fails. Both orphan directions
/// (blob-without-row, row-without-blob) are accepted and never reconciled.
#[derive(Clone)]
pub struct Gallery<O: ObjectStore> {
    metadata: SqliteMetadataPool,
    objects: O,
}

impl<O: ObjectStore> Gallery<O> {
    pub fn new(metadata: SqliteMetadataPool, objects: O) -> Self {
        Self { metadata, objects }
    }

    /// Persists the blob, then the metadata row, returning the generated id.
    ///
    /// A blob-write failure aborts before any row is written. A row-insert
    /// failure leaves the already-written blob orphaned; it is unreachable
    /// from the listing and is not rolled back.
    pub async fn upload(&self, artwork: NewArtwork) -> Result<i64> {
        let key = ObjectKey::generate(&artwork.file_name);

        self.objects
            .put(key.as_ref(), artwork.bytes, &artwork.content_type)
            .await?;

        let id = self
            .metadata
            .get_conn()
            .await?
            .insert_artwork(
                artwork.title,
                artwork.description,
                key.as_ref(),
                Utc::now(),
            )
            .await?;

        tracing::info!("uploaded artwork {id} as {key}");
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<ArtworkEntry>> {
        let rows = self.metadata.get_conn().await?.list_artworks().await?;
        Ok(rows
            .into_iter()
            .map(|row| ArtworkEntry {
                id: row.id,
                title: row.title,
                description: row.description,
                url: self.objects.resolve(&row.object_key),
                uploaded_at: row.created_at,
            })
            .collect())
    }

    /// Deletes the artwork with the given id, or [`Error::ArtworkNotFound`].
    ///
    /// The blob delete is best-effort: losing the ability to delete a record
    /// because the object store is transiently unavailable would be worse
    /// than leaving an orphaned blob behind, so a failure there is logged
    /// and the row is removed regardless.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut conn = self.metadata.get_conn().await?;
        let artwork = conn.get_artwork(id).await?.ok_or(Error::ArtworkNotFound)?;

        if let Err(e) = self.objects.delete(&artwork.object_key).await {
            tracing::warn!("failed to delete object {}: {e}", artwork.object_key);
        }

        conn.delete_artwork(id).await?;
        Ok(())
    }
}
