use axum::{
    extract::{Extension, Multipart, Path},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{Error, Result};
use crate::gallery::{Gallery, NewArtwork};
use crate::objects::ObjectStore;

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    id: i64,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

// multipart fields: binary `image` plus optional `title`/`description`
pub(crate) async fn upload<O: ObjectStore>(
    Extension(gallery): Extension<Gallery<O>>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut title = None;
    let mut description = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            Some("image") => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                image = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) = image.ok_or(Error::MissingImagePart)?;

    let id = gallery
        .upload(NewArtwork {
            title,
            description,
            file_name,
            content_type,
            bytes,
        })
        .await?;

    Ok(Json(UploadResponse { success: true, id }).into_response())
}

pub(crate) async fn list<O: ObjectStore>(
    Extension(gallery): Extension<Gallery<O>>,
) -> Result<Response> {
    let entries = gallery.list().await?;
    Ok(Json(entries).into_response())
}

pub(crate) async fn remove<O: ObjectStore>(
    Extension(gallery): Extension<Gallery<O>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    gallery.delete(id).await?;
    Ok(Json(DeleteResponse { success: true }).into_response())
}
