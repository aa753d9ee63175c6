use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::integration::storage::MediaStorage;

#[derive(Serialize)]
pub struct UploadResponse {
    url: String,
}

pub async fn upload(
    media_storage: State<MediaStorage>,
    mut multipart: Multipart,
) -> crate::Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(super::Error::from)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("upload")
            .to_owned();
        let bytes = field.bytes().await.map_err(super::Error::from)?;

        let url = media_storage
            .upload(&filename, bytes.to_vec())
            .await
            .map_err(super::Error::from)?;

        return Ok(Json(UploadResponse { url }));
    }

    Err(super::Error::MissingFile.into())
}
