use crate::errors::ApiError;
use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Name a file is stored under: `<unix millis>_<random>_<original basename>`
///
/// The random segment keeps concurrent uploads of the same name apart.
/// Characters outside `[A-Za-z0-9._-]` become `_` so the name can be used
/// as a URL path segment as is.
pub fn stored_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("upload");

    let base: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}_{}_{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        base
    )
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", e.body_text()))
    }
}

/// Write the multipart field called `field_name` into `dir`
///
/// Returns the stored filename. Other fields in the body are skipped.
pub async fn save_field(
    mut multipart: Multipart,
    field_name: &str,
    dir: &Path,
) -> Result<String, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let filename = stored_filename(field.file_name().unwrap_or_default());
        let data = field.bytes().await.map_err(multipart_error)?;

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(&filename), &data).await?;

        info!("Stored upload {} ({} bytes)", filename, data.len());
        return Ok(filename);
    }

    Err(ApiError::BadRequest(format!(
        "Missing file field '{}'",
        field_name
    )))
}

/// Delete a file that has been replaced. Failures are only logged.
pub async fn remove_file(dir: &Path, filename: &str) {
    if let Err(e) = tokio::fs::remove_file(dir.join(filename)).await {
        warn!("Could not remove old upload {}: {}", filename, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_basename_only() {
        let name = stored_filename("../../etc/passwd");
        assert!(name.ends_with("_passwd"));
        assert!(!name.contains('/'));

        let name = stored_filename("C:\\photos\\cat.png");
        assert!(name.ends_with("_cat.png"));
    }

    #[test]
    fn prefix_is_timestamp_and_random_segment() {
        let name = stored_filename("cat.png");
        let mut parts = name.splitn(3, '_');
        assert!(parts.next().unwrap().parse::<i64>().unwrap() > 0);
        assert_eq!(parts.next().unwrap().len(), 32);
        assert_eq!(parts.next().unwrap(), "cat.png");
    }

    #[test]
    fn same_name_never_collides() {
        let names: std::collections::HashSet<String> =
            (0..200).map(|_| stored_filename("me.png")).collect();
        assert_eq!(names.len(), 200);
    }

    #[test]
    fn unsafe_url_characters_are_replaced() {
        let name = stored_filename("my photo#1?.png");
        assert!(name.ends_with("_my_photo_1_.png"));
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || "._-".contains(c)));

        assert!(stored_filename("café.png").ends_with("_caf_.png"));
    }

    #[test]
    fn empty_names_get_a_placeholder() {
        assert!(stored_filename("").ends_with("_upload"));
        assert!(stored_filename("dir/").ends_with("_upload"));
        assert!(stored_filename("..").ends_with("_upload"));
    }

    #[tokio::test]
    async fn remove_missing_file_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        remove_file(dir.path(), "nope.png").await;

        let path = dir.path().join("here.png");
        tokio::fs::write(&path, b"x").await.unwrap();
        remove_file(dir.path(), "here.png").await;
        assert!(!path.exists());
    }
}
