use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;

/// A multipart file part written to a temporary file. The file is removed
/// when the value is dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}

/// Text fields and staged file fields of a multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    texts: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<StagedFile> {
        self.files.remove(name)
    }
}

/// Drain a multipart body. Fields named in `file_fields` are streamed to temp
/// files capped at `max_size` bytes; empty file parts are treated as absent.
/// Every other named field is read as text.
pub async fn read_form(
    multipart: &mut Multipart,
    file_fields: &[&str],
    max_size: u64,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if file_fields.contains(&name.as_str()) {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let staged = stage_field(field, file_name, max_size).await?;
            if staged.size > 0 {
                form.files.insert(name, staged);
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
            form.texts.insert(name, text);
        }
    }

    Ok(form)
}

async fn stage_field(
    mut field: Field<'_>,
    file_name: String,
    max_size: u64,
) -> Result<StagedFile, AppError> {
    let path = std::env::temp_dir().join(format!("vidline-upload-{}", Uuid::new_v4()));
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    // Owns the path from here on, so every early return cleans up.
    let mut staged = StagedFile {
        path,
        file_name,
        size: 0,
    };

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        staged.size += chunk.len() as u64;
        if staged.size > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

    Ok(staged)
}
