//! Reads the multipart body shared by document and resource uploads.

use anyhow::anyhow;
use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use scolaris_core::AppError;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Fields of an upload form. Blank text fields count as absent.
#[derive(Debug, Clone, Default)]
pub struct UploadFields {
    pub file: Option<UploadedFile>,
    pub name: Option<String>,
    pub kind: Option<String>,
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::new(e.status(), anyhow!(e.body_text()))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadFields, AppError> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                fields.file = Some(UploadedFile { file_name, bytes });
            }
            Some("name") => {
                fields.name = non_blank(field.text().await.map_err(multipart_error)?);
            }
            Some("type") => {
                fields.kind = non_blank(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    if fields
        .name
        .as_deref()
        .is_some_and(|name| name.chars().count() > MAX_NAME_LEN)
    {
        return Err(AppError::bad_request(anyhow!(
            "Name must not exceed 255 characters"
        )));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_fields_are_absent() {
        assert_eq!(non_blank("   ".to_string()), None);
        assert_eq!(non_blank(" cours ".to_string()), Some("cours".to_string()));
    }
}
