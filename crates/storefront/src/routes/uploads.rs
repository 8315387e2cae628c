//! Multipart form reading for the upload pages.
//!
//! Collects text fields and files from a `multipart/form-data` body so
//! handlers can validate the whole form before anything is forwarded.

use std::collections::HashMap;

use axum::extract::Multipart;

use rentalhub_core::validation::ImageUpload;

use crate::backend::FileUpload;
use crate::error::AppError;

/// A fully read multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, FileUpload)>,
}

impl MultipartForm {
    /// Read every part of the body.
    ///
    /// File inputs left empty by the browser (no file name, no bytes) are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if the body is not valid multipart data or
    /// exceeds the body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push((
                        name,
                        FileUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    ));
                }
                None => {
                    let value = field.text().await.map_err(bad_multipart)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Remove and return every file posted under `name`, in order.
    pub fn take_files(&mut self, name: &str) -> Vec<FileUpload> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        taken.into_iter().map(|(_, file)| file).collect()
    }

    /// Remove and return the first file posted under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<FileUpload> {
        let index = self.files.iter().position(|(field, _)| field == name)?;
        Some(self.files.remove(index).1)
    }
}

/// Metadata used to validate an upload.
#[must_use]
pub fn image_meta(file: &FileUpload) -> ImageUpload {
    ImageUpload::new(&file.file_name, &file.content_type, file.bytes.len())
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    tracing::info!(error = %e, "Rejected multipart body");
    AppError::BadRequest(e.body_text())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_take_files_keeps_order_and_others() {
        let mut form = MultipartForm {
            fields: HashMap::from([("title".to_string(), "Drill".to_string())]),
            files: vec![
                ("images".to_string(), file("a.png", 3)),
                ("profile_pic".to_string(), file("me.png", 1)),
                ("images".to_string(), file("b.png", 4)),
            ],
        };

        let images = form.take_files("images");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].file_name, "a.png");
        assert_eq!(images[1].file_name, "b.png");

        assert_eq!(form.take_file("profile_pic").unwrap().file_name, "me.png");
        assert!(form.take_file("profile_pic").is_none());
        assert_eq!(form.text("title"), "Drill");
        assert_eq!(form.text("missing"), "");
    }

    #[test]
    fn test_image_meta_uses_byte_length() {
        let meta = image_meta(&file("a.png", 42));
        assert_eq!(meta.size, 42);
        assert!(meta.problem().is_none());
    }
}
