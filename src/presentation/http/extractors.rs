//! Custom Extractors
//!
//! Multipart form parsing for the upload endpoints.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};

use crate::shared::error::AppError;

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct FormFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// A fully buffered multipart form.
///
/// Parts with a file name are kept as files, all others as text.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, FormFile>,
}

impl FormData {
    /// Text field, with surrounding whitespace removed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.text(name).unwrap_or(default)
    }

    pub fn require_text(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation(format!("{}: field is required", name)))
    }

    pub fn take_file(&mut self, name: &str) -> Result<FormFile, AppError> {
        self.files
            .remove(name)
            .ok_or_else(|| AppError::Validation(format!("{}: file is required", name)))
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.files.insert(
                        name,
                        FormFile {
                            file_name,
                            content_type,
                            data: data.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.texts.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}
