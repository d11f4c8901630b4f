// Multipart form buffering - text fields plus size-capped file fields

use super::error::ApiError;
use crate::catalog::Upload;
use axum::extract::Multipart;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Form {
    texts: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl Form {
    /// Buffer the whole form. A single file above `limit` bytes aborts the
    /// read before the rest of it is pulled off the wire.
    pub async fn read(mut multipart: Multipart, limit: u64) -> Result<Self, ApiError> {
        let mut form = Form::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::from_multipart(e, limit))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let mut bytes = Vec::new();
                    while let Some(chunk) = field
                        .chunk()
                        .await
                        .map_err(|e| ApiError::from_multipart(e, limit))?
                    {
                        if (bytes.len() + chunk.len()) as u64 > limit {
                            return Err(ApiError::TooLarge { limit });
                        }
                        bytes.extend_from_slice(&chunk);
                    }
                    let file_name = Some(file_name).filter(|n| !n.is_empty());
                    form.files.insert(name, Upload { file_name, bytes });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::from_multipart(e, limit))?;
                    form.texts.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// A text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}
