// Typed reading of multipart/form-data bodies
// Text fields are collected by name; the `profile_image` part is buffered for storage

use axum::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;

use crate::error::ApiError;

/// Name of the file part carrying a profile image
pub const IMAGE_FIELD: &str = "profile_image";

/// An uploaded image held in memory until it is validated and stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Parsed multipart form
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl FormData {
    /// Drains a multipart body. Unknown file parts are ignored and an empty
    /// `profile_image` part counts as no upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;

                if bytes.is_empty() {
                    debug!("Ignoring empty {} part", IMAGE_FIELD);
                    continue;
                }
                form.image = Some(ImageUpload {
                    bytes,
                    content_type,
                    file_name,
                });
            } else if field.file_name().is_none() {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Raw value of a text field, if present
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn insert_text(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    pub fn take_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lookup_and_image_take() {
        let mut form = FormData::default();
        form.insert_text("city", "Pune");
        form.set_image(ImageUpload {
            bytes: Bytes::from_static(b"\x89PNG"),
            content_type: "image/png".to_string(),
            file_name: Some("me.png".to_string()),
        });

        assert_eq!(form.text("city"), Some("Pune"));
        assert_eq!(form.text("state"), None);
        assert!(form.take_image().is_some());
        assert!(form.take_image().is_none());
    }
}
