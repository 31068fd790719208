// Validation utilities module
// Shared patterns for declarative field rules and conversion of validator errors
// into the ordered `{field, message}` list returned to callers

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;
use crate::multipart::{ImageUpload, IMAGE_FIELD};

lazy_static! {
    /// Alphabetic characters and whitespace only
    pub static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();
    /// ASCII digits only
    pub static ref DIGITS_RE: Regex = Regex::new(r"^[0-9]+$").unwrap();
    /// At least one digit anywhere
    pub static ref HAS_DIGIT_RE: Regex = Regex::new(r"\d").unwrap();
}

/// Order in which field errors are reported
const FIELD_ORDER: &[&str] = &[
    "name",
    "email",
    "phone",
    "address",
    "state",
    "city",
    "country",
    "pincode",
    "password",
    "profile_image",
    "loginId",
];

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "email")]
    pub field: String,
    #[schema(example = "Please enter a valid email address.")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `ValidationErrors` into a deterministic list.
///
/// Fields follow the registration form order; within a field, errors keep the order
/// in which the rules are declared. Unknown fields are appended alphabetically.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let by_field = errors.field_errors();

    let mut fields: Vec<&str> = by_field.keys().copied().collect();
    fields.sort_by_key(|field| {
        let position = FIELD_ORDER
            .iter()
            .position(|known| *known == *field)
            .unwrap_or(FIELD_ORDER.len());
        (position, *field)
    });

    fields
        .into_iter()
        .flat_map(|field| {
            by_field[field].iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            })
        })
        .collect()
}

pub const IMAGE_TYPE_MESSAGE: &str = "Only image files (jpeg, png, webp, gif) are allowed.";

/// Accepted upload content types and the extension stored on disk
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Validates that an uploaded profile image has an accepted content type
pub fn validate_image_content_type(content_type: &str) -> Result<(), ValidationError> {
    if image_extension(content_type).is_some() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_image_type");
        error.message = Some(IMAGE_TYPE_MESSAGE.into());
        Err(error)
    }
}

/// Runs the declarative rules of a form plus the image content-type check,
/// reporting every failure together
pub fn validate_form<T: Validate>(form: &T, image: Option<&ImageUpload>) -> Result<(), ApiError> {
    let mut errors = form.validate().err().unwrap_or_else(ValidationErrors::new);

    if let Some(image) = image {
        if let Err(error) = validate_image_content_type(&image.content_type) {
            errors.add(IMAGE_FIELD, error);
        }
    }

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern() {
        assert!(NAME_RE.is_match("Spring Fields"));
        assert!(!NAME_RE.is_match("R2D2"));
        assert!(!NAME_RE.is_match("O'Brien"));
    }

    #[test]
    fn test_digit_patterns() {
        assert!(DIGITS_RE.is_match("9876543210"));
        assert!(!DIGITS_RE.is_match("98765-43210"));
        assert!(HAS_DIGIT_RE.is_match("secret1"));
        assert!(!HAS_DIGIT_RE.is_match("secret"));
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("application/pdf"), None);
    }

    #[test]
    fn test_field_errors_are_ordered() {
        let mut errors = ValidationErrors::new();
        let mut password = ValidationError::new("length");
        password.message = Some("Password must be at least 6 characters long.".into());
        errors.add("password", password);

        let mut name = ValidationError::new("length");
        name.message = Some("Name must be at least 3 characters.".into());
        errors.add("name", name);

        errors.add("city", ValidationError::new("city_required"));

        let list = field_errors(&errors);
        let fields: Vec<&str> = list.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "city", "password"]);
        assert_eq!(list[1].message, "city_required");
    }

    #[test]
    fn test_validate_image_content_type() {
        assert!(validate_image_content_type("image/webp").is_ok());
        let err = validate_image_content_type("text/plain").unwrap_err();
        assert_eq!(err.code, "invalid_image_type");
    }

    #[derive(Validate)]
    struct CityForm {
        #[validate(length(min = 1, message = "City is required."))]
        city: String,
    }

    #[test]
    fn test_validate_form_merges_image_error() {
        let image = ImageUpload {
            bytes: bytes::Bytes::from_static(b"%PDF"),
            content_type: "application/pdf".to_string(),
            file_name: None,
        };
        let form = CityForm { city: String::new() };

        match validate_form(&form, Some(&image)) {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        FieldError::new("city", "City is required."),
                        FieldError::new("profile_image", IMAGE_TYPE_MESSAGE),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let ok = CityForm { city: "Pune".to_string() };
        assert!(validate_form(&ok, None).is_ok());
    }
}
