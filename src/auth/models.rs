// Authentication data models and DTOs

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::multipart::FormData;
use crate::users::models::User;
use crate::validation::{DIGITS_RE, HAS_DIGIT_RE, NAME_RE};

/// Coarse authorization tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Registration request, parsed from the multipart form
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Jane Spring")]
    #[validate(
        length(min = 3, message = "Name must be at least 3 characters."),
        regex(path = "NAME_RE", message = "Name must contain only alphabets.")
    )]
    pub name: String,

    #[schema(example = "jane@example.com")]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,

    #[schema(example = "9876543210")]
    #[validate(
        length(min = 10, max = 15, message = "Phone number must be between 10 and 15 digits."),
        regex(path = "DIGITS_RE", message = "Phone number must contain only digits.")
    )]
    pub phone: String,

    #[validate(length(max = 150, message = "Address cannot exceed 150 characters."))]
    pub address: Option<String>,

    #[validate(length(min = 1, message = "State is required."))]
    pub state: String,

    #[validate(length(min = 1, message = "City is required."))]
    pub city: String,

    #[validate(length(min = 1, message = "Country is required."))]
    pub country: String,

    #[schema(example = "560001")]
    #[validate(
        length(min = 4, max = 10, message = "Pincode must be between 4 and 10 digits."),
        regex(path = "DIGITS_RE", message = "Pincode must contain only digits.")
    )]
    pub pincode: String,

    #[schema(example = "secret1")]
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long."),
        regex(path = "HAS_DIGIT_RE", message = "Password must contain at least one number.")
    )]
    pub password: String,
}

impl RegisterRequest {
    /// Builds a request from form fields, trimming values and normalizing the email.
    /// Missing required fields become empty strings so the rules report them.
    pub fn from_form(form: &FormData) -> Self {
        let text = |name: &str| form.text(name).map(str::trim).unwrap_or_default().to_string();

        Self {
            name: text("name"),
            email: normalize_email(form.text("email").unwrap_or_default()),
            phone: text("phone"),
            address: form
                .text("address")
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_string),
            state: text("state"),
            city: text("city"),
            country: text("country"),
            pincode: text("pincode"),
            password: form.text("password").unwrap_or_default().to_string(),
        }
    }
}

/// Lowercased, trimmed email used for storage and lookups
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Login request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address or phone number
    #[serde(rename = "loginId", default)]
    #[schema(example = "jane@example.com")]
    #[validate(length(min = 1, message = "Email or phone number is required."))]
    pub login_id: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl LoginRequest {
    /// The lookup key: emails are matched in their normalized form, phones verbatim
    pub fn lookup_key(&self) -> String {
        let trimmed = self.login_id.trim();
        if trimmed.contains('@') {
            normalize_email(trimmed)
        } else {
            trimmed.to_string()
        }
    }
}

/// Authentication response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    pub fn new(user: &User, access_token: String, refresh_token: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            access_token,
            refresh_token,
        }
    }
}
