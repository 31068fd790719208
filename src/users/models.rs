// User directory data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::{normalize_email, Role};
use crate::multipart::FormData;
use crate::validation::{DIGITS_RE, HAS_DIGIT_RE, NAME_RE};

/// Stored user record, including the password hash
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub state: String,
    pub city: String,
    pub country: String,
    pub pincode: String,
    pub profile_image: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new record; id and timestamps are assigned by the store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub state: String,
    pub city: String,
    pub country: String,
    pub pincode: String,
    pub profile_image: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "Jane Spring")]
    pub name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub state: String,
    pub city: String,
    pub country: String,
    pub pincode: String,
    #[schema(example = "/uploads/5f0c4c1e-8d1a-4a59-9f0e-2b1f5f1d3c77.png")]
    pub profile_image: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            state: user.state,
            city: user.city,
            country: user.country,
            pincode: user.pincode,
            profile_image: user.profile_image,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial update request
///
/// `None` keeps the stored value. For `address`, `Some("")` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 3, message = "Name must be at least 3 characters."),
        regex(path = "NAME_RE", message = "Name must contain only alphabets.")
    )]
    pub name: Option<String>,

    #[validate(email(message = "Please enter a valid email address."))]
    pub email: Option<String>,

    #[validate(
        length(min = 10, max = 15, message = "Phone number must be between 10 and 15 digits."),
        regex(path = "DIGITS_RE", message = "Phone number must contain only digits.")
    )]
    pub phone: Option<String>,

    #[validate(length(max = 150, message = "Address cannot exceed 150 characters."))]
    pub address: Option<String>,

    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,

    #[validate(
        length(min = 4, max = 10, message = "Pincode must be between 4 and 10 digits."),
        regex(path = "DIGITS_RE", message = "Pincode must contain only digits.")
    )]
    pub pincode: Option<String>,

    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long."),
        regex(path = "HAS_DIGIT_RE", message = "Password must contain at least one number.")
    )]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// Builds the update from form fields. Blank values are treated as absent,
    /// except a blank address which means "clear".
    pub fn from_form(form: &FormData) -> Self {
        let present = |name: &str| {
            form.text(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            name: present("name"),
            email: present("email").map(|email| normalize_email(&email)),
            phone: present("phone"),
            address: form.text("address").map(|address| address.trim().to_string()),
            state: present("state"),
            city: present("city"),
            country: present("country"),
            pincode: present("pincode"),
            password: form
                .text("password")
                .filter(|password| !password.trim().is_empty())
                .map(str::to_string),
        }
    }

    /// Merge into an existing record. The password is handled by the caller, who hashes it.
    pub fn apply_to(self, existing: &User) -> User {
        let address = match self.address {
            Some(address) if address.is_empty() => None,
            Some(address) => Some(address),
            None => existing.address.clone(),
        };

        User {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            email: self.email.unwrap_or_else(|| existing.email.clone()),
            phone: self.phone.unwrap_or_else(|| existing.phone.clone()),
            address,
            state: self.state.unwrap_or_else(|| existing.state.clone()),
            city: self.city.unwrap_or_else(|| existing.city.clone()),
            country: self.country.unwrap_or_else(|| existing.country.clone()),
            pincode: self.pincode.unwrap_or_else(|| existing.pincode.clone()),
            ..existing.clone()
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against name, email, state and city
    pub search: Option<String>,
}

/// Response for a successful update
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    #[schema(example = "User updated successfully.")]
    pub message: String,
}

impl UpdateUserResponse {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile_image: user.profile_image.clone(),
            message: "User updated successfully.".to_string(),
        }
    }
}
