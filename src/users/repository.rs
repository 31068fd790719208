// User persistence: repository trait and PostgreSQL implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::models::{NewUser, User};

const USER_COLUMNS: &str = "id, name, email, phone, address, state, city, country, pincode, \
     profile_image, password_hash, role, created_at, updated_at";

/// Storage operations for user records
///
/// Implementations enforce email and phone uniqueness and report a clash as
/// `ApiError::DuplicateIdentity`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// Look up by email or phone equal to `login`
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, ApiError>;

    /// Whether another record already holds this email or phone
    async fn identity_taken(
        &self,
        email: &str,
        phone: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError>;

    /// Non-admin users, newest first, optionally filtered by a case-insensitive
    /// substring of name, email, state or city
    async fn search(&self, term: Option<&str>) -> Result<Vec<User>, ApiError>;

    /// Overwrite every mutable column; returns `None` if the record is gone
    async fn update(&self, user: &User) -> Result<Option<User>, ApiError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Normalizes a search term: trimmed, and `None` when blank
pub fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|term| !term.is_empty())
}

/// Escape LIKE metacharacters so the term matches literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn map_unique_violation(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return ApiError::DuplicateIdentity;
        }
    }
    ApiError::Database(e)
}

/// PostgreSQL-backed repository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, phone, address, state, city, country, pincode, \
             profile_image, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.phone)
            .bind(&new_user.address)
            .bind(&new_user.state)
            .bind(&new_user.city)
            .bind(&new_user.country)
            .bind(&new_user.pincode)
            .bind(&new_user.profile_image)
            .bind(&new_user.password_hash)
            .bind(new_user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, ApiError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 OR phone = $1 LIMIT 1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn identity_taken(
        &self,
        email: &str,
        phone: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users \
             WHERE (email = $1 OR phone = $2) AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(email)
        .bind(phone)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn search(&self, term: Option<&str>) -> Result<Vec<User>, ApiError> {
        let users = match search_term(term) {
            Some(term) => {
                let sql = format!(
                    "SELECT {} FROM users WHERE role <> 'admin' \
                     AND (name ILIKE $1 OR email ILIKE $1 OR state ILIKE $1 OR city ILIKE $1) \
                     ORDER BY created_at DESC",
                    USER_COLUMNS
                );
                sqlx::query_as::<_, User>(&sql)
                    .bind(like_pattern(term))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM users WHERE role <> 'admin' ORDER BY created_at DESC",
                    USER_COLUMNS
                );
                sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, ApiError> {
        let sql = format!(
            "UPDATE users SET name = $1, email = $2, phone = $3, address = $4, state = $5, \
             city = $6, country = $7, pincode = $8, profile_image = $9, password_hash = $10, \
             updated_at = NOW() \
             WHERE id = $11 RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.address)
            .bind(&user.state)
            .bind(&user.city)
            .bind(&user.country)
            .bind(&user.pincode)
            .bind(&user.profile_image)
            .bind(&user.password_hash)
            .bind(user.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
