// Authentication service - business logic layer

use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, LoginRequest, RegisterRequest, Role},
    password::PasswordService,
    token::TokenService,
};
use crate::error::ApiError;
use crate::multipart::ImageUpload;
use crate::storage::ImageStore;
use crate::users::models::{NewUser, User};
use crate::users::service::UserService;
use crate::validation::validate_form;

/// Authentication service coordinating registration and login
pub struct AuthService {
    users: Arc<UserService>,
    images: Arc<dyn ImageStore>,
    password_service: PasswordService,
    token_service: Arc<TokenService>,
    admin_email: String,
}

impl AuthService {
    pub fn new(
        users: Arc<UserService>,
        images: Arc<dyn ImageStore>,
        password_service: PasswordService,
        token_service: Arc<TokenService>,
        admin_email: String,
    ) -> Self {
        Self {
            users,
            images,
            password_service,
            token_service,
            admin_email,
        }
    }

    /// Register a new user
    ///
    /// The image is written only after validation and the duplicate check pass;
    /// any later failure removes it again.
    pub async fn register(
        &self,
        request: RegisterRequest,
        image: Option<ImageUpload>,
    ) -> Result<AuthResponse, ApiError> {
        validate_form(&request, image.as_ref())?;

        if self
            .users
            .identity_taken(&request.email, &request.phone, None)
            .await?
        {
            info!("Registration rejected: email or phone already in use");
            return Err(ApiError::DuplicateIdentity);
        }

        let password_hash = self.password_service.hash_password(&request.password)?;

        let profile_image = match &image {
            Some(image) => Some(self.images.save(image).await?),
            None => None,
        };

        let role = if request.email == self.admin_email {
            Role::Admin
        } else {
            Role::User
        };

        // create() removes the image itself when the store rejects the record
        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email,
                phone: request.phone,
                address: request.address,
                state: request.state,
                city: request.city,
                country: request.country,
                pincode: request.pincode,
                profile_image,
                password_hash,
                role,
            })
            .await?;

        match self.issue_tokens(&user) {
            Ok(response) => {
                info!("User registered: user_id={}, role={}", user.id, user.role);
                Ok(response)
            }
            Err(e) => {
                self.users.rollback_create(&user).await;
                Err(e.into())
            }
        }
    }

    /// Login by email or phone
    ///
    /// Unknown accounts and wrong passwords produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        request.validate()?;

        let Some(user) = self.users.find_by_login(&request.lookup_key()).await? else {
            warn!("Login failed: unknown account");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self
            .password_service
            .verify_password(&request.password, &user.password_hash)?
        {
            warn!("Login failed: wrong password for user_id={}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        info!("User logged in: user_id={}", user.id);
        Ok(self.issue_tokens(&user)?)
    }

    fn issue_tokens(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let (access_token, refresh_token) =
            self.token_service.generate_token_pair(user.id, user.role)?;
        Ok(AuthResponse::new(user, access_token, refresh_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalImageStore;
    use crate::users::memory::InMemoryUserRepository;
    use bytes::Bytes;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        auth: AuthService,
        tokens: Arc<TokenService>,
        dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(dir.path()));
        let passwords = PasswordService::with_cost(1024, 1).unwrap();
        let tokens = Arc::new(TokenService::new(
            "test_secret",
            Duration::from_secs(3600),
            Duration::from_secs(604800),
        ));
        let users = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            images.clone(),
            passwords.clone(),
        ));
        let auth = AuthService::new(
            users,
            images,
            passwords,
            tokens.clone(),
            "admin@example.com".to_string(),
        );
        Fixture { auth, tokens, dir }
    }

    fn request(email: &str, phone: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jane Spring".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: None,
            state: "Karnataka".to_string(),
            city: "Bengaluru".to_string(),
            country: "India".to_string(),
            pincode: "560001".to_string(),
            password: "secret1".to_string(),
        }
    }

    fn png() -> ImageUpload {
        ImageUpload {
            bytes: Bytes::from_static(b"\x89PNG"),
            content_type: "image/png".to_string(),
            file_name: None,
        }
    }

    fn files_in(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_register_token_carries_identity_and_role() {
        let f = fixture();
        let response = f.auth.register(request("jane@example.com", "9876543210"), None).await.unwrap();

        let claims = f.tokens.verify_access(&response.access_token).unwrap();
        assert_eq!(claims.sub, response.id);
        assert_eq!(claims.role, Role::User);
        assert_eq!(response.role, Role::User);
    }

    #[tokio::test]
    async fn test_bootstrap_email_registers_as_admin() {
        let f = fixture();
        let response = f.auth.register(request("admin@example.com", "9876543210"), None).await.unwrap();
        assert_eq!(response.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_duplicate_registration_leaves_no_image() {
        let f = fixture();
        f.auth
            .register(request("jane@example.com", "9876543210"), Some(png()))
            .await
            .unwrap();
        assert_eq!(files_in(&f.dir), 1);

        let second = f
            .auth
            .register(request("jane@example.com", "1234567890"), Some(png()))
            .await;
        assert!(matches!(second, Err(ApiError::DuplicateIdentity)));
        assert_eq!(files_in(&f.dir), 1);
    }

    #[tokio::test]
    async fn test_invalid_registration_writes_nothing() {
        let f = fixture();
        let mut bad = request("jane@example.com", "9876543210");
        bad.password = "short".to_string();

        let result = f.auth.register(bad, Some(png())).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(files_in(&f.dir), 0);
    }

    #[tokio::test]
    async fn test_login_by_email_or_phone() {
        let f = fixture();
        let registered = f.auth.register(request("jane@example.com", "9876543210"), None).await.unwrap();

        for login_id in ["JANE@example.com", "9876543210"] {
            let response = f
                .auth
                .login(LoginRequest {
                    login_id: login_id.to_string(),
                    password: "secret1".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(response.id, registered.id);
        }
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let f = fixture();
        f.auth.register(request("jane@example.com", "9876543210"), None).await.unwrap();

        let wrong_password = f
            .auth
            .login(LoginRequest {
                login_id: "jane@example.com".to_string(),
                password: "wrongpass1".to_string(),
            })
            .await
            .unwrap_err();
        let unknown = f
            .auth
            .login(LoginRequest {
                login_id: "nosuchuser@example.com".to_string(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApiError::Auth(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, ApiError::Auth(AuthError::InvalidCredentials)));
    }
}
