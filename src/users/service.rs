// User directory service - business logic layer

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::Role;
use crate::auth::password::PasswordService;
use crate::error::ApiError;
use crate::multipart::ImageUpload;
use crate::storage::ImageStore;
use crate::users::models::{NewUser, UpdateUserRequest, User};
use crate::users::repository::UserRepository;
use crate::validation::validate_form;

pub const VIEW_FORBIDDEN: &str = "Not authorized to view this user.";
pub const DELETE_ADMIN_FORBIDDEN: &str = "Cannot delete another admin.";

/// User directory operations over a repository and an image store
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStore>,
    passwords: PasswordService,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStore>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            repo,
            images,
            passwords,
        }
    }

    /// Whether email or phone already belongs to another record
    pub async fn identity_taken(
        &self,
        email: &str,
        phone: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        self.repo.identity_taken(email, phone, exclude).await
    }

    /// Persist a new record. If the store rejects it, the record's image is removed.
    pub async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let image = new_user.profile_image.clone();
        match self.repo.create(new_user).await {
            Ok(user) => {
                info!("Created user {} with role {}", user.id, user.role);
                Ok(user)
            }
            Err(e) => {
                self.discard_image(image.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Undo a just-created record and its image after a later step failed
    pub async fn rollback_create(&self, user: &User) {
        if let Err(e) = self.repo.delete(user.id).await {
            warn!("Failed to roll back user {}: {}", user.id, e);
        }
        self.discard_image(user.profile_image.as_deref()).await;
    }

    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, ApiError> {
        self.repo.find_by_login(login).await
    }

    /// Non-admin users matching the optional search term, newest first
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<User>, ApiError> {
        let users = self.repo.search(search).await?;
        debug!("Listed {} users (search: {:?})", users.len(), search);
        Ok(users)
    }

    /// Admins may read any record; everyone else only their own
    pub async fn get_by_id(
        &self,
        id: Uuid,
        requester: &AuthenticatedUser,
    ) -> Result<User, ApiError> {
        if requester.role != Role::Admin && requester.user_id != id {
            return Err(ApiError::Forbidden(VIEW_FORBIDDEN));
        }
        self.repo.find_by_id(id).await?.ok_or(ApiError::NotFound)
    }

    /// Partial update with image replacement
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
        image: Option<ImageUpload>,
    ) -> Result<User, ApiError> {
        let existing = self.repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
        validate_form(&request, image.as_ref())?;

        let email_changed = request.email.as_ref().is_some_and(|e| *e != existing.email);
        let phone_changed = request.phone.as_ref().is_some_and(|p| *p != existing.phone);
        if email_changed || phone_changed {
            let email = request.email.as_deref().unwrap_or(&existing.email);
            let phone = request.phone.as_deref().unwrap_or(&existing.phone);
            if self.repo.identity_taken(email, phone, Some(id)).await? {
                warn!("Update of user {} would duplicate an email or phone", id);
                return Err(ApiError::DuplicateIdentity);
            }
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => Some(self.passwords.hash_password(password)?),
            None => None,
        };

        let mut updated = request.apply_to(&existing);
        if let Some(hash) = password_hash {
            updated.password_hash = hash;
        }

        if let Some(image) = &image {
            let reference = self.images.save(image).await?;
            self.discard_image(existing.profile_image.as_deref()).await;
            updated.profile_image = Some(reference);
        }

        let new_image = image.as_ref().and(updated.profile_image.clone());
        match self.repo.update(&updated).await {
            Ok(Some(user)) => {
                info!("Updated user {}", user.id);
                Ok(user)
            }
            Ok(None) => {
                self.discard_image(new_image.as_deref()).await;
                Err(ApiError::NotFound)
            }
            Err(e) => {
                self.discard_image(new_image.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Remove a record and its image. Admin records may only be removed by themselves.
    pub async fn delete(&self, id: Uuid, requester: &AuthenticatedUser) -> Result<(), ApiError> {
        let target = self.repo.find_by_id(id).await?.ok_or(ApiError::NotFound)?;

        if target.role == Role::Admin && target.id != requester.user_id {
            return Err(ApiError::Forbidden(DELETE_ADMIN_FORBIDDEN));
        }

        if let Some(image) = target.profile_image.as_deref() {
            self.images.delete(image).await?;
        }

        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound);
        }
        info!("Deleted user {} (by {})", id, requester.user_id);
        Ok(())
    }

    /// Best-effort image removal on cleanup paths; failures are logged only
    pub async fn discard_image(&self, reference: Option<&str>) {
        if let Some(reference) = reference {
            if let Err(e) = self.images.delete(reference).await {
                warn!("Failed to remove image {}: {}", reference, e);
            }
        }
    }
}
