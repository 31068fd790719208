// In-memory user repository, used when no database is configured and in tests

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::models::Role;
use crate::error::ApiError;
use crate::users::models::{NewUser, User};
use crate::users::repository::{search_term, UserRepository};

/// Records kept in insertion order behind a single lock, so uniqueness checks
/// and writes happen atomically
#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(user: &User, email: &str, phone: &str, exclude: Option<Uuid>) -> bool {
    Some(user.id) != exclude && (user.email == email || user.phone == phone)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| clashes(u, &new_user.email, &new_user.phone, None))
        {
            return Err(ApiError::DuplicateIdentity);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            address: new_user.address,
            state: new_user.state,
            city: new_user.city,
            country: new_user.country,
            pincode: new_user.pincode,
            profile_image: new_user.profile_image,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        debug!("Stored user {} in memory", user.id);
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email == login || u.phone == login)
            .cloned())
    }

    async fn identity_taken(
        &self,
        email: &str,
        phone: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| clashes(u, email, phone, exclude)))
    }

    async fn search(&self, term: Option<&str>) -> Result<Vec<User>, ApiError> {
        let needle = search_term(term).map(str::to_lowercase);
        let users = self.users.read().await;

        let mut found: Vec<User> = users
            .iter()
            .rev()
            .filter(|u| u.role != Role::Admin)
            .filter(|u| match &needle {
                Some(needle) => [&u.name, &u.email, &u.state, &u.city]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, ApiError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| clashes(u, &user.email, &user.phone, Some(user.id)))
        {
            return Err(ApiError::DuplicateIdentity);
        }

        let Some(stored) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        *stored = User {
            role: stored.role,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, phone: &str, role: Role) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: None,
            state: "Karnataka".to_string(),
            city: "Bengaluru".to_string(),
            country: "India".to_string(),
            pincode: "560001".to_string(),
            profile_image: None,
            password_hash: "$argon2id$stub".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_or_phone() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("Jane Spring", "jane@example.com", "9876543210", Role::User))
            .await
            .unwrap();

        let same_email = repo
            .create(new_user("Other", "jane@example.com", "1111111111", Role::User))
            .await;
        assert!(matches!(same_email, Err(ApiError::DuplicateIdentity)));

        let same_phone = repo
            .create(new_user("Other", "other@example.com", "9876543210", Role::User))
            .await;
        assert!(matches!(same_phone, Err(ApiError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_find_by_login_matches_email_or_phone() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(new_user("Jane Spring", "jane@example.com", "9876543210", Role::User))
            .await
            .unwrap();

        let by_email = repo.find_by_login("jane@example.com").await.unwrap().unwrap();
        let by_phone = repo.find_by_login("9876543210").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_phone.id, user.id);
        assert!(repo.find_by_login("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_excludes_admins_and_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("Spring Admin", "admin@example.com", "1000000000", Role::Admin))
            .await
            .unwrap();
        let older = repo
            .create(new_user("Jane Spring", "jane@example.com", "2000000000", Role::User))
            .await
            .unwrap();
        let newer = repo
            .create(new_user("Sprocket Lee", "lee@example.com", "3000000000", Role::User))
            .await
            .unwrap();
        repo.create(new_user("Bob Stone", "bob@example.com", "4000000000", Role::User))
            .await
            .unwrap();

        let found = repo.search(Some("SPR")).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let all = repo.search(Some("  ")).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|u| u.role == Role::User));
    }

    #[tokio::test]
    async fn test_update_keeps_role_and_rejects_taken_email() {
        let repo = InMemoryUserRepository::new();
        let jane = repo
            .create(new_user("Jane Spring", "jane@example.com", "2000000000", Role::User))
            .await
            .unwrap();
        repo.create(new_user("Bob Stone", "bob@example.com", "4000000000", Role::User))
            .await
            .unwrap();

        let mut changed = jane.clone();
        changed.city = "Mysuru".to_string();
        changed.role = Role::Admin;
        let stored = repo.update(&changed).await.unwrap().unwrap();
        assert_eq!(stored.city, "Mysuru");
        assert_eq!(stored.role, Role::User);

        changed.email = "bob@example.com".to_string();
        assert!(matches!(repo.update(&changed).await, Err(ApiError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(new_user("Jane Spring", "jane@example.com", "2000000000", Role::User))
            .await
            .unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    }
}
