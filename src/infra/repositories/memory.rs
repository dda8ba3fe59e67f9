//! In-process user store.
//!
//! Keeps records in insertion order behind a single lock, so uniqueness of
//! live usernames and emails is checked and applied atomically.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserRepository;
use crate::config::{DeletePolicy, CONFLICT_EMAIL, CONFLICT_USER};
use crate::domain::{User, UserDraft};
use crate::errors::{AppError, AppResult};

/// Memory-backed implementation of [`UserRepository`]
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
    delete_policy: DeletePolicy,
}

impl InMemoryUserStore {
    pub fn new(delete_policy: DeletePolicy) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            delete_policy,
        }
    }

    /// Number of live records
    pub async fn live_count(&self) -> usize {
        self.users.read().await.iter().filter(|u| u.is_live()).count()
    }

    /// Number of records including soft-deleted ones
    pub async fn total_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_first(&self) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.is_live()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.is_live() && u.username == username)
            .cloned())
    }

    async fn create(&self, draft: UserDraft) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.is_live() && u.username == draft.username)
        {
            return Err(AppError::conflict(CONFLICT_USER));
        }
        if users.iter().any(|u| u.is_live() && u.email == draft.email) {
            return Err(AppError::conflict(CONFLICT_EMAIL));
        }

        let user = User::new(Uuid::new_v4(), draft);
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.is_live() && u.id != user.id && u.email == user.email)
        {
            return Err(AppError::conflict(CONFLICT_EMAIL));
        }

        let stored = users
            .iter_mut()
            .find(|u| u.is_live() && u.id == user.id)
            .ok_or(AppError::NotFound)?;

        stored.email = user.email;
        stored.first_name = user.first_name;
        stored.last_name = user.last_name;
        stored.updated_at = user.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.write().await;
        let position = users
            .iter()
            .position(|u| u.is_live() && u.id == id)
            .ok_or(AppError::NotFound)?;

        match self.delete_policy {
            DeletePolicy::Soft => {
                if let Some(user) = users.get_mut(position) {
                    user.soft_delete();
                }
            }
            DeletePolicy::Hard => {
                users.remove(position);
            }
        }

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserPayload;

    fn draft(username: &str, email: &str) -> UserDraft {
        UserDraft::try_from(UserPayload::new(username, email, "First", "Last")).unwrap()
    }

    #[tokio::test]
    async fn duplicate_live_username_conflicts() {
        let store = InMemoryUserStore::default();
        store.create(draft("alice", "a@x.com")).await.unwrap();

        let err = store.create(draft("alice", "other@x.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "User already exist");
        assert_eq!(store.live_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_live_email_conflicts() {
        let store = InMemoryUserStore::default();
        store.create(draft("alice", "a@x.com")).await.unwrap();

        let err = store.create(draft("bob", "a@x.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already exist");
    }

    #[tokio::test]
    async fn soft_deleted_username_can_be_reused() {
        let store = InMemoryUserStore::new(DeletePolicy::Soft);
        let first = store.create(draft("alice", "a@x.com")).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(draft("alice", "a@x.com")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.live_count().await, 1);
        assert_eq!(store.total_count().await, 2);
    }

    #[tokio::test]
    async fn hard_delete_removes_the_row() {
        let store = InMemoryUserStore::new(DeletePolicy::Hard);
        let user = store.create(draft("alice", "a@x.com")).await.unwrap();

        store.delete(user.id).await.unwrap();
        assert_eq!(store.total_count().await, 0);
        assert!(matches!(store.delete(user.id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn find_first_follows_insertion_order() {
        let store = InMemoryUserStore::default();
        store.create(draft("alice", "a@x.com")).await.unwrap();
        store.create(draft("bob", "b@x.com")).await.unwrap();

        let first = store.find_first().await.unwrap().unwrap();
        assert_eq!(first.username, "alice");
    }

    #[tokio::test]
    async fn update_of_deleted_user_is_not_found() {
        let store = InMemoryUserStore::default();
        let mut user = store.create(draft("alice", "a@x.com")).await.unwrap();
        store.delete(user.id).await.unwrap();

        user.replace_details(draft("alice", "a2@x.com"));
        assert!(matches!(store.update(user).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let store = InMemoryUserStore::default();
        store.create(draft("alice", "a@x.com")).await.unwrap();
        let mut bob = store.create(draft("bob", "b@x.com")).await.unwrap();

        bob.replace_details(draft("bob", "a@x.com"));
        let err = store.update(bob).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already exist");
    }
}
