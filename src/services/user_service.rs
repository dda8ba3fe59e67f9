//! User service - Handles user-related business logic.
//!
//! Each mutation is a check-then-act sequence: look up the live record,
//! decide, then write. The store's uniqueness guarantees close the gap
//! between the two steps; a violation surfaces as [`AppError::Conflict`].

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CONFLICT_USER;
use crate::domain::{User, UserDraft, UserPayload};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Some live user, or `None` when the directory is empty
    async fn fetch_any(&self) -> AppResult<Option<User>>;

    /// Live user with exactly this username
    async fn fetch_by_username(&self, username: &str) -> AppResult<User>;

    /// Create a user unless the username is already live
    async fn create_user(&self, payload: UserPayload) -> AppResult<User>;

    /// Replace email and names of the live user named by `username`
    async fn update_user(&self, username: &str, payload: UserPayload) -> AppResult<User>;

    /// Remove the live user named by `username`
    async fn delete_user(&self, username: &str) -> AppResult<()>;

    /// Check the backing store is reachable
    async fn check_store(&self) -> AppResult<()>;
}

/// Concrete implementation of UserService over a repository.
pub struct UserDirectory {
    repo: Arc<dyn UserRepository>,
    store_timeout: Duration,
}

impl UserDirectory {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>, store_timeout: Duration) -> Self {
        Self {
            repo,
            store_timeout,
        }
    }

    /// Run one store round-trip under the configured deadline
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        T: Send,
        F: Future<Output = AppResult<T>> + Send,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| AppError::timeout(operation))?
    }

    async fn find_live(&self, username: &str) -> AppResult<Option<User>> {
        self.bounded("find_by_username", self.repo.find_by_username(username))
            .await
    }
}

#[async_trait]
impl UserService for UserDirectory {
    async fn fetch_any(&self) -> AppResult<Option<User>> {
        self.bounded("find_first", self.repo.find_first()).await
    }

    async fn fetch_by_username(&self, username: &str) -> AppResult<User> {
        self.find_live(username).await?.ok_or_not_found()
    }

    async fn create_user(&self, payload: UserPayload) -> AppResult<User> {
        let draft = UserDraft::try_from(payload)?;

        if self.find_live(&draft.username).await?.is_some() {
            tracing::debug!(username = %draft.username, "Create rejected, username is live");
            return Err(AppError::conflict(CONFLICT_USER));
        }

        let username = draft.username.clone();
        let user = self
            .bounded("create", self.repo.create(draft))
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    tracing::warn!(username = %username, "Create lost a race on a unique key");
                }
            })?;

        tracing::info!(username = %user.username, id = %user.id, "User created");
        Ok(user)
    }

    async fn update_user(&self, username: &str, payload: UserPayload) -> AppResult<User> {
        let draft = UserDraft::try_from(payload)?;

        let mut user = self.find_live(username).await?.ok_or_not_found()?;
        user.replace_details(draft);

        let user = self.bounded("update", self.repo.update(user)).await?;

        tracing::info!(username = %user.username, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, username: &str) -> AppResult<()> {
        let user = self.find_live(username).await?.ok_or_not_found()?;

        self.bounded("delete", self.repo.delete(user.id)).await?;

        tracing::info!(username = %user.username, "User deleted");
        Ok(())
    }

    async fn check_store(&self) -> AppResult<()> {
        self.bounded("ping", self.repo.ping()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;
    use uuid::Uuid;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn alice() -> UserPayload {
        UserPayload::new("alice", "a@x.com", "Alice", "A")
    }

    fn stored(payload: UserPayload) -> User {
        User::new(Uuid::new_v4(), UserDraft::try_from(payload).unwrap())
    }

    fn service(repo: MockUserRepository) -> UserDirectory {
        UserDirectory::new(Arc::new(repo), TIMEOUT)
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_without_store_access() {
        // No expectations: any repository call panics
        let service = service(MockUserRepository::new());

        let payload = UserPayload {
            email: None,
            ..alice()
        };
        let result = service.create_user(payload).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_persists_when_username_is_free() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .withf(|username| username == "alice")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .returning(|draft| Ok(User::new(Uuid::new_v4(), draft)));

        let user = service(repo).create_user(alice()).await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.last_name, "A");
    }

    #[tokio::test]
    async fn create_conflicts_when_username_is_live() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|_| Ok(Some(stored(alice()))));
        repo.expect_create().never();

        let err = service(repo)
            .create_user(UserPayload::new("alice", "different@x.com", "Al", "B"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "User already exist");
    }

    #[tokio::test]
    async fn create_reports_lost_race_as_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|_| Err(AppError::conflict("User")));

        let err = service(repo).create_user(alice()).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(!err.is_internal());
    }

    #[tokio::test]
    async fn create_surfaces_lookup_failure_as_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|_| Err(AppError::internal("connection refused")));
        repo.expect_create().never();

        let err = service(repo).create_user(alice()).await.unwrap_err();

        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found_and_writes_nothing() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_create().never();
        repo.expect_update().never();

        let result = service(repo).update_user("ghost", alice()).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn update_targets_path_username_and_replaces_fields() {
        let existing = stored(alice());
        let id = existing.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .withf(|username| username == "alice")
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update()
            .withf(move |user| {
                user.id == id
                    && user.username == "alice"
                    && user.email == "a2@x.com"
                    && user.first_name == "Alicia"
                    && user.last_name == "Z"
            })
            .times(1)
            .returning(Ok);

        // Payload username points elsewhere; it must not retarget the update
        let payload = UserPayload::new("mallory", "a2@x.com", "Alicia", "Z");
        let user = service(repo).update_user("alice", payload).await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a2@x.com");
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let service = service(MockUserRepository::new());

        let payload = UserPayload {
            lname: Some(String::new()),
            ..alice()
        };
        let result = service.update_user("alice", payload).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_of_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_delete().never();

        let result = service(repo).delete_user("ghost").await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_the_looked_up_record() {
        let existing = stored(alice());
        let id = existing.id;

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_delete()
            .withf(move |target| *target == id)
            .times(1)
            .returning(|_| Ok(()));

        assert!(service(repo).delete_user("alice").await.is_ok());
    }

    #[tokio::test]
    async fn fetch_any_on_empty_store_is_none() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_first().returning(|| Ok(None));

        assert!(service(repo).fetch_any().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_any_store_error_is_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_first()
            .returning(|| Err(AppError::Database(sea_orm::DbErr::Custom("down".to_string()))));

        let err = service(repo).fetch_any().await.unwrap_err();
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn fetch_by_username_missing_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));

        let result = service(repo).fetch_by_username("ghost").await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    /// Repository whose lookups never answer in time
    struct StalledRepository;

    #[async_trait]
    impl UserRepository for StalledRepository {
        async fn find_first(&self) -> AppResult<Option<User>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn find_by_username(&self, _username: &str) -> AppResult<Option<User>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn create(&self, draft: UserDraft) -> AppResult<User> {
            Ok(User::new(Uuid::new_v4(), draft))
        }

        async fn update(&self, user: User) -> AppResult<User> {
            Ok(user)
        }

        async fn delete(&self, _id: Uuid) -> AppResult<()> {
            Ok(())
        }

        async fn ping(&self) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stalled_store_call_times_out() {
        let service = UserDirectory::new(Arc::new(StalledRepository), Duration::from_millis(20));

        let err = service.fetch_by_username("alice").await.unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
        assert!(err.is_internal());
    }

    /// Store that commits a create, then answers too late
    struct LateCommitRepository(crate::infra::InMemoryUserStore);

    #[async_trait]
    impl UserRepository for LateCommitRepository {
        async fn find_first(&self) -> AppResult<Option<User>> {
            self.0.find_first().await
        }

        async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
            self.0.find_by_username(username).await
        }

        async fn create(&self, draft: UserDraft) -> AppResult<User> {
            let user = self.0.create(draft).await?;
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(user)
        }

        async fn update(&self, user: User) -> AppResult<User> {
            self.0.update(user).await
        }

        async fn delete(&self, id: Uuid) -> AppResult<()> {
            self.0.delete(id).await
        }

        async fn ping(&self) -> AppResult<()> {
            self.0.ping().await
        }
    }

    #[tokio::test]
    async fn create_committed_after_deadline_conflicts_on_retry() {
        let repo = Arc::new(LateCommitRepository(Default::default()));
        let service = UserDirectory::new(repo.clone(), Duration::from_millis(20));

        let first = service.create_user(alice()).await.unwrap_err();
        assert!(matches!(first, AppError::Timeout(_)));
        assert_eq!(repo.0.live_count().await, 1);

        let retry = service.create_user(alice()).await.unwrap_err();
        assert!(matches!(retry, AppError::Conflict(_)));
    }
}
