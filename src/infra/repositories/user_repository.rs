//! User repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{DeletePolicy, CONFLICT_EMAIL, CONFLICT_USER, INDEX_LIVE_EMAIL};
use crate::domain::{User, UserDraft};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// All lookups see live records only. Writes report a violated uniqueness
/// guarantee as [`AppError::Conflict`] and a record that is no longer live
/// as [`AppError::NotFound`].
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// First live user in store order (creation time, then id)
    async fn find_first(&self) -> AppResult<Option<User>>;

    /// Find live user by exact username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a new live user
    async fn create(&self, draft: UserDraft) -> AppResult<User>;

    /// Persist the mutable fields of a live user
    async fn update(&self, user: User) -> AppResult<User>;

    /// Remove a live user according to the store's delete policy
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Check the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Map a SeaORM error onto the application taxonomy.
pub fn classify_db_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => unique_violation(&detail),
        _ => match err {
            DbErr::RecordNotUpdated => AppError::NotFound,
            other => AppError::Database(other),
        },
    }
}

/// Name the conflicting key from the driver's violation message.
///
/// Only the live-email index is told apart; any other unique key is the
/// username.
fn unique_violation(detail: &str) -> AppError {
    if detail.contains(INDEX_LIVE_EMAIL) {
        AppError::conflict(CONFLICT_EMAIL)
    } else {
        AppError::conflict(CONFLICT_USER)
    }
}

/// Concrete implementation of UserRepository backed by SeaORM
pub struct UserStore {
    db: DatabaseConnection,
    delete_policy: DeletePolicy,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection, delete_policy: DeletePolicy) -> Self {
        Self { db, delete_policy }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_first(&self) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .one(&self.db)
            .await
            .map_err(classify_db_err)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(classify_db_err)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, draft: UserDraft) -> AppResult<User> {
        let user = User::new(Uuid::new_v4(), draft);
        let active_model = ActiveModel {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            deleted_at: Set(None),
        };

        let model = active_model.insert(&self.db).await.map_err(classify_db_err)?;
        Ok(User::from(model))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        // Conditional on liveness so a concurrent delete is not overwritten
        let result = UserEntity::update_many()
            .col_expr(user::Column::Email, Expr::value(user.email.clone()))
            .col_expr(user::Column::FirstName, Expr::value(user.first_name.clone()))
            .col_expr(user::Column::LastName, Expr::value(user.last_name.clone()))
            .col_expr(user::Column::UpdatedAt, Expr::value(user.updated_at))
            .filter(user::Column::Id.eq(user.id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(classify_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let rows_affected = match self.delete_policy {
            DeletePolicy::Soft => {
                let now = chrono::Utc::now();
                UserEntity::update_many()
                    .col_expr(user::Column::DeletedAt, Expr::value(Some(now)))
                    .col_expr(user::Column::UpdatedAt, Expr::value(now))
                    .filter(user::Column::Id.eq(id))
                    .filter(user::Column::DeletedAt.is_null())
                    .exec(&self.db)
                    .await
                    .map_err(classify_db_err)?
                    .rows_affected
            }
            DeletePolicy::Hard => {
                UserEntity::delete_many()
                    .filter(user::Column::Id.eq(id))
                    .filter(user::Column::DeletedAt.is_null())
                    .exec(&self.db)
                    .await
                    .map_err(classify_db_err)?
                    .rows_affected
            }
        };

        if rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(classify_db_err)?;
        Ok(())
    }
}
