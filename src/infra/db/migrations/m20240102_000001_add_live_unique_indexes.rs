//! Migration: Unique username and email among live users.
//!
//! Partial indexes, so a soft-deleted row does not block reuse of its
//! username or email.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use crate::config::{INDEX_LIVE_EMAIL, INDEX_LIVE_USERNAME};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON users (username) WHERE deleted_at IS NULL",
            INDEX_LIVE_USERNAME
        ))
        .await?;

        db.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON users (email) WHERE deleted_at IS NULL",
            INDEX_LIVE_EMAIL
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [INDEX_LIVE_EMAIL, INDEX_LIVE_USERNAME] {
            manager
                .drop_index(Index::drop().name(name).table(Users::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
}
