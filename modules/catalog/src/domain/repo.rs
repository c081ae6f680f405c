use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::contract::model::{Movie, User};

/// Replaceable part of a user record; `password` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// Replaceable part of a movie record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFields {
    pub title: String,
    pub genre: String,
    pub rating: i32,
    pub duration: String,
}

/// Port for the domain layer: persistence operations on the users collection.
/// Every method is a single round trip to the store.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// All users in storage order.
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>>;
    /// Insert a fully-formed user. Uniqueness of email/username is enforced by the store.
    async fn insert(&self, user: User) -> anyhow::Result<()>;
    /// Overwrite every field and `updated_at`; returns the post-update record.
    async fn replace(
        &self,
        id: ObjectId,
        fields: UserFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<User>>;
    /// Hard delete; returns the removed record.
    async fn delete(&self, id: ObjectId) -> anyhow::Result<Option<User>>;
}

/// Port for the movies collection. Same contract as [`UsersRepository`].
#[async_trait]
pub trait MoviesRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Movie>>;
    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<Movie>>;
    async fn insert(&self, movie: Movie) -> anyhow::Result<()>;
    async fn replace(
        &self,
        id: ObjectId,
        fields: MovieFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Movie>>;
    async fn delete(&self, id: ObjectId) -> anyhow::Result<Option<Movie>>;
}
