use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::contract::model::{Movie, NewMovie, NewUser, User};
use crate::domain::error::{parse_id, DomainError};
use crate::domain::password::PasswordHasher;
use crate::domain::repo::{MovieFields, MoviesRepository, UserFields, UsersRepository};

/// Domain service with business rules for users and movies.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    movies: Arc<dyn MoviesRepository>,
    hasher: PasswordHasher,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bcrypt_cost: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

// The store keeps millisecond precision; truncate so returned records match reads.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Service {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        movies: Arc<dyn MoviesRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            movies,
            hasher: PasswordHasher::new(config.bcrypt_cost),
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    // ---- users ----

    #[instrument(name = "catalog.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.users.list().await.map_err(DomainError::storage)?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// `None` when no user has this id.
    #[instrument(name = "catalog.service.get_user", skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        let id = parse_id(id)?;
        self.users
            .find_by_id(id)
            .await
            .map_err(DomainError::storage)
    }

    #[instrument(
        name = "catalog.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.email, username = %new_user.username)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        new_user.validate()?;

        let password = self.hasher.hash(&new_user.password).await?;
        let at = now();
        let user = User {
            id: ObjectId::new(),
            email: new_user.email,
            username: new_user.username,
            password,
            is_admin: Some(new_user.is_admin),
            created_at: at,
            updated_at: at,
        };

        self.users
            .insert(user.clone())
            .await
            .map_err(DomainError::storage)?;

        info!(id = %user.id, "Created user");
        Ok(user)
    }

    /// Full replace. Re-hashes the password; `created_at` is kept.
    #[instrument(
        name = "catalog.service.update_user",
        skip(self, fields),
        fields(email = %fields.email, username = %fields.username)
    )]
    pub async fn update_user(&self, id: &str, fields: NewUser) -> Result<User, DomainError> {
        let id = parse_id(id)?;
        fields.validate()?;

        let password = self.hasher.hash(&fields.password).await?;
        let replacement = UserFields {
            email: fields.email,
            username: fields.username,
            password,
            is_admin: fields.is_admin,
        };

        let user = self
            .users
            .replace(id, replacement, now())
            .await
            .map_err(DomainError::storage)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!(id = %user.id, "Updated user");
        Ok(user)
    }

    /// Hard delete; `None` when nothing was removed.
    #[instrument(name = "catalog.service.delete_user", skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        let id = parse_id(id)?;
        let deleted = self.users.delete(id).await.map_err(DomainError::storage)?;
        if deleted.is_some() {
            info!(%id, "Deleted user");
        }
        Ok(deleted)
    }

    // ---- movies ----

    #[instrument(name = "catalog.service.list_movies", skip(self))]
    pub async fn list_movies(&self) -> Result<Vec<Movie>, DomainError> {
        let movies = self.movies.list().await.map_err(DomainError::storage)?;
        debug!(count = movies.len(), "Listed movies");
        Ok(movies)
    }

    #[instrument(name = "catalog.service.get_movie", skip(self))]
    pub async fn get_movie(&self, id: &str) -> Result<Option<Movie>, DomainError> {
        let id = parse_id(id)?;
        self.movies
            .find_by_id(id)
            .await
            .map_err(DomainError::storage)
    }

    #[instrument(name = "catalog.service.create_movie", skip(self), fields(title = %new_movie.title))]
    pub async fn create_movie(&self, new_movie: NewMovie) -> Result<Movie, DomainError> {
        new_movie.validate()?;

        let at = now();
        let movie = Movie {
            id: ObjectId::new(),
            title: new_movie.title,
            genre: new_movie.genre,
            rating: new_movie.rating,
            duration: new_movie.duration,
            created_at: at,
            updated_at: at,
        };

        self.movies
            .insert(movie.clone())
            .await
            .map_err(DomainError::storage)?;

        info!(id = %movie.id, "Created movie");
        Ok(movie)
    }

    #[instrument(name = "catalog.service.update_movie", skip(self), fields(title = %fields.title))]
    pub async fn update_movie(&self, id: &str, fields: NewMovie) -> Result<Movie, DomainError> {
        let id = parse_id(id)?;
        fields.validate()?;

        let replacement = MovieFields {
            title: fields.title,
            genre: fields.genre,
            rating: fields.rating,
            duration: fields.duration,
        };

        let movie = self
            .movies
            .replace(id, replacement, now())
            .await
            .map_err(DomainError::storage)?
            .ok_or_else(|| DomainError::movie_not_found(id))?;

        info!(id = %movie.id, "Updated movie");
        Ok(movie)
    }

    #[instrument(name = "catalog.service.delete_movie", skip(self))]
    pub async fn delete_movie(&self, id: &str) -> Result<Option<Movie>, DomainError> {
        let id = parse_id(id)?;
        let deleted = self.movies.delete(id).await.map_err(DomainError::storage)?;
        if deleted.is_some() {
            info!(%id, "Deleted movie");
        }
        Ok(deleted)
    }
}
