use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;

use crate::contract::model::{Movie, User};
use crate::domain::repo::{MovieFields, MoviesRepository, UserFields, UsersRepository};
use crate::infra::storage::entity::USERS_COLLECTION;

type Table<T> = Arc<RwLock<BTreeMap<ObjectId, T>>>;

/// Process-local store used by `--mock` and tests. ObjectIds sort by creation
/// time, so iteration follows insertion order like a fresh collection scan.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Table<User>,
    movies: Table<Movie>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUsersRepository {
        InMemoryUsersRepository {
            table: self.users.clone(),
        }
    }

    pub fn movies(&self) -> InMemoryMoviesRepository {
        InMemoryMoviesRepository {
            table: self.movies.clone(),
        }
    }
}

#[derive(Clone)]
pub struct InMemoryUsersRepository {
    table: Table<User>,
}

fn duplicate_key(index: &str, field: &str, value: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "E11000 duplicate key error collection: {USERS_COLLECTION} index: {index} dup key: {{ {field}: \"{value}\" }}"
    )
}

// Mirrors the unique email_1 / username_1 indexes.
fn check_unique(
    table: &BTreeMap<ObjectId, User>,
    skip: Option<ObjectId>,
    email: &str,
    username: &str,
) -> anyhow::Result<()> {
    for other in table.values().filter(|u| Some(u.id) != skip) {
        if other.email == email {
            return Err(duplicate_key("email_1", "email", email));
        }
        if other.username == username {
            return Err(duplicate_key("username_1", "username", username));
        }
    }
    Ok(())
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.table.read().values().cloned().collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        Ok(self.table.read().get(&id).cloned())
    }

    async fn insert(&self, user: User) -> anyhow::Result<()> {
        let mut table = self.table.write();
        if table.contains_key(&user.id) {
            return Err(duplicate_key("_id_", "_id", &user.id.to_hex()));
        }
        check_unique(&table, None, &user.email, &user.username)?;
        table.insert(user.id, user);
        Ok(())
    }

    async fn replace(
        &self,
        id: ObjectId,
        fields: UserFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<User>> {
        let mut table = self.table.write();
        if !table.contains_key(&id) {
            return Ok(None);
        }
        check_unique(&table, Some(id), &fields.email, &fields.username)?;

        let Some(user) = table.get_mut(&id) else {
            return Ok(None);
        };
        user.email = fields.email;
        user.username = fields.username;
        user.password = fields.password;
        user.is_admin = Some(fields.is_admin);
        user.updated_at = updated_at;
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        Ok(self.table.write().remove(&id))
    }
}

#[derive(Clone)]
pub struct InMemoryMoviesRepository {
    table: Table<Movie>,
}

#[async_trait]
impl MoviesRepository for InMemoryMoviesRepository {
    async fn list(&self) -> anyhow::Result<Vec<Movie>> {
        Ok(self.table.read().values().cloned().collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<Movie>> {
        Ok(self.table.read().get(&id).cloned())
    }

    async fn insert(&self, movie: Movie) -> anyhow::Result<()> {
        self.table.write().insert(movie.id, movie);
        Ok(())
    }

    async fn replace(
        &self,
        id: ObjectId,
        fields: MovieFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Movie>> {
        let mut table = self.table.write();
        let Some(movie) = table.get_mut(&id) else {
            return Ok(None);
        };
        movie.title = fields.title;
        movie.genre = fields.genre;
        movie.rating = fields.rating;
        movie.duration = fields.duration;
        movie.updated_at = updated_at;
        Ok(Some(movie.clone()))
    }

    async fn delete(&self, id: ObjectId) -> anyhow::Result<Option<Movie>> {
        Ok(self.table.write().remove(&id))
    }
}
