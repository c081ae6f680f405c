use async_graphql::{SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::contract::model::{Movie, User};

/// A registered user. `password` is the stored bcrypt hash.
#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "User")]
pub struct UserObject {
    pub id: ID,
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_admin: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Movie")]
pub struct MovieObject {
    pub id: ID,
    pub title: String,
    pub genre: String,
    pub rating: i32,
    pub duration: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserObject {
    fn from(user: User) -> Self {
        Self {
            id: ID(user.id.to_hex()),
            email: user.email,
            username: user.username,
            password: user.password,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<Movie> for MovieObject {
    fn from(movie: Movie) -> Self {
        Self {
            id: ID(movie.id.to_hex()),
            title: movie.title,
            genre: movie.genre,
            rating: movie.rating,
            duration: movie.duration,
            created_at: movie.created_at,
            updated_at: movie.updated_at,
        }
    }
}
