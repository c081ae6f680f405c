use chrono::{DateTime, Utc};
use mongodb::bson;

use crate::contract::model::{Movie, User};
use crate::infra::storage::entity::{MovieDoc, UserDoc};

pub fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

/// Out-of-range values collapse to the epoch and are reported.
pub fn from_bson_datetime(at: bson::DateTime) -> DateTime<Utc> {
    let millis = at.timestamp_millis();
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(|| {
        tracing::warn!(millis, "Stored date is out of range; using the epoch");
        DateTime::default()
    })
}

impl From<UserDoc> for User {
    fn from(doc: UserDoc) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            username: doc.username,
            password: doc.password,
            is_admin: doc.is_admin,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

impl From<&User> for UserDoc {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            password: user.password.clone(),
            is_admin: user.is_admin,
            created_at: to_bson_datetime(user.created_at),
            updated_at: to_bson_datetime(user.updated_at),
        }
    }
}

impl From<MovieDoc> for Movie {
    fn from(doc: MovieDoc) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            genre: doc.genre,
            rating: doc.rating,
            duration: doc.duration,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

impl From<&Movie> for MovieDoc {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            genre: movie.genre.clone(),
            rating: movie.rating,
            duration: movie.duration.clone(),
            created_at: to_bson_datetime(movie.created_at),
            updated_at: to_bson_datetime(movie.updated_at),
        }
    }
}
