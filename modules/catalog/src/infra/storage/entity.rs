use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "users";
pub const MOVIES_COLLECTION: &str = "movies";

/// Document shape of the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Document shape of the `movies` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub genre: String,
    pub rating: i32,
    pub duration: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
