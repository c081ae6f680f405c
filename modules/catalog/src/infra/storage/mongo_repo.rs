use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::contract::model::{Movie, User};
use crate::domain::repo::{MovieFields, MoviesRepository, UserFields, UsersRepository};
use crate::infra::storage::entity::{MovieDoc, UserDoc, MOVIES_COLLECTION, USERS_COLLECTION};
use crate::infra::storage::mapper::to_bson_datetime;

/// Used when neither the options nor the connection string name a database.
pub const DEFAULT_DATABASE: &str = "cinegraph";
const APP_NAME: &str = "cinegraph";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub url: String,
    pub database: Option<String>,
    pub connect_timeout: Option<Duration>,
}

impl StoreOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: None,
            connect_timeout: None,
        }
    }
}

/// Owned handle to the document store. Cloning shares the driver's pool.
#[derive(Clone, Debug)]
pub struct CatalogStore {
    client: Client,
    db: Database,
    user_indexes: UserIndexes,
}

/// Unique email/username indexes, created at most once per store. A failed
/// attempt leaves the cell empty so the next user write tries again.
#[derive(Clone, Debug)]
struct UserIndexes {
    coll: Collection<UserDoc>,
    ready: Arc<OnceCell<()>>,
}

impl UserIndexes {
    fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(USERS_COLLECTION),
            ready: Arc::new(OnceCell::new()),
        }
    }

    async fn ensure(&self) -> anyhow::Result<()> {
        self.ready
            .get_or_try_init(|| async {
                let unique = |keys: Document| {
                    IndexModel::builder()
                        .keys(keys)
                        .options(IndexOptions::builder().unique(true).build())
                        .build()
                };
                self.coll
                    .create_indexes([unique(doc! { "email": 1 }), unique(doc! { "username": 1 })])
                    .await
                    .context("Failed to create user indexes")?;
                info!(collection = USERS_COLLECTION, "User indexes ensured");
                Ok::<_, anyhow::Error>(())
            })
            .await?;
        Ok(())
    }
}

impl CatalogStore {
    /// Parse the connection string and build the client. The driver connects
    /// lazily, so this succeeds even when the server is unreachable.
    pub async fn connect(opts: &StoreOptions) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(&opts.url)
            .await
            .context("Invalid MongoDB connection string")?;

        if let Some(timeout) = opts.connect_timeout {
            options.connect_timeout = Some(timeout);
            options.server_selection_timeout = Some(timeout);
        }
        options.app_name.get_or_insert_with(|| APP_NAME.to_owned());

        let name = opts
            .database
            .clone()
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_owned());

        let client = Client::with_options(options).context("Failed to build MongoDB client")?;
        let db = client.database(&name);
        debug!(database = %name, "MongoDB client created");

        let user_indexes = UserIndexes::new(&db);
        Ok(Self {
            client,
            db,
            user_indexes,
        })
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }

    /// Unique indexes backing the email and username constraints. Safe to call
    /// repeatedly; user writes call it too, so a failure here is recoverable.
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        self.user_indexes.ensure().await
    }

    pub fn indexes_ready(&self) -> bool {
        self.user_indexes.ready.initialized()
    }

    pub fn users(&self) -> MongoUsersRepository {
        MongoUsersRepository {
            coll: self.db.collection(USERS_COLLECTION),
            indexes: self.user_indexes.clone(),
        }
    }

    pub fn movies(&self) -> MongoMoviesRepository {
        MongoMoviesRepository {
            coll: self.db.collection(MOVIES_COLLECTION),
        }
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[derive(Clone)]
pub struct MongoUsersRepository {
    coll: Collection<UserDoc>,
    indexes: UserIndexes,
}

#[async_trait]
impl UsersRepository for MongoUsersRepository {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let docs: Vec<UserDoc> = self.coll.find(doc! {}).await?.try_collect().await?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        let found = self.coll.find_one(doc! { "_id": id }).await?;
        Ok(found.map(User::from))
    }

    async fn insert(&self, user: User) -> anyhow::Result<()> {
        self.indexes.ensure().await?;
        self.coll.insert_one(UserDoc::from(&user)).await?;
        Ok(())
    }

    async fn replace(
        &self,
        id: ObjectId,
        fields: UserFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<User>> {
        self.indexes.ensure().await?;
        let update = doc! {
            "$set": {
                "email": fields.email,
                "username": fields.username,
                "password": fields.password,
                "isAdmin": fields.is_admin,
                "updatedAt": to_bson_datetime(updated_at),
            }
        };
        let updated = self
            .coll
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(User::from))
    }

    async fn delete(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        let deleted = self.coll.find_one_and_delete(doc! { "_id": id }).await?;
        Ok(deleted.map(User::from))
    }
}

#[derive(Clone)]
pub struct MongoMoviesRepository {
    coll: Collection<MovieDoc>,
}

#[async_trait]
impl MoviesRepository for MongoMoviesRepository {
    async fn list(&self) -> anyhow::Result<Vec<Movie>> {
        let docs: Vec<MovieDoc> = self.coll.find(doc! {}).await?.try_collect().await?;
        Ok(docs.into_iter().map(Movie::from).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<Movie>> {
        let found = self.coll.find_one(doc! { "_id": id }).await?;
        Ok(found.map(Movie::from))
    }

    async fn insert(&self, movie: Movie) -> anyhow::Result<()> {
        self.coll.insert_one(MovieDoc::from(&movie)).await?;
        Ok(())
    }

    async fn replace(
        &self,
        id: ObjectId,
        fields: MovieFields,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Movie>> {
        let update = doc! {
            "$set": {
                "title": fields.title,
                "genre": fields.genre,
                "rating": fields.rating,
                "duration": fields.duration,
                "updatedAt": to_bson_datetime(updated_at),
            }
        };
        let updated = self
            .coll
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(Movie::from))
    }

    async fn delete(&self, id: ObjectId) -> anyhow::Result<Option<Movie>> {
        let deleted = self.coll.find_one_and_delete(doc! { "_id": id }).await?;
        Ok(deleted.map(Movie::from))
    }
}
