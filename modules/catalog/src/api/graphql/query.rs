use async_graphql::{Context, Object, Result};
use std::sync::Arc;
use tracing::debug;

use super::error::or_null;
use super::types::{MovieObject, UserObject};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Root query type
pub struct Query;

#[Object(name = "RootQueryType")]
impl Query {
    /// All users
    async fn users(&self, ctx: &Context<'_>) -> Result<Option<Vec<UserObject>>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let users = svc.list_users().await;
        Ok(or_null(
            ctx,
            users.map(|all| Some(all.into_iter().map(UserObject::from).collect())),
        ))
    }

    /// One user by id. Unknown or malformed ids resolve to `null` without an error.
    async fn user(&self, ctx: &Context<'_>, id: String) -> Result<Option<UserObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let user = match svc.get_user(&id).await {
            Err(DomainError::InvalidId { value }) => {
                debug!(id = %value, "Malformed user id, resolving to null");
                return Ok(None);
            }
            other => other,
        };
        Ok(or_null(ctx, user).map(UserObject::from))
    }

    /// All movies
    async fn movies(&self, ctx: &Context<'_>) -> Result<Option<Vec<MovieObject>>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let movies = svc.list_movies().await;
        Ok(or_null(
            ctx,
            movies.map(|all| Some(all.into_iter().map(MovieObject::from).collect())),
        ))
    }

    /// One movie by id, `null` when absent
    async fn movie(&self, ctx: &Context<'_>, id: String) -> Result<Option<MovieObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let movie = svc.get_movie(&id).await;
        Ok(or_null(ctx, movie).map(MovieObject::from))
    }
}
