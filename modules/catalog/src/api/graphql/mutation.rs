use async_graphql::{Context, Object, Result};
use std::sync::Arc;

use super::error::or_null;
use super::types::{MovieObject, UserObject};
use crate::contract::model::{NewMovie, NewUser};
use crate::domain::service::Service;

/// Root mutation type. Updates replace every field.
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a user; the password is stored as a bcrypt hash
    async fn add_user(
        &self,
        ctx: &Context<'_>,
        email: String,
        username: String,
        password: String,
        is_admin: bool,
    ) -> Result<Option<UserObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let new_user = NewUser {
            email,
            username,
            password,
            is_admin,
        };
        let user = svc.create_user(new_user).await.map(Some);
        Ok(or_null(ctx, user).map(UserObject::from))
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: String,
        email: String,
        username: String,
        password: String,
        is_admin: bool,
    ) -> Result<Option<UserObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let fields = NewUser {
            email,
            username,
            password,
            is_admin,
        };
        let user = svc.update_user(&id, fields).await.map(Some);
        Ok(or_null(ctx, user).map(UserObject::from))
    }

    /// Delete a user, returning the removed record
    async fn delete_user(&self, ctx: &Context<'_>, id: String) -> Result<Option<UserObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let deleted = svc.delete_user(&id).await;
        Ok(or_null(ctx, deleted).map(UserObject::from))
    }

    async fn add_movie(
        &self,
        ctx: &Context<'_>,
        title: String,
        genre: String,
        rating: i32,
        duration: String,
    ) -> Result<Option<MovieObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let new_movie = NewMovie {
            title,
            genre,
            rating,
            duration,
        };
        let movie = svc.create_movie(new_movie).await.map(Some);
        Ok(or_null(ctx, movie).map(MovieObject::from))
    }

    async fn update_movie(
        &self,
        ctx: &Context<'_>,
        id: String,
        title: String,
        genre: String,
        rating: i32,
        duration: String,
    ) -> Result<Option<MovieObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let fields = NewMovie {
            title,
            genre,
            rating,
            duration,
        };
        let movie = svc.update_movie(&id, fields).await.map(Some);
        Ok(or_null(ctx, movie).map(MovieObject::from))
    }

    async fn delete_movie(&self, ctx: &Context<'_>, id: String) -> Result<Option<MovieObject>> {
        let svc = ctx.data::<Arc<Service>>()?;
        let deleted = svc.delete_movie(&id).await;
        Ok(or_null(ctx, deleted).map(MovieObject::from))
    }
}
