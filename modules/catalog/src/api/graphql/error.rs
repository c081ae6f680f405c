use async_graphql::Context;
use tracing::{error, warn};

use crate::domain::error::DomainError;

/// Every domain failure reaches the client as a plain GraphQL error carrying
/// the failure's message.
fn into_gql(err: DomainError) -> async_graphql::Error {
    if err.is_internal() {
        error!(error = %err, "Catalog operation failed");
    } else {
        warn!(error = %err, "Catalog request rejected");
    }
    async_graphql::Error::new(err.to_string())
}

/// Settle a nullable field: a failure is reported in `errors` with the field's
/// path and the field itself resolves to `null`, so `data` keeps its key.
pub fn or_null<T>(ctx: &Context<'_>, result: Result<Option<T>, DomainError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            let err = into_gql(err).into_server_error(ctx.item.pos);
            ctx.add_error(ctx.set_error_path(err));
            None
        }
    }
}
