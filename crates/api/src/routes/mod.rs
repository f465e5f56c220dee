//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::identity_middleware};

pub mod accounts;
pub mod balance;
pub mod charts;
pub mod fiscal;
pub mod health;

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Creates the API router: health is public, everything else needs a caller.
pub fn api_routes() -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(fiscal::routes())
        .merge(balance::routes())
        .merge(accounts::routes())
        .merge(charts::routes())
        .layer(middleware::from_fn(identity_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}
