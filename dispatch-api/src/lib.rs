use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod orders;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/orders/createOrder", post(orders::create_order))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/orders", get(orders::list_orders))
        .layer(axum::middleware::from_fn(auth::bearer_auth_middleware));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
