use axum::{Router, routing::post};
use crate::{AppState, controllers::webhook_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/webhook", post(webhook_controller::post_webhook))
}
