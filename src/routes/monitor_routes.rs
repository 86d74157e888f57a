use axum::{Router, routing::get};
use crate::{AppState, controllers::monitor_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/test", get(monitor_controller::get_parse_test))
        .route("/quick_test", get(monitor_controller::get_quick_test))
        .route("/start_monitor", get(monitor_controller::get_start_monitor))
        .route("/stop_monitor", get(monitor_controller::get_stop_monitor))
        .route("/check", get(monitor_controller::get_check))
}
