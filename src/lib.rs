//! Library entrypoint for FunPay Hunter.
//!
//! The binary only wires settings, logging and the listener; everything else lives
//! here so integration tests under `tests/` can build the app state and routers.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

use std::sync::Arc;

use services::monitor::Monitor;
use services::telegram::NotifyChannel;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub monitor: Monitor,
    // same channel the monitor notifies through; used for bot replies and announcements
    pub channel: Arc<dyn NotifyChannel>,
}
