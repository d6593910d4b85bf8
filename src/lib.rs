pub mod api;
pub mod app_state;
pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod server;
pub mod services;
pub mod telemetry;
pub mod utils;
pub mod views;
