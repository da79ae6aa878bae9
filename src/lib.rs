pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod models;
pub mod repositories;
pub mod state;
pub mod telemetry;
