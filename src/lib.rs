pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod export;
pub mod flash;
pub mod listing;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
