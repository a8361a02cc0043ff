pub mod access;
pub mod api;
pub mod config;
pub mod coordinator;
pub mod export;
pub mod feed;
pub mod lamps;
pub mod models;
pub mod store;
pub mod telemetry;
pub mod timer;
