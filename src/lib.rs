pub mod background;
pub mod config;
pub mod error;
pub mod index_client;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
