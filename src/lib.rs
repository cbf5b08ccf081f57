// AgroTrade Client - Library root

pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod models;
pub mod resources;
pub mod session;
pub mod store;
