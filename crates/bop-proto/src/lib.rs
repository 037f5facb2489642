pub mod config;
pub mod gateway;
pub mod platform;
pub mod protocol;
pub mod query;
