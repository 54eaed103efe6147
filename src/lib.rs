pub mod cli;
pub mod configuration;
pub mod error;
pub mod handler;
pub mod helpers;
pub mod model;
pub mod provider;
pub mod types;
