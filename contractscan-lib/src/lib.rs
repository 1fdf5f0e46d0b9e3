pub mod api;
pub mod config;
pub mod error;
pub mod harvest;
pub mod model;
