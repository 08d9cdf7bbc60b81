pub mod binding;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod selection;
pub mod server;
