pub mod config;
pub mod event_bus;
pub mod services;
