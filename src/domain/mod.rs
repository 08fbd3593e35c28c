pub mod entities;
pub mod metrics;
pub mod ports;
