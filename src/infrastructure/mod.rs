pub mod persistence;
pub mod wps;
