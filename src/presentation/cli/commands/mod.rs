pub mod daemon;
pub mod probe;
pub mod report;
