pub mod probe;
pub mod scheduler;
