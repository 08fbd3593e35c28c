pub mod measurement;
pub mod process;
pub mod retention;
pub mod trigger;

pub use measurement::{FailureKind, Measurement};
pub use process::MonitoredProcess;
pub use retention::RetentionPolicy;
pub use trigger::{IntervalUnit, TriggerConfig};
