pub mod store;
pub mod transport;

pub use store::{MeasurementQuery, MeasurementStore, StoreError};
pub use transport::{TransportError, WpsTransport};
