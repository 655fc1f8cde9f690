pub mod lifecycle;
pub mod model;
pub mod store;

pub use lifecycle::Lifecycle;
pub use model::{Job, JobStatus, LabelValue, Labels, Lease, Node};
pub use store::{Store, StoreError};
