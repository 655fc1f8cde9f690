pub mod api;
pub mod config;
pub mod db;
pub mod ids;
pub mod jobs;

pub use config::Config;
pub use jobs::{Job, JobStatus, LabelValue, Labels, Lifecycle, Node, Store, StoreError};
