//! External collaborators: configuration file and S3 storage.

pub mod config;
pub mod s3;

pub use config::ReportConfig;
pub use s3::{S3ObjectStore, load_aws_config};
