pub mod error;
pub mod longpath;
pub mod metadata;
pub mod reparse;
pub mod types;
pub mod wait;
