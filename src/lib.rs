pub mod boundary;
pub mod build;
pub mod changelog;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod gateway;
pub mod metadata;
pub mod ui;
pub mod version;
pub mod workflow;

pub use error::{GitFlowError, Result};
