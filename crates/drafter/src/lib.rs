//! Drafter - playbook-grounded incident report drafting
//!
//! Retrieves the playbooks closest to an alert category from a persistent
//! vector collection, assembles a fixed report template around the analyst's
//! context and hands it to a hosted generation model.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod playbook;
pub mod report;
pub mod server;

pub use config::DrafterConfig;
pub use error::{DrafterError, Result};
pub use pipeline::ReportService;
