//! # Harvest SDK
//!
//! Async client for the Harvest time tracking API v2.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use harvest_sdk::{HarvestClient, HarvestResult};
//!
//! #[tokio::main]
//! async fn main() -> HarvestResult<()> {
//!     // Credentials are read from HARVEST_ACCOUNT_ID / HARVEST_ACCESS_TOKEN
//!     // before every request.
//!     let client = HarvestClient::builder().build()?;
//!
//!     let assignments = client.project_assignments().list_mine().await?;
//!     println!("Assigned to {} projects", assignments.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod pagination;
pub mod transport;

pub use api::{
    ClientRef, CreateTimeEntryRequest, NamedRef, ProjectAssignment, ProjectRef, TaskAssignment,
    TimeEntry, UpdateTimeEntryRequest,
};
pub use client::{HarvestClient, HarvestClientBuilder};
pub use config::{ClientConfig, RetryConfig, DEFAULT_BASE_URL};
pub use credentials::{
    CredentialProvider, Credentials, EnvCredentials, StaticCredentials, ACCESS_TOKEN_VAR,
    ACCOUNT_ID_VAR, USER_AGENT_VAR,
};
pub use error::{HarvestError, HarvestResult};
