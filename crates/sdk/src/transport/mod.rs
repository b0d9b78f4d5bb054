//! Transport layer for the Harvest SDK.

pub mod http;

pub use http::{HttpTransport, ACCOUNT_ID_HEADER};
