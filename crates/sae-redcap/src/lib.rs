//! REDCap data access for SAE numbering.
//!
//! [`SaeGateway`] is the seam the pipeline depends on; [`RedcapClient`] is its
//! implementation over the REDCap record API.

pub mod client;
pub mod error;
pub mod form;
pub mod gateway;
pub mod rows;

pub use client::RedcapClient;
pub use error::{GatewayError, Result};
pub use form::{DEFAULT_COMPLETED_VALUE, RedcapForm};
pub use gateway::{ImportOutcome, SaeGateway};
