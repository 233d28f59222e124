//! Cloudspan Generic Driver
//!
//! Driver for token-authenticated IaaS providers with a flat REST model:
//! servers, templates, adaptive IPs, security groups, subnets and keypairs.
//!
//! - Ids are the provider's own opaque identifiers, passed through unchanged
//! - Mutations are synchronous; there is no operation polling
//! - Network interfaces are part of the server, so the VNic handler is
//!   declared unsupported
//!
//! # Credentials
//!
//! `identity_endpoint` plus either `auth_token` or `username`/`password`
//! (`tenant_id` optional). The token is exchanged once at connect time.
//!
//! # Concurrency
//!
//! [`RestClient`] wraps a `reqwest::Client`, which is safe to share; handlers
//! from one connection may be used from concurrent tasks.

pub mod api;
pub mod connection;
pub mod driver;
pub mod error;
pub mod image;
pub mod key_pair;
pub mod public_ip;
pub mod rest;
pub mod security;
pub mod vm;
pub mod vnetwork;

pub use api::{Collection, GenericApi, GenericConnector, ServerAction};
pub use connection::GenericConnection;
pub use driver::{DRIVER_NAME, GenericDriver};
pub use error::{GenericError, Result};
pub use rest::{RestClient, RestConnector};
