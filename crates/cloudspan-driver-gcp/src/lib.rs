//! Cloudspan GCP Driver
//!
//! Driver for Google Compute Engine: instances, images, static addresses
//! and VPC networks of one project.
//!
//! - Instance ids are `<zone>:<name>`, address ids `<region>:<name>`,
//!   image and network ids `global:<name>`
//! - Every mutation returns a Compute Engine operation which is polled
//!   through the connection's waiter before the handler returns
//! - A connection is bound to one region and one zone; the zone is required
//!
//! # Credentials
//!
//! Either a service-account key JSON in `client_secret` (exchanged for an
//! access token with a signed RS256 assertion), or a ready `auth_token`
//! together with `project_id`.
//!
//! # Concurrency
//!
//! [`ComputeRestClient`] wraps a `reqwest::Client` and an immutable token,
//! so handlers from one connection may be used from concurrent tasks.

pub mod api;
pub mod auth;
pub mod connection;
pub mod driver;
pub mod error;
pub mod image;
pub mod operation;
pub mod public_ip;
pub mod rest;
pub mod vm;
pub mod vnetwork;

pub use api::{ComputeApi, ComputeSession, GcpConnector, InstanceAction, OperationScope};
pub use auth::ServiceAccountKey;
pub use connection::GcpConnection;
pub use driver::{DRIVER_NAME, GcpDriver};
pub use error::{GcpError, Result};
pub use rest::{ComputeRestClient, RestConnector};
