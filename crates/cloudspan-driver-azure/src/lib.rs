//! Cloudspan Azure Driver
//!
//! Driver for Azure Resource Manager, bound to one subscription, location
//! and resource group.
//!
//! - Canonical ids are `<resource group>:<name>` and are mapped to and from
//!   full ARM resource paths
//! - PUT and DELETE may answer with an `Azure-AsyncOperation` URL which is
//!   polled through the connection's waiter before the handler returns
//! - Public IPs and security groups are attached through VNics, which the
//!   VM request then references
//!
//! # Credentials
//!
//! `subscription_id` is always required. Either a ready `auth_token`, or a
//! service principal (`tenant_id`, `client_id`, `client_secret`) exchanged
//! through the client-credentials flow.

pub mod api;
pub mod connection;
pub mod driver;
pub mod error;
pub mod image;
pub mod operation;
pub mod path;
pub mod public_ip;
pub mod rest;
pub mod security;
pub mod vm;
pub mod vnetwork;
pub mod vnic;

pub use api::{ArmApi, ArmSession, AzureConnector, OperationRef, ResourceType, VmAction};
pub use connection::AzureConnection;
pub use driver::{AzureDriver, DRIVER_NAME};
pub use error::{AzureError, Result};
pub use rest::{ArmRestClient, RestConnector};
