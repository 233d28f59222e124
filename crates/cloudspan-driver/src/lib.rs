//! Cloudspan Driver Core
//!
//! This crate provides the provider-independent contract of Cloudspan:
//! drivers turn credentials into connections, connections manufacture
//! resource handlers, and handlers translate between canonical records and
//! each provider's native resource model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 DriverRegistry                   │
//! │            (provider name → driver)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │ connect_cloud(credential, region)
//! ┌─────────────────▼───────────────────────────────┐
//! │                CloudConnection                   │
//! │  create_vm_handler() / create_public_ip_handler()│
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │   VmHandler  ImageHandler  PublicIpHandler ...   │
//! │  ┌────────────┐ ┌──────────────┐ ┌───────────┐  │
//! │  │  ID codec  │ │ status vocab │ │  waiter   │  │
//! │  └────────────┘ └──────────────┘ └───────────┘  │
//! └───────┬─────────────────┬─────────────┬─────────┘
//!         │                 │             │
//! ┌───────▼──────┐ ┌────────▼─────┐ ┌─────▼────────┐
//! │   generic    │ │     gcp      │ │    azure     │
//! └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! # Concurrency
//!
//! Connections and handlers hold only immutable bound fields plus a shared
//! provider client handle, so they are `Send + Sync` and may be used from
//! concurrent tasks. Each provider crate documents whether its client handle
//! is safe for concurrent use.

pub mod capability;
pub mod connection;
pub mod context;
pub mod credential;
pub mod driver;
pub mod error;
pub mod id;
pub mod resources;
pub mod status;
pub mod translate;
pub mod waiter;

// Re-exports
pub use capability::{CapabilityInfo, ResourceKind};
pub use connection::{CloudConnection, capability_mismatches};
pub use context::CallContext;
pub use credential::{ConnectionInfo, CredentialInfo, RegionInfo};
pub use driver::{CloudDriver, DriverRegistry};
pub use error::{BoxError, DriverError, Result};
pub use resources::*;
pub use status::{NO_STATUS, NormalizedStatus, StatusVocabulary, VmStatus};
pub use waiter::{LongRunningOperation, OperationState, OperationWaiter, WaitConfig};
