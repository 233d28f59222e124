//! Cloudspan Mock Driver
//!
//! In-memory implementation of the driver contract. Every connection created
//! by one [`MockDriver`] shares a single [`MockCloud`], so the driver behaves
//! like one provider account that outlives its sessions.
//!
//! Used by the test suites of the other crates and by `cloudspan` itself for
//! dry runs (`--profile` pointing at `driver: mock`).
//!
//! # Example
//!
//! ```no_run
//! use cloudspan_driver::{CloudDriver, CredentialInfo, PublicIpReqInfo, RegionInfo};
//! use cloudspan_driver_mock::MockDriver;
//!
//! # async fn example() -> cloudspan_driver::Result<()> {
//! let driver = MockDriver::new();
//! let conn = driver
//!     .connect_cloud(
//!         CredentialInfo::new(),
//!         RegionInfo::new("mock-1").with_resource_group("rg1"),
//!     )
//!     .await?;
//! let ips = conn.create_public_ip_handler()?;
//! let ip = ips.create_public_ip(PublicIpReqInfo::new("ip1")).await?;
//! assert_eq!(ip.id, "rg1:ip1");
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod driver;
pub mod handlers;
pub mod store;

pub use connection::MockConnection;
pub use driver::{DRIVER_NAME, MockDriver};
pub use store::MockCloud;
