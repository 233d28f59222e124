//! In-memory resource store
//!
//! Plays the role of the provider account: it outlives connections, so a
//! resource created through one connection is visible through the next.

use cloudspan_driver::{
    DriverError, ImageInfo, KeyPairInfo, PublicIpInfo, Result, SecurityInfo, VNetworkInfo,
    VNicInfo, VmInfo,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Resources keyed by canonical id
#[derive(Debug, Default)]
pub struct MockState {
    pub vms: BTreeMap<String, VmInfo>,
    pub images: BTreeMap<String, ImageInfo>,
    pub public_ips: BTreeMap<String, PublicIpInfo>,
    pub securities: BTreeMap<String, SecurityInfo>,
    pub vnetworks: BTreeMap<String, VNetworkInfo>,
    pub vnics: BTreeMap<String, VNicInfo>,
    pub key_pairs: BTreeMap<String, KeyPairInfo>,
    next_address: u32,
}

impl MockState {
    /// Hand out addresses from 203.0.113.0/24 (TEST-NET-3)
    pub fn allocate_address(&mut self) -> String {
        self.next_address += 1;
        format!("203.0.113.{}", self.next_address % 254 + 1)
    }
}

/// Shared account state; safe for concurrent use
#[derive(Debug, Default)]
pub struct MockCloud {
    state: Mutex<MockState>,
}

impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        // every mutation is a single map operation, so a poisoned lock still holds valid state
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of resources across all kinds
    pub fn resource_count(&self) -> usize {
        let s = self.state();
        s.vms.len()
            + s.images.len()
            + s.public_ips.len()
            + s.securities.len()
            + s.vnetworks.len()
            + s.vnics.len()
            + s.key_pairs.len()
    }
}

/// Insert `record` under `id` unless the id is taken
pub fn insert_new<T>(map: &mut BTreeMap<String, T>, id: &str, record: T) -> Result<()> {
    if map.contains_key(id) {
        return Err(DriverError::AlreadyExists(id.to_string()));
    }
    map.insert(id.to_string(), record);
    Ok(())
}

pub fn find<'a, T>(map: &'a BTreeMap<String, T>, id: &str) -> Result<&'a T> {
    map.get(id).ok_or_else(|| DriverError::NotFound(id.to_string()))
}

pub fn remove<T>(map: &mut BTreeMap<String, T>, id: &str) -> Result<T> {
    map.remove(id).ok_or_else(|| DriverError::NotFound(id.to_string()))
}

/// Records whose id lives in `scope`
pub fn in_scope<T: Clone>(map: &BTreeMap<String, T>, scope: &str) -> Vec<T> {
    let prefix = format!("{}{}", scope, cloudspan_driver::id::SEPARATOR);
    map.iter()
        .filter(|(id, _)| id.starts_with(&prefix))
        .map(|(_, record)| record.clone())
        .collect()
}
