//! Canonical VM status and provider status normalization
//!
//! Providers report status on up to two independent axes (power state and
//! provisioning state). A [`StatusVocabulary`] maps each axis onto
//! [`VmStatus`]; anything it does not recognize becomes `Unknown` instead of
//! failing the call.

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Detail string used when a provider reports no status at all
pub const NO_STATUS: &str = "-";

/// Canonical VM lifecycle status
///
/// `Pending → Running → (Suspending → Suspended → Resuming → Running)
/// | (Rebooting → Running) | (Terminating → Terminated)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VmStatus {
    Pending,
    Running,
    Suspending,
    Suspended,
    Resuming,
    Rebooting,
    Terminating,
    Terminated,
    Unknown,
}

impl VmStatus {
    /// Whether the VM is between two stable states
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            VmStatus::Pending
                | VmStatus::Suspending
                | VmStatus::Resuming
                | VmStatus::Rebooting
                | VmStatus::Terminating
        )
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    ///
    /// `Terminated` is absorbing. `Unknown` may move anywhere, since the
    /// previous state was never observed.
    pub fn can_transition_to(&self, next: VmStatus) -> bool {
        use VmStatus::*;
        match (self, next) {
            (Terminated, _) => false,
            (Unknown, _) | (_, Unknown) => true,
            (Pending, Running) | (Pending, Terminating) => true,
            (Running, Suspending) | (Running, Rebooting) | (Running, Terminating) => true,
            (Suspending, Suspended) => true,
            (Suspended, Resuming) | (Suspended, Terminating) => true,
            (Resuming, Running) => true,
            (Rebooting, Running) => true,
            (Terminating, Terminated) => true,
            _ => false,
        }
    }

    /// `OperationFailed` unless VM `id` may move from `self` to `next`
    pub fn ensure_transition(&self, id: &str, next: VmStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DriverError::OperationFailed(format!(
                "VM {} cannot go from {} to {}",
                id, self, next
            )))
        }
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VmStatus::Pending => "PENDING",
            VmStatus::Running => "RUNNING",
            VmStatus::Suspending => "SUSPENDING",
            VmStatus::Suspended => "SUSPENDED",
            VmStatus::Resuming => "RESUMING",
            VmStatus::Rebooting => "REBOOTING",
            VmStatus::Terminating => "TERMINATING",
            VmStatus::Terminated => "TERMINATED",
            VmStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Result of normalizing provider status tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedStatus {
    pub status: VmStatus,
    /// Provider tokens joined as `power(provisioning)`, or [`NO_STATUS`]
    pub detail: String,
}

/// Per-provider status vocabulary
#[derive(Debug, Clone, Copy)]
pub struct StatusVocabulary {
    pub power: &'static [(&'static str, VmStatus)],
    pub provisioning: &'static [(&'static str, VmStatus)],
}

impl StatusVocabulary {
    /// Map the two status axes onto one canonical status
    ///
    /// Precedence: a transitional provisioning status (e.g. "creating",
    /// "deleting") wins, then the power axis, then any provisioning status.
    /// Matching is case-insensitive; empty tokens count as absent.
    pub fn normalize(&self, power: Option<&str>, provisioning: Option<&str>) -> NormalizedStatus {
        let power = non_empty(power);
        let provisioning = non_empty(provisioning);

        let by_power = power.and_then(|p| lookup(self.power, p));
        let by_provisioning = provisioning.and_then(|p| lookup(self.provisioning, p));

        let status = match (by_provisioning, by_power) {
            (Some(p), _) if p.is_transitional() => p,
            (_, Some(p)) => p,
            (Some(p), None) => p,
            (None, None) => VmStatus::Unknown,
        };

        NormalizedStatus {
            status,
            detail: status_detail(power, provisioning),
        }
    }

    /// Single-axis providers report only a power-style status
    pub fn normalize_single(&self, status: Option<&str>) -> NormalizedStatus {
        self.normalize(status, None)
    }
}

/// Join the status axes in fixed order: `power(provisioning)`, either one
/// alone, or [`NO_STATUS`]
pub fn status_detail(power: Option<&str>, provisioning: Option<&str>) -> String {
    match (non_empty(power), non_empty(provisioning)) {
        (Some(p), Some(v)) => format!("{}({})", p, v),
        (Some(p), None) => p.to_string(),
        (None, Some(v)) => v.to_string(),
        (None, None) => NO_STATUS.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn lookup(table: &[(&str, VmStatus)], token: &str) -> Option<VmStatus> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, status)| *status)
}
