//! ARM resource paths
//!
//! ARM addresses everything by path:
//! `/subscriptions/<s>/resourceGroups/<rg>/providers/<namespace>/<type>/<name>[/<child type>/<child>]`.
//! Canonical ids keep only the resource group and the name; these helpers
//! convert in both directions through the id codec.

use crate::api::ResourceType;
use cloudspan_driver::{DriverError, Result, id};

/// Parsed resource path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    pub subscription: String,
    pub resource_group: String,
    /// `(type, name)` pairs after the provider namespace, outermost first
    pub segments: Vec<(String, String)>,
}

impl ResourcePath {
    pub fn parse(path: &str) -> Result<Self> {
        let malformed =
            || DriverError::InvalidId(format!("'{}' is not an ARM resource path", path));
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

        let (subscription, resource_group, rest) = match parts.as_slice() {
            [subs, sub, groups, rg, providers, _namespace, rest @ ..]
                if subs.eq_ignore_ascii_case("subscriptions")
                    && groups.eq_ignore_ascii_case("resourceGroups")
                    && providers.eq_ignore_ascii_case("providers")
                    && !rest.is_empty()
                    && rest.len() % 2 == 0 =>
            {
                (*sub, *rg, rest)
            }
            _ => return Err(malformed()),
        };
        if rest.iter().any(|p| p.is_empty()) {
            return Err(malformed());
        }

        Ok(Self {
            subscription: subscription.to_string(),
            resource_group: resource_group.to_string(),
            segments: rest
                .chunks(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                .collect(),
        })
    }

    /// Name of the innermost resource
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", |(_, name)| name.as_str())
    }

    /// Name of the segment of type `kind` (e.g. `networkInterfaces`)
    pub fn name_of(&self, kind: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(kind))
            .map(|(_, name)| name.as_str())
    }

    /// Canonical `rg:name` of the innermost resource
    ///
    /// ARM may echo the resource group in another case; when it matches
    /// `bound_group` ignoring case the bound spelling is used.
    pub fn to_id(&self, bound_group: &str) -> Result<String> {
        id::encode(self.group(bound_group), self.name())
    }

    /// Canonical id of the enclosing resource of type `kind`
    pub fn parent_id(&self, kind: &str, bound_group: &str) -> Result<String> {
        let name = self.name_of(kind).ok_or_else(|| {
            DriverError::InvalidId(format!("resource path has no '{}' segment", kind))
        })?;
        id::encode(self.group(bound_group), name)
    }

    fn group<'a>(&'a self, bound_group: &'a str) -> &'a str {
        if self.resource_group.eq_ignore_ascii_case(bound_group) {
            bound_group
        } else {
            &self.resource_group
        }
    }
}

/// Full path of a top-level resource
pub fn resource_path(subscription: &str, group: &str, kind: ResourceType, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
        subscription,
        group,
        kind.provider_path(),
        name
    )
}

/// Canonical id of an ARM path, mapping malformed paths to `TranslationError`
pub fn id_from_path(path: &str, bound_group: &str, what: &str) -> Result<String> {
    ResourcePath::parse(path)
        .and_then(|p| p.to_id(bound_group))
        .map_err(|e| DriverError::TranslationError(format!("{}: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIC: &str = "/subscriptions/0000/resourceGroups/RG1/providers/Microsoft.Network/networkInterfaces/nic1/ipConfigurations/ipconfig1";

    #[test]
    fn test_parse_nested_path() {
        let path = ResourcePath::parse(NIC).unwrap();
        assert_eq!(path.subscription, "0000");
        assert_eq!(path.resource_group, "RG1");
        assert_eq!(path.name(), "ipconfig1");
        assert_eq!(path.name_of("networkinterfaces"), Some("nic1"));
        assert_eq!(path.parent_id("networkInterfaces", "rg1").unwrap(), "rg1:nic1");
        assert_eq!(path.to_id("other").unwrap(), "RG1:ipconfig1");
    }

    #[test]
    fn test_malformed_paths() {
        for bad in [
            "",
            "vm1",
            "/subscriptions/0000/resourceGroups/rg1",
            "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines",
            "/subscriptions/0000/groups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
        ] {
            assert!(
                matches!(ResourcePath::parse(bad), Err(DriverError::InvalidId(_))),
                "{}",
                bad
            );
        }
        assert!(matches!(
            id_from_path("vm1", "rg1", "vm id"),
            Err(DriverError::TranslationError(_))
        ));
    }

    #[test]
    fn test_resource_path_round_trips_to_id() {
        let path = resource_path("0000", "rg1", ResourceType::PublicIpAddresses, "ip1");
        assert_eq!(
            path,
            "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Network/publicIPAddresses/ip1"
        );
        assert_eq!(id_from_path(&path, "rg1", "ip").unwrap(), "rg1:ip1");
    }
}
