//! Identifier types for the locker wall simulator
//!
//! This module contains the tenant and device name identifiers used to address
//! simulated locker walls and to build their publish topics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted with the device ordinal in a name template
pub const NAME_INDEX_PLACEHOLDER: &str = "{n}";

/// Topic suffix every locker wall publishes its status under
pub const STATUS_TOPIC_SUFFIX: &str = "status";

/// Logical namespace grouping locker walls under one publish topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tenant(String);

impl Tenant {
    /// Create a tenant identifier
    pub fn new(tenant: impl Into<String>) -> Self {
        Self(tenant.into())
    }

    /// Borrow the raw tenant string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Topic that devices of this tenant publish their status to
    pub fn status_topic(&self) -> String {
        format!("{}/{}", self.0, STATUS_TOPIC_SUFFIX)
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tenant {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique name of a locker wall within the fleet
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceName(String);

impl DeviceName {
    /// Create a device name from an arbitrary string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build the name of the device at `index` from a template.
    ///
    /// Every `{n}` in the template is replaced with the index. A template
    /// without the placeholder gets the index appended, so `spurdo` and
    /// `spurdo{n}` both yield `spurdo0`, `spurdo1`, ...
    pub fn from_template(template: &str, index: usize) -> Self {
        if template.contains(NAME_INDEX_PLACEHOLDER) {
            Self(template.replace(NAME_INDEX_PLACEHOLDER, &index.to_string()))
        } else {
            Self(format!("{}{}", template, index))
        }
    }

    /// Borrow the raw name string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_topic() {
        let tenant = Tenant::new("tester");
        assert_eq!(tenant.status_topic(), "tester/status");
        assert_eq!(tenant.to_string(), "tester");
    }

    #[test]
    fn test_name_from_template_with_placeholder() {
        assert_eq!(DeviceName::from_template("spurdo{n}", 0).as_str(), "spurdo0");
        assert_eq!(DeviceName::from_template("wall-{n}-a", 42).as_str(), "wall-42-a");
    }

    #[test]
    fn test_name_from_template_without_placeholder() {
        assert_eq!(DeviceName::from_template("spurdo", 7).as_str(), "spurdo7");
    }

    #[test]
    fn test_identifiers_serialize_transparently() {
        let name = DeviceName::new("spurdo3");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"spurdo3\"");

        let tenant: Tenant = serde_json::from_str("\"acme\"").unwrap();
        assert_eq!(tenant, Tenant::new("acme"));
    }
}
