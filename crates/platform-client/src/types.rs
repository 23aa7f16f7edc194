//! Output records returned by resource API operations.
//!
//! Only the fields the importer consumes are decoded; in particular the
//! numeric ids of projects and environments, which downstream operations
//! depend on.

use serde::Deserialize;

/// A created or looked-up billing group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BillingGroup {
    /// Server-assigned id
    #[serde(default)]
    pub id: u32,
    /// Billing group name
    #[serde(default)]
    pub name: String,
}

/// A created or looked-up group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Group {
    /// Server-assigned id (a UUID string)
    #[serde(default)]
    pub id: String,
    /// Group name
    #[serde(default)]
    pub name: String,
}

/// A created user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    /// Server-assigned id (a UUID string)
    #[serde(default)]
    pub id: String,
    /// User email
    #[serde(default)]
    pub email: String,
}

/// An SSH key attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SshKeyRecord {
    /// Server-assigned id
    #[serde(default)]
    pub id: u32,
    /// Key name
    #[serde(default)]
    pub name: String,
}

/// A created notification of any kind.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NotificationRecord {
    /// Server-assigned id
    #[serde(default)]
    pub id: u32,
    /// Notification name
    #[serde(default)]
    pub name: String,
}

/// A created or looked-up project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Project {
    /// Server-assigned id, the resolved identifier consumed by dependent
    /// operations
    pub id: u32,
    /// Project name
    #[serde(default)]
    pub name: String,
}

/// A created or looked-up environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Environment {
    /// Server-assigned id, the resolved identifier consumed by variable
    /// attachment
    pub id: u32,
    /// Environment name
    #[serde(default)]
    pub name: String,
}

/// An attached environment variable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnvVar {
    /// Server-assigned id
    #[serde(default)]
    pub id: u32,
    /// Variable name
    #[serde(default)]
    pub name: String,
}
