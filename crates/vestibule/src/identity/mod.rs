//! The signed-in identity model.

mod snapshot;

pub use snapshot::SnapshotCache;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user's profile plus per-resource role assignments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub is_active: bool,
    pub is_super_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Personal details; omitted from super-administrator snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<PersonalDetails>,
    /// One row per tenant/resource the identity has a role on.
    #[serde(default)]
    pub resources: Vec<ResourceAssignment>,
}

impl Identity {
    /// Construct a minimal synthetic identity from a login response alone.
    ///
    /// Used in degraded mode when the issued access credential is too large
    /// for the live identity fetch to carry; the super-admin flag comes from
    /// the login response, not from inspecting the email.
    pub fn synthetic(email: impl Into<String>, is_super_admin: bool, now: DateTime<Utc>) -> Self {
        let email = email.into();
        Self {
            id: email.clone(),
            email,
            is_active: true,
            is_super_admin,
            created_at: now,
            updated_at: now,
            details: None,
            resources: Vec::new(),
        }
    }

    /// The display role for this identity: super-admins report a fixed role,
    /// everyone else their first resource assignment.
    pub fn role(&self) -> &str {
        if self.is_super_admin {
            "superadmin"
        } else {
            self.resources
                .first()
                .map(|r| r.role.as_str())
                .unwrap_or("member")
        }
    }
}

/// Optional personal details attached to an identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A role held on a single tenant/resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAssignment {
    pub resource_id: String,
    #[serde(default)]
    pub resource_name: Option<String>,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_identity_carries_email_and_flag() {
        let now = Utc::now();
        let identity = Identity::synthetic("root@example.com", true, now);
        assert_eq!(identity.email, "root@example.com");
        assert!(identity.is_super_admin);
        assert!(identity.is_active);
        assert!(identity.resources.is_empty());
    }

    #[test]
    fn role_prefers_super_admin() {
        let now = Utc::now();
        let identity = Identity::synthetic("root@example.com", true, now);
        assert_eq!(identity.role(), "superadmin");
    }

    #[test]
    fn role_falls_back_to_first_assignment() {
        let now = Utc::now();
        let mut identity = Identity::synthetic("alice@example.com", false, now);
        assert_eq!(identity.role(), "member");

        identity.resources.push(ResourceAssignment {
            resource_id: "org-1".into(),
            resource_name: Some("Org One".into()),
            role: "manager".into(),
        });
        assert_eq!(identity.role(), "manager");
    }
}
