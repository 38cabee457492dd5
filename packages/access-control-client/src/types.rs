use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper used by every access-control response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub identity: Identity,
    /// Membership CRM account id this user was provisioned for.
    #[serde(rename = "externalId", default)]
    pub external_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl User {
    pub fn group_ids(&self) -> Vec<u64> {
        self.groups.iter().map(|g| g.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body for creating a user, and for patching name/metadata on one.
#[derive(Debug, Clone, Serialize)]
pub struct UserRequest {
    pub identity: Identity,
    #[serde(rename = "externalId")]
    pub external_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GroupIdsRequest<'a> {
    #[serde(rename = "groupIds")]
    pub group_ids: &'a [u64],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: u64,
    #[serde(rename = "credentialType")]
    pub credential_type: CredentialType,
    #[serde(default)]
    pub mobile: Option<MobileCredential>,
}

impl Credential {
    pub fn is_mobile(&self) -> bool {
        self.credential_type.model_name == "mobile"
    }

    /// A mobile credential counts as activated once the platform has recorded
    /// its provisioning.
    pub fn is_activated(&self) -> bool {
        self.mobile
            .as_ref()
            .is_some_and(|m| m.provisioned_at.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialType {
    pub id: u64,
    #[serde(rename = "modelName")]
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileCredential {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "provisionedAt", default)]
    pub provisioned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateCredentialRequest<'a> {
    #[serde(rename = "credentialTypeId")]
    pub credential_type_id: u64,
    pub mobile: NewMobile<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewMobile<'a> {
    pub name: &'a str,
}
