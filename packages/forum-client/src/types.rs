use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembersResponse {
    #[serde(default)]
    pub members: Vec<GroupMember>,
    pub meta: MembersMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupMember {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembersMeta {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// The forum takes usernames as one comma-separated string.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UsernamesRequest {
    pub usernames: String,
}
