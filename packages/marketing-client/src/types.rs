use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentMembersResponse {
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Total")]
    pub total: usize,
    #[serde(rename = "Data", default)]
    pub data: Vec<SegmentContact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentContact {
    #[serde(rename = "Email")]
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentAction {
    #[serde(rename = "addnoforce")]
    Add,
    #[serde(rename = "remove")]
    Remove,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ManageContactsRequest<'a> {
    #[serde(rename = "Contacts")]
    pub contacts: Vec<ContactRef<'a>>,
    #[serde(rename = "ContactsLists")]
    pub contacts_lists: Vec<ListAction>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ContactRef<'a> {
    #[serde(rename = "Email")]
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ListAction {
    #[serde(rename = "ListID")]
    pub list_id: u64,
    #[serde(rename = "Action")]
    pub action: SegmentAction,
}
