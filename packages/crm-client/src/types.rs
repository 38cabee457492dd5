use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account as returned by `GET /accounts/{id}` and by search.
///
/// Everything except the id is optional on the wire; the server decodes it into
/// a typed account at its boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "customFields", default)]
    pub custom_fields: Vec<CustomField>,
}

impl AccountRecord {
    /// Value of a custom field by name, treating blank strings as absent.
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// One membership term from the account's membership history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id: String,
    #[serde(rename = "termStartDate", default)]
    pub term_start_date: Option<String>,
    #[serde(rename = "termEndDate", default)]
    pub term_end_date: Option<String>,
    /// Payment status, e.g. `SUCCEEDED`, `FAILED`, `REFUNDED`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(rename = "membershipLevel", default)]
    pub membership_level: Option<MembershipLevel>,
    #[serde(rename = "autoRenewal", default)]
    pub auto_renewal: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipLevel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MembershipsResponse {
    #[serde(default)]
    pub memberships: Vec<MembershipRecord>,
}

/// Search operator understood by the account search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchOperator {
    Equal,
    NotBlank,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
    pub field: String,
    pub operator: SearchOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SearchField {
    pub fn equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: SearchOperator::Equal,
            value: Some(value.into()),
        }
    }

    pub fn not_blank(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: SearchOperator::NotBlank,
            value: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "searchFields")]
    pub search_fields: Vec<SearchField>,
    pub pagination: SearchPagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPagination {
    #[serde(rename = "currentPage")]
    pub current_page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    #[serde(rename = "totalResults", default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "searchResults", default)]
    pub search_results: Vec<AccountRecord>,
    pub pagination: SearchPagination,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PatchAccountRequest<'a> {
    #[serde(rename = "customFields")]
    pub custom_fields: [PatchField<'a>; 1],
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PatchField<'a> {
    pub name: &'a str,
    pub value: &'a str,
}
