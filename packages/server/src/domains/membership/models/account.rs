use std::fmt;

use chrono::NaiveDate;
use crm_client::AccountRecord;
use serde::{Deserialize, Serialize};

use super::term::parse_date;
use crate::domains::membership::fields;
use crate::domains::membership::DecodeError;

/// CRM account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Who an account is, independent of what it has paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    #[default]
    Regular,
    Staff,
    SpaceLead,
    CoWorkingTenant,
}

impl AccountCategory {
    /// Categories that are granted facility access without a membership.
    pub const BYPASS: [AccountCategory; 2] = [AccountCategory::Staff, AccountCategory::SpaceLead];

    /// Value stored in the CRM custom field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Staff => "Staff",
            Self::SpaceLead => "Space Lead",
            Self::CoWorkingTenant => "Co-Working Tenant",
        }
    }

    pub fn is_bypass(&self) -> bool {
        Self::BYPASS.contains(self)
    }

    fn parse(raw: Option<&str>) -> Result<Self, DecodeError> {
        let Some(raw) = raw else {
            return Ok(Self::Regular);
        };
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "regular" => Ok(Self::Regular),
            "staff" => Ok(Self::Staff),
            "spacelead" => Ok(Self::SpaceLead),
            "coworkingtenant" => Ok(Self::CoWorkingTenant),
            _ => Err(DecodeError::invalid_value(fields::ACCOUNT_CATEGORY, raw)),
        }
    }
}

/// A CRM account decoded into the fields reconciliation cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    /// Lowercased; marketing segments are keyed by it.
    pub email: Option<String>,
    pub category: AccountCategory,
    pub waiver_signed: Option<NaiveDate>,
    pub orientation_date: Option<NaiveDate>,
    pub suspended: bool,
    pub access_user_id: Option<u64>,
    pub forum_username: Option<String>,
    /// Facility access as last written back to the CRM.
    pub facility_access_flag: Option<bool>,
}

impl Account {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn parse_flag(field: &str, raw: Option<&str>) -> Result<Option<bool>, DecodeError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Ok(Some(true)),
        "no" | "false" | "0" => Ok(Some(false)),
        _ => Err(DecodeError::invalid_value(field, raw)),
    }
}

fn parse_optional_date(
    record: &AccountRecord,
    field: &str,
) -> Result<Option<NaiveDate>, DecodeError> {
    record
        .custom_field(field)
        .map(|value| parse_date(field, value))
        .transpose()
}

impl TryFrom<&AccountRecord> for Account {
    type Error = DecodeError;

    fn try_from(record: &AccountRecord) -> Result<Self, Self::Error> {
        if record.account_id.trim().is_empty() {
            return Err(DecodeError::missing("accountId"));
        }

        let access_user_id = record
            .custom_field(fields::ACCESS_USER_ID)
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|_| DecodeError::invalid_value(fields::ACCESS_USER_ID, raw))
            })
            .transpose()?;

        let email = record
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            id: AccountId::new(record.account_id.trim()),
            first_name: record.first_name.clone().unwrap_or_default(),
            last_name: record.last_name.clone().unwrap_or_default(),
            email,
            category: AccountCategory::parse(record.custom_field(fields::ACCOUNT_CATEGORY))?,
            waiver_signed: parse_optional_date(record, fields::WAIVER_DATE)?,
            orientation_date: parse_optional_date(record, fields::ORIENTATION_DATE)?,
            suspended: parse_flag(
                fields::ACCESS_SUSPENDED,
                record.custom_field(fields::ACCESS_SUSPENDED),
            )?
            .unwrap_or(false),
            access_user_id,
            forum_username: record
                .custom_field(fields::FORUM_USERNAME)
                .map(str::to_lowercase),
            facility_access_flag: parse_flag(
                fields::FACILITY_ACCESS,
                record.custom_field(fields::FACILITY_ACCESS),
            )?,
        })
    }
}
