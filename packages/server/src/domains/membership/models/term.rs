use chrono::NaiveDate;
use crm_client::MembershipRecord;
use rust_decimal::Decimal;

use crate::domains::membership::DecodeError;

/// Payment status of a membership term as reported by the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    Pending,
    Failed,
    Refunded,
    Canceled,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUCCEEDED" => Self::Succeeded,
            "PENDING" => Self::Pending,
            "FAILED" => Self::Failed,
            "REFUNDED" => Self::Refunded,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Regular,
    Ceramics,
}

impl Tier {
    /// Ceramics levels are recognised by name.
    pub fn from_level_name(name: Option<&str>) -> Self {
        match name {
            Some(name) if name.to_ascii_lowercase().contains("ceramics") => Self::Ceramics,
            _ => Self::Regular,
        }
    }
}

/// One immutable membership term.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipTerm {
    pub id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: PaymentStatus,
    pub fee: Decimal,
    pub level_id: Option<String>,
    pub tier: Tier,
    pub auto_renew: bool,
}

impl MembershipTerm {
    pub fn is_succeeded(&self) -> bool {
        self.status == PaymentStatus::Succeeded
    }

    /// The payment has reached a final outcome, successful or not.
    pub fn is_settled(&self) -> bool {
        self.status != PaymentStatus::Pending
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn is_comped(&self) -> bool {
        self.fee.is_zero()
    }
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DecodeError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .map_err(|_| DecodeError::invalid_date(field, value))
}

/// Decode a membership history.
///
/// Succeeded terms must carry valid dates and a fee. Terms with any other
/// status never count towards entitlement, so when their dates are unusable
/// they are dropped instead of failing the account.
pub fn decode_terms(records: &[MembershipRecord]) -> Result<Vec<MembershipTerm>, DecodeError> {
    let mut terms = Vec::with_capacity(records.len());

    for record in records {
        let status = record
            .status
            .as_deref()
            .map(PaymentStatus::parse)
            .unwrap_or_else(|| PaymentStatus::Other(String::new()));
        let succeeded = status == PaymentStatus::Succeeded;

        let dates = match (&record.term_start_date, &record.term_end_date) {
            (Some(start), Some(end)) => parse_date("termStartDate", start)
                .and_then(|s| parse_date("termEndDate", end).map(|e| (s, e))),
            (None, _) => Err(DecodeError::missing("termStartDate")),
            (_, None) => Err(DecodeError::missing("termEndDate")),
        };

        let (start, end) = match dates {
            Ok(dates) => dates,
            Err(e) if succeeded => return Err(e),
            Err(e) => {
                tracing::debug!(
                    membership_id = %record.id,
                    error = %e,
                    "Dropping non-succeeded term with unusable dates"
                );
                continue;
            }
        };

        let fee = match record.fee {
            Some(fee) => fee,
            None if succeeded => return Err(DecodeError::missing("fee")),
            None => Decimal::ZERO,
        };

        let level = record.membership_level.as_ref();
        terms.push(MembershipTerm {
            id: record.id.clone(),
            start,
            end,
            status,
            fee,
            level_id: level.map(|l| l.id.clone()),
            tier: Tier::from_level_name(level.and_then(|l| l.name.as_deref())),
            auto_renew: record.auto_renewal.unwrap_or(false),
        });
    }

    Ok(terms)
}
