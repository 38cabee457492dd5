use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, NaiveDate};
use dotenvy::dotenv;

use crate::common::MaintenanceWindow;
use crate::domains::access_control::AccessControlSettings;
use crate::domains::entitlement::EntitlementPolicy;
use crate::domains::forum::ForumSettings;
use crate::domains::marketing::MarketingSettings;
use crate::kernel::RetryPolicy;

#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub base_url: String,
    pub org_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AccessControlConfig {
    pub base_url: String,
    pub org_id: u64,
    pub username: String,
    pub password: String,
    pub settings: AccessControlSettings,
}

#[derive(Debug, Clone)]
pub struct ForumConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_username: String,
    pub settings: ForumSettings,
}

#[derive(Debug, Clone)]
pub struct MarketingConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub settings: MarketingSettings,
}

/// Everything the reconciler needs besides provider handles.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub policy: EntitlementPolicy,
    pub page_size: usize,
    /// Accounts evaluated concurrently during a batch run.
    pub concurrency: usize,
    pub retry: RetryPolicy,
    /// Local offset used for "today" and the maintenance window.
    pub utc_offset: FixedOffset,
    pub maintenance: Option<MaintenanceWindow>,
    pub access_control: AccessControlSettings,
    pub forum: Option<ForumSettings>,
    pub primary_marketing: Option<MarketingSettings>,
    pub secondary_marketing: Option<MarketingSettings>,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Shared secret expected in `X-Webhook-Token`; unchecked when unset.
    pub webhook_token: Option<String>,
    pub crm: CrmConfig,
    pub access_control: AccessControlConfig,
    pub forum: Option<ForumConfig>,
    pub primary_marketing: Option<MarketingConfig>,
    pub secondary_marketing: Option<MarketingConfig>,
    pub policy: EntitlementPolicy,
    pub page_size: usize,
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub utc_offset: FixedOffset,
    pub maintenance: Option<MaintenanceWindow>,
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}

fn required_parsed<T>(name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(name)?
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a valid {}", std::any::type_name::<T>()))
}

/// Parse a comma-separated list of ids, ignoring blanks.
pub fn parse_id_list(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().with_context(|| format!("invalid id {s:?}")))
        .collect()
}

fn marketing_from_env(prefix: &str, name: &str) -> Result<Option<MarketingConfig>> {
    let Some(base_url) = optional(&format!("{prefix}_BASE_URL")) else {
        return Ok(None);
    };

    Ok(Some(MarketingConfig {
        base_url,
        api_key: required(&format!("{prefix}_API_KEY"))?,
        api_secret: required(&format!("{prefix}_API_SECRET"))?,
        settings: MarketingSettings {
            name: name.to_string(),
            members_segment_id: required_parsed(&format!("{prefix}_MEMBERS_SEGMENT_ID"))?,
            orientation_segment_id: optional(&format!("{prefix}_ORIENTATION_SEGMENT_ID"))
                .map(|raw| raw.trim().parse::<u64>())
                .transpose()
                .with_context(|| format!("{prefix}_ORIENTATION_SEGMENT_ID must be a number"))?,
        },
    }))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let access_control = AccessControlConfig {
            base_url: required("ACCESS_BASE_URL")?,
            org_id: required_parsed("ACCESS_ORG_ID")?,
            username: required("ACCESS_USERNAME")?,
            password: required("ACCESS_PASSWORD")?,
            settings: AccessControlSettings {
                subscriber_group_id: required_parsed("ACCESS_SUBSCRIBER_GROUP_ID")?,
                exception_group_ids: parse_id_list(
                    &optional("ACCESS_EXCEPTION_GROUP_IDS").unwrap_or_default(),
                )
                .context("ACCESS_EXCEPTION_GROUP_IDS must be a comma-separated id list")?,
                mobile_credential_type_id: required_parsed("ACCESS_MOBILE_CREDENTIAL_TYPE_ID")?,
                resurrection_age: Duration::from_secs(parsed(
                    "ACCESS_RESURRECTION_AGE_SECS",
                    300u64,
                )?),
            },
        };

        let forum = match optional("FORUM_BASE_URL") {
            Some(base_url) => Some(ForumConfig {
                base_url,
                api_key: required("FORUM_API_KEY")?,
                api_username: required("FORUM_API_USERNAME")?,
                settings: ForumSettings {
                    group_name: required("FORUM_GROUP_NAME")?,
                    group_id: required_parsed("FORUM_GROUP_ID")?,
                },
            }),
            None => None,
        };

        let utc_offset_hours: i32 = parsed("UTC_OFFSET_HOURS", 0)?;
        let utc_offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .ok_or_else(|| anyhow!("UTC_OFFSET_HOURS out of range: {utc_offset_hours}"))?;
        let maintenance = optional("MAINTENANCE_WINDOW")
            .map(|window| MaintenanceWindow::parse(&window, utc_offset_hours))
            .transpose()
            .context("MAINTENANCE_WINDOW must look like HH:MM-HH:MM")?;

        let waiver_valid_since = optional("WAIVER_VALID_SINCE")
            .map(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"))
            .transpose()
            .context("WAIVER_VALID_SINCE must be a YYYY-MM-DD date")?;

        let retry = RetryPolicy {
            max_attempts: parsed("RETRY_MAX_ATTEMPTS", 5)?,
            initial_delay: Duration::from_millis(parsed("RETRY_INITIAL_DELAY_MS", 500)?),
            ..RetryPolicy::default()
        };

        let page_size = parsed("PAGE_SIZE", 100usize)?;
        if page_size == 0 {
            return Err(anyhow!("PAGE_SIZE must be positive"));
        }

        Ok(Self {
            port: parsed("PORT", 8080)?,
            webhook_token: optional("WEBHOOK_TOKEN"),
            crm: CrmConfig {
                base_url: required("CRM_BASE_URL")?,
                org_id: required("CRM_ORG_ID")?,
                api_key: required("CRM_API_KEY")?,
            },
            access_control,
            forum,
            primary_marketing: marketing_from_env("MARKETING_PRIMARY", "marketing_primary")?,
            secondary_marketing: marketing_from_env("MARKETING_SECONDARY", "marketing_secondary")?,
            policy: EntitlementPolicy {
                grace_period_days: parsed("GRACE_PERIOD_DAYS", 1)?,
                waiver_valid_since,
            },
            page_size,
            concurrency: parsed("EVALUATION_CONCURRENCY", 4usize)?.max(1),
            retry,
            utc_offset,
            maintenance,
        })
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            policy: self.policy,
            page_size: self.page_size,
            concurrency: self.concurrency,
            retry: self.retry.clone(),
            utc_offset: self.utc_offset,
            maintenance: self.maintenance,
            access_control: self.access_control.settings.clone(),
            forum: self.forum.as_ref().map(|f| f.settings.clone()),
            primary_marketing: self.primary_marketing.as_ref().map(|m| m.settings.clone()),
            secondary_marketing: self.secondary_marketing.as_ref().map(|m| m.settings.clone()),
        }
    }
}
