//! CRM custom-field names the engine reads and writes.

pub const WAIVER_DATE: &str = "WaiverDate";
pub const ORIENTATION_DATE: &str = "FacilityTourDate";
pub const ACCESS_SUSPENDED: &str = "AccessSuspended";
pub const ACCOUNT_CATEGORY: &str = "AccountCategory";
pub const ACCESS_USER_ID: &str = "AccessControlUserId";
pub const FORUM_USERNAME: &str = "ForumUsername";
/// Last facility-access value published by the engine.
pub const FACILITY_ACCESS: &str = "FacilityAccess";

/// Standard (non-custom) search field present on every account with a term.
pub const MEMBERSHIP_EXPIRATION: &str = "Membership Expiration Date";
