use std::time::Duration;

/// Group and credential identifiers for one access-control organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlSettings {
    /// Group that grants door access to paying members.
    pub subscriber_group_id: u64,
    /// Groups whose members are never revoked automatically.
    pub exception_group_ids: Vec<u64>,
    pub mobile_credential_type_id: u64,
    /// A "newly created" user older than this is a resurrected record.
    pub resurrection_age: Duration,
}

impl AccessControlSettings {
    pub fn is_exception_group(&self, group_id: u64) -> bool {
        self.exception_group_ids.contains(&group_id)
    }

    /// Subscriber plus every exception group.
    pub fn managed_group_ids(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(self.subscriber_group_id).chain(self.exception_group_ids.iter().copied())
    }
}

/// Where one identity stands in the access-control platform.
///
/// A freshly created identity is `Provisioned`. An existing one outside every
/// managed group reads as `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    NoIdentity,
    Provisioned,
    Subscriber,
    Exception,
    Disabled,
}

impl AccessState {
    /// Classify from the user's group ids; `None` means no user exists.
    pub fn classify(group_ids: Option<&[u64]>, settings: &AccessControlSettings) -> Self {
        let Some(groups) = group_ids else {
            return Self::NoIdentity;
        };
        if groups.iter().any(|g| settings.is_exception_group(*g)) {
            Self::Exception
        } else if groups.contains(&settings.subscriber_group_id) {
            Self::Subscriber
        } else {
            Self::Disabled
        }
    }

    /// What to do given whether the account should have facility access.
    pub fn transition(self, facility_access: bool) -> AccessAction {
        match (self, facility_access) {
            (Self::NoIdentity, true) => AccessAction::Provision,
            (Self::Provisioned | Self::Disabled, true) => AccessAction::Grant,
            (Self::Subscriber | Self::Exception, true) => AccessAction::None,
            (Self::Subscriber, false) => AccessAction::Revoke,
            (Self::Exception, false) => AccessAction::Hold,
            (Self::NoIdentity | Self::Provisioned | Self::Disabled, false) => AccessAction::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    None,
    /// Create the user, then grant.
    Provision,
    /// Join the subscriber group and issue a mobile credential.
    Grant,
    /// Leave every group.
    Revoke,
    /// Should lose access but sits in an exception group; warn only.
    Hold,
}
