use thiserror::Error;

use crate::domains::entitlement::EntitlementError;
use crate::domains::membership::DecodeError;
use crate::kernel::ProviderError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("entitlement could not be computed: {0}")]
    Entitlement(#[from] EntitlementError),
}

impl From<DecodeError> for ReconcileError {
    fn from(err: DecodeError) -> Self {
        Self::Entitlement(EntitlementError::Decode(err))
    }
}
