use thiserror::Error;

use crate::mx::Error as MxError;

/// Faults outside the verification taxonomy. Everything the network can do
/// to a probe ends up in a [`VerificationResult`](super::VerificationResult)
/// instead.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Mx(#[from] MxError),
}
