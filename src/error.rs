use thiserror::Error;

/// Errors returned by [`crate::load`]. `E` is the transport's own error type
/// and is passed through untouched.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error<E> {
    /// Re-applying the PNVM on a repeated load failed in the transport.
    #[error("failed to set pnvm: {0}")]
    SetPnvm(E),

    /// The firmware did not send `PNVM_INIT_COMPLETE` within the timeout.
    #[error("timed out waiting for pnvm init complete")]
    Timeout,

    /// The driver aborted all pending notification waits, usually because the
    /// firmware crashed or the device is going away.
    #[error("notification wait aborted")]
    Aborted,
}

/// Outcome of a failed notification wait.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitError {
    #[error("notification wait timed out")]
    Timeout,

    #[error("notification wait aborted")]
    Aborted,
}

impl<E> From<WaitError> for Error<E> {
    fn from(value: WaitError) -> Self {
        match value {
            WaitError::Timeout => Error::Timeout,
            WaitError::Aborted => Error::Aborted,
        }
    }
}
