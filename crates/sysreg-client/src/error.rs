use thiserror::Error;

use sysreg_core::SysregError;

/// Client-side failure surface: everything the protocol can refuse plus
/// transport-level I/O.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Refusal reported by the protocol or the agent.
    #[error(transparent)]
    Sysreg(#[from] SysregError),
    /// Transport-level failure talking to the agent.
    #[error("transport I/O failure")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Stable low-byte code, extending the core taxonomy with 0x05 for I/O.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Sysreg(inner) => inner.code(),
            Self::Io(_) => 0x05,
        }
    }
}
