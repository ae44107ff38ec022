use thiserror::Error;

use crate::catalog::RegId;

/// Reasons a request addressing a known register is still refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum UnsupportedReason {
    /// Write issued against a read-only register.
    #[error("register is read-only")]
    ReadOnly,
    /// Value cardinality does not match the register (single vs pair).
    #[error("value cardinality does not match the register")]
    Cardinality,
    /// Payload length does not match the register width.
    #[error("payload length does not match the register width")]
    PayloadSize,
}

/// Backend read/write failure categories reported through the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BackendError {
    /// Backend could not complete the register read.
    #[error("backend register read failed")]
    ReadFailed,
    /// Backend could not complete the register write.
    #[error("backend register write failed")]
    WriteFailed,
}

/// Stable error taxonomy shared by the agent and client sides.
///
/// Range-capacity overflow has no variant here on purpose: command-code
/// capacity is checked by `const` assertions in [`crate::command`], so an
/// over-full catalog fails to build instead of failing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SysregError {
    /// Logical ID or command code outside the populated catalog.
    #[error("unknown register (raw value {raw:#x})")]
    UnknownRegister {
        /// Raw wire value that failed to resolve.
        raw: u32,
    },
    /// Direction or cardinality the target register does not support.
    #[error("unsupported operation on {}: {reason}", .id.name())]
    UnsupportedOperation {
        /// Register the request addressed.
        id: RegId,
        /// Refusal category.
        reason: UnsupportedReason,
    },
    /// Register gated on a CPU capability the host does not implement.
    #[error("{} requires a CPU capability the host lacks", .id.name())]
    ArchitectureMismatch {
        /// Register the request addressed.
        id: RegId,
    },
    /// Failure reported by the register backend itself.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SysregError {
    /// Stable low-byte code for diagnostics counters and foreign surfaces.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::UnknownRegister { .. } => 0x01,
            Self::UnsupportedOperation { .. } => 0x02,
            Self::ArchitectureMismatch { .. } => 0x03,
            Self::Backend(_) => 0x04,
        }
    }
}
