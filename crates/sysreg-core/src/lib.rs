//! Protocol core for AArch64 system-register access.
//!
//! Pure, deterministic library code shared by the unprivileged client and
//! the privileged agent: the logical register catalog, feature-ID decoding,
//! MRS/MSR instruction-word construction and the command-code mapping of
//! both OS transports. Nothing in this crate touches hardware; register
//! access goes through the [`backend::SysregBackend`] seam.

/// Logical register catalog and value types.
pub mod catalog;
pub use catalog::{
    Access, Cardinality, RegDescriptor, RegEncoding, RegId, RegPair, RegValue,
    PAIR_RANGE_BASE, PAIR_REGISTER_COUNT, REGISTER_CATALOG, SINGLE_RANGE_BASE,
    SINGLE_REGISTER_COUNT,
};

/// Feature predicates over the AArch64 ID registers.
pub mod features;
pub use features::{
    has_branch_target_id, has_generic_pointer_auth, has_pointer_auth, has_realm_management,
    has_speculation_barrier_v2p2, realm_management_version, IdRegisters,
};

/// MRS/MSR instruction-word construction.
pub mod insn;
pub use insn::{
    mrs_word, msr_word, SysregEncoding, GPR_ZERO_INDEX, MRS_TEMPLATE, MSR_TEMPLATE,
};

/// Client↔agent command-code derivation for both transports.
pub mod command;
pub use command::{
    DeviceCode, Direction, SocketCode, DEVICE_MAGIC, DEVICE_RANGE_CAPACITY, SOCKET_OPTION_BASE,
};

/// Error taxonomy shared by both sides of the protocol.
pub mod error;
pub use error::{BackendError, SysregError, UnsupportedReason};

/// Agent-side dispatch and register backends.
pub mod backend;
pub use backend::{Agent, SimBackend, SysregBackend};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
