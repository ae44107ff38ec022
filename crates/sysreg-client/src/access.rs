use std::path::PathBuf;

use sysreg_core::{IdRegisters, RegId, RegPair, RegValue, SysregError, UnsupportedReason};

use crate::error::ClientError;
use crate::transport::Transport;

/// Construction-time client options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Device node of the Linux agent.
    pub device_path: PathBuf,
    /// Control name of the macOS agent.
    pub control_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/cpusysregs"),
            control_name: String::from("cpusysregs"),
        }
    }
}

impl ClientConfig {
    /// Overrides the device node path.
    #[must_use]
    pub fn with_device_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.device_path = path.into();
        self
    }

    /// Overrides the control name.
    #[must_use]
    pub fn with_control_name(mut self, name: impl Into<String>) -> Self {
        self.control_name = name.into();
        self
    }
}

/// Saturating request counters, grouped by outcome class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessStats {
    /// Completed reads.
    pub reads: u32,
    /// Completed writes.
    pub writes: u32,
    /// Requests refused with an unknown register.
    pub unknown_register: u32,
    /// Requests refused as unsupported operations.
    pub unsupported_operation: u32,
    /// Requests refused for a missing CPU capability.
    pub architecture_mismatch: u32,
    /// Backend failures reported by the agent.
    pub backend: u32,
    /// Transport-level I/O failures.
    pub io: u32,
}

impl AccessStats {
    fn record(&mut self, err: &ClientError) {
        let counter = match err {
            ClientError::Sysreg(SysregError::UnknownRegister { .. }) => &mut self.unknown_register,
            ClientError::Sysreg(SysregError::UnsupportedOperation { .. }) => {
                &mut self.unsupported_operation
            }
            ClientError::Sysreg(SysregError::ArchitectureMismatch { .. }) => {
                &mut self.architecture_mismatch
            }
            ClientError::Sysreg(SysregError::Backend(_)) => &mut self.backend,
            ClientError::Io(_) => &mut self.io,
        };
        *counter = counter.saturating_add(1);
    }

    /// Total refused/failed requests across all classes.
    #[must_use]
    pub const fn errors(&self) -> u32 {
        self.unknown_register
            .saturating_add(self.unsupported_operation)
            .saturating_add(self.architecture_mismatch)
            .saturating_add(self.backend)
            .saturating_add(self.io)
    }
}

/// User-facing register access handle over any transport.
#[derive(Debug, Default)]
pub struct RegAccess<T> {
    transport: T,
    stats: AccessStats,
}

impl<T: Transport> RegAccess<T> {
    /// Wraps a connected transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            stats: AccessStats::default(),
        }
    }

    /// Reads a register or pair by logical ID.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the agent refuses the request or the
    /// transport fails.
    pub fn read(&mut self, id: RegId) -> Result<RegValue, ClientError> {
        match self.transport.get(id) {
            Ok(value) => {
                self.stats.reads = self.stats.reads.saturating_add(1);
                Ok(value)
            }
            Err(err) => {
                self.stats.record(&err);
                Err(err)
            }
        }
    }

    /// Reads a 64-bit register by logical ID.
    ///
    /// # Errors
    ///
    /// In addition to [`RegAccess::read`] failures, refuses pair IDs with an
    /// unsupported-operation error.
    pub fn read_single(&mut self, id: RegId) -> Result<u64, ClientError> {
        self.require_single(id)?;
        match self.read(id)? {
            RegValue::Single(value) => Ok(value),
            // A conformant transport never answers a single ID with a pair.
            RegValue::Pair(_) => Err(ClientError::Sysreg(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::Cardinality,
            })),
        }
    }

    /// Reads a 128-bit pair by logical ID.
    ///
    /// # Errors
    ///
    /// In addition to [`RegAccess::read`] failures, refuses single IDs with
    /// an unsupported-operation error.
    pub fn read_pair(&mut self, id: RegId) -> Result<RegPair, ClientError> {
        self.require_pair(id)?;
        match self.read(id)? {
            RegValue::Pair(pair) => Ok(pair),
            RegValue::Single(_) => Err(ClientError::Sysreg(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::Cardinality,
            })),
        }
    }

    /// Writes a register or pair by logical ID.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the value width does not match the
    /// register, the agent refuses the request or the transport fails.
    pub fn write(&mut self, id: RegId, value: RegValue) -> Result<(), ClientError> {
        if value.cardinality() != id.cardinality() {
            let err = ClientError::Sysreg(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::Cardinality,
            });
            self.stats.record(&err);
            return Err(err);
        }
        match self.transport.set(id, value) {
            Ok(()) => {
                self.stats.writes = self.stats.writes.saturating_add(1);
                Ok(())
            }
            Err(err) => {
                self.stats.record(&err);
                Err(err)
            }
        }
    }

    /// Writes a 64-bit register by logical ID.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`RegAccess::write`].
    pub fn write_single(&mut self, id: RegId, value: u64) -> Result<(), ClientError> {
        self.write(id, RegValue::Single(value))
    }

    /// Writes a 128-bit pair by logical ID.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`RegAccess::write`].
    pub fn write_pair(&mut self, id: RegId, pair: RegPair) -> Result<(), ClientError> {
        self.write(id, RegValue::Pair(pair))
    }

    /// Snapshot of the four feature-ID registers for feature queries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when any of the four reads fails.
    pub fn id_registers(&mut self) -> Result<IdRegisters, ClientError> {
        Ok(IdRegisters {
            pfr0: self.read_single(RegId::Aa64Pfr0)?,
            pfr1: self.read_single(RegId::Aa64Pfr1)?,
            isar1: self.read_single(RegId::Aa64Isar1)?,
            isar2: self.read_single(RegId::Aa64Isar2)?,
        })
    }

    /// Request counters accumulated by this handle.
    #[must_use]
    pub const fn stats(&self) -> AccessStats {
        self.stats
    }

    /// Releases the wrapped transport.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn require_single(&mut self, id: RegId) -> Result<(), ClientError> {
        if id.is_pair() {
            let err = ClientError::Sysreg(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::Cardinality,
            });
            self.stats.record(&err);
            return Err(err);
        }
        Ok(())
    }

    fn require_pair(&mut self, id: RegId) -> Result<(), ClientError> {
        if !id.is_pair() {
            let err = ClientError::Sysreg(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::Cardinality,
            });
            self.stats.record(&err);
            return Err(err);
        }
        Ok(())
    }
}
