//! Agent-side dispatch over a register backend.
//!
//! [`SysregBackend`] is the seam between the protocol and the hardware: one
//! read and one write per architectural register encoding. Everything above
//! it is portable, so [`Agent`] runs unchanged over real MRS/MSR accessors,
//! the in-memory [`SimBackend`], or any test double. The agent is the only
//! place access policy lives: read-only rejection, cardinality checks and
//! pointer-authentication capability gating all happen here, before the
//! backend is touched with the request's target register.

use std::collections::BTreeMap;

use crate::catalog::{Cardinality, RegEncoding, RegId, RegPair, RegValue};
use crate::command::{DeviceCode, Direction, SocketCode};
use crate::error::{BackendError, SysregError, UnsupportedReason};
use crate::features::{has_generic_pointer_auth, has_pointer_auth, IdRegisters};
use crate::insn::SysregEncoding;

/// Raw register accessor the agent dispatches through.
pub trait SysregBackend {
    /// Reads the 64-bit value of one architectural register.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::ReadFailed`] when the backend cannot complete
    /// the read.
    fn read(&mut self, encoding: SysregEncoding) -> Result<u64, BackendError>;

    /// Writes the 64-bit value of one architectural register.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::WriteFailed`] when the backend cannot complete
    /// the write.
    fn write(&mut self, encoding: SysregEncoding, value: u64) -> Result<(), BackendError>;
}

/// Simulated register store keyed by packed encoding.
///
/// Never-written registers read as zero, the way unimplemented fields of the
/// real ID space do; writes always succeed. Policy (read-only registers,
/// capability gates) is not modelled here on purpose, it belongs to the
/// dispatch layer above.
#[derive(Debug, Clone, Default)]
pub struct SimBackend {
    store: BTreeMap<u32, u64>,
}

impl SimBackend {
    /// Creates an empty store; every register reads as zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one register, bypassing dispatch policy.
    pub fn preload(&mut self, encoding: SysregEncoding, value: u64) {
        self.store.insert(encoding.sreg(), value);
    }

    /// Inspects one register without going through dispatch.
    ///
    /// `None` means the register was never written.
    #[must_use]
    pub fn peek(&self, encoding: SysregEncoding) -> Option<u64> {
        self.store.get(&encoding.sreg()).copied()
    }
}

impl SysregBackend for SimBackend {
    fn read(&mut self, encoding: SysregEncoding) -> Result<u64, BackendError> {
        Ok(self.store.get(&encoding.sreg()).copied().unwrap_or(0))
    }

    fn write(&mut self, encoding: SysregEncoding, value: u64) -> Result<(), BackendError> {
        self.store.insert(encoding.sreg(), value);
        Ok(())
    }
}

const fn single_encoding(id: RegId) -> SysregEncoding {
    match id.descriptor().single_encoding() {
        Some(encoding) => encoding,
        None => panic!("not a single-width register"),
    }
}

const ISAR1_ENCODING: SysregEncoding = single_encoding(RegId::Aa64Isar1);
const ISAR2_ENCODING: SysregEncoding = single_encoding(RegId::Aa64Isar2);

/// Privileged-side request dispatcher.
///
/// Both command transports funnel into the same [`Agent::get`]/[`Agent::set`]
/// pair, so the policy checks cannot diverge between them.
#[derive(Debug, Clone, Default)]
pub struct Agent<B> {
    backend: B,
}

impl<B: SysregBackend> Agent<B> {
    /// Wraps a backend in the dispatch layer.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Shared access to the wrapped backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Exclusive access to the wrapped backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Reads a register or pair by logical ID.
    ///
    /// # Errors
    ///
    /// Returns [`SysregError::ArchitectureMismatch`] for a key pair the CPU
    /// does not implement and [`SysregError::Backend`] when the backend
    /// fails.
    pub fn get(&mut self, id: RegId) -> Result<RegValue, SysregError> {
        self.check_capability(id)?;
        match id.descriptor().encoding {
            RegEncoding::Single(encoding) => Ok(RegValue::Single(self.backend.read(encoding)?)),
            RegEncoding::Pair { high, low } => {
                let high = self.backend.read(high)?;
                let low = self.backend.read(low)?;
                Ok(RegValue::Pair(RegPair { high, low }))
            }
        }
    }

    /// Writes a register or pair by logical ID.
    ///
    /// # Errors
    ///
    /// Returns [`SysregError::UnsupportedOperation`] for a read-only register
    /// or a value of the wrong width, [`SysregError::ArchitectureMismatch`]
    /// for a key pair the CPU does not implement and [`SysregError::Backend`]
    /// when the backend fails. Policy is checked before the backend is
    /// touched, so a rejected request leaves the register unmodified.
    pub fn set(&mut self, id: RegId, value: RegValue) -> Result<(), SysregError> {
        if !id.is_writable() {
            return Err(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::ReadOnly,
            });
        }
        if value.cardinality() != id.cardinality() {
            return Err(SysregError::UnsupportedOperation {
                id,
                reason: UnsupportedReason::Cardinality,
            });
        }
        self.check_capability(id)?;

        match (id.descriptor().encoding, value) {
            (RegEncoding::Single(encoding), RegValue::Single(value)) => {
                self.backend.write(encoding, value)?;
            }
            (RegEncoding::Pair { high, low }, RegValue::Pair(pair)) => {
                self.backend.write(high, pair.high)?;
                self.backend.write(low, pair.low)?;
            }
            // Ruled out by the cardinality check above.
            _ => {
                return Err(SysregError::UnsupportedOperation {
                    id,
                    reason: UnsupportedReason::Cardinality,
                })
            }
        }
        Ok(())
    }

    /// Snapshot of the four feature-ID registers, read through the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SysregError::Backend`] when any of the reads fails.
    pub fn id_registers(&mut self) -> Result<IdRegisters, SysregError> {
        Ok(IdRegisters {
            pfr0: self.backend.read(single_encoding(RegId::Aa64Pfr0))?,
            pfr1: self.backend.read(single_encoding(RegId::Aa64Pfr1))?,
            isar1: self.backend.read(ISAR1_ENCODING)?,
            isar2: self.backend.read(ISAR2_ENCODING)?,
        })
    }

    /// Serves one device-transport request.
    ///
    /// `payload` is the request buffer the transport exchanged: filled on
    /// GET, consumed on SET. Its length must match the payload size the
    /// command code declares.
    ///
    /// # Errors
    ///
    /// Returns [`SysregError::UnknownRegister`] for a code outside the
    /// catalog, plus every error [`Agent::get`]/[`Agent::set`] can produce.
    pub fn serve_device(&mut self, code: u32, payload: &mut [u8]) -> Result<(), SysregError> {
        let (direction, id) =
            DeviceCode::parse(code).ok_or(SysregError::UnknownRegister { raw: code })?;
        match direction {
            Direction::Get => self.read_into(id, payload),
            Direction::Set => self.write_from(id, payload),
        }
    }

    /// Serves one control-socket read request.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`Agent::serve_device`].
    pub fn serve_socket_get(&mut self, option: u32, payload: &mut [u8]) -> Result<(), SysregError> {
        let id = SocketCode::parse(option).ok_or(SysregError::UnknownRegister { raw: option })?;
        self.read_into(id, payload)
    }

    /// Serves one control-socket write request.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`Agent::serve_device`].
    pub fn serve_socket_set(&mut self, option: u32, payload: &[u8]) -> Result<(), SysregError> {
        let id = SocketCode::parse(option).ok_or(SysregError::UnknownRegister { raw: option })?;
        self.write_from(id, payload)
    }

    // Key registers only exist on CPUs with the matching authentication
    // capability; the generic key has its own feature field. Checked per
    // request with fresh backend reads, exactly like the agent side of the
    // wire protocol must.
    fn check_capability(&mut self, id: RegId) -> Result<(), SysregError> {
        if !id.is_pair() {
            return Ok(());
        }
        let isar1 = self.backend.read(ISAR1_ENCODING)?;
        let isar2 = self.backend.read(ISAR2_ENCODING)?;
        let present = if id == RegId::ApgaKey {
            has_generic_pointer_auth(isar1, isar2)
        } else {
            has_pointer_auth(isar1, isar2)
        };
        if present {
            Ok(())
        } else {
            Err(SysregError::ArchitectureMismatch { id })
        }
    }

    fn read_into(&mut self, id: RegId, payload: &mut [u8]) -> Result<(), SysregError> {
        check_payload_len(id, payload.len())?;
        match self.get(id)? {
            RegValue::Single(value) => payload.copy_from_slice(&value.to_le_bytes()),
            RegValue::Pair(pair) => payload.copy_from_slice(&pair.to_le_bytes()),
        }
        Ok(())
    }

    fn write_from(&mut self, id: RegId, payload: &[u8]) -> Result<(), SysregError> {
        check_payload_len(id, payload.len())?;
        let value = match id.cardinality() {
            Cardinality::Single => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(payload);
                RegValue::Single(u64::from_le_bytes(bytes))
            }
            Cardinality::Pair => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(payload);
                RegValue::Pair(RegPair::from_le_bytes(bytes))
            }
        };
        self.set(id, value)
    }
}

const fn check_payload_len(id: RegId, len: usize) -> Result<(), SysregError> {
    if len == id.cardinality().byte_len() {
        Ok(())
    } else {
        Err(SysregError::UnsupportedOperation {
            id,
            reason: UnsupportedReason::PayloadSize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Agent, SimBackend, SysregBackend};
    use crate::catalog::{RegId, RegPair, RegValue};
    use crate::command::DeviceCode;
    use crate::error::{BackendError, SysregError, UnsupportedReason};
    use crate::insn::SysregEncoding;

    const ISAR1: SysregEncoding = SysregEncoding::new(3, 0, 0, 6, 1);
    const ISAR2: SysregEncoding = SysregEncoding::new(3, 0, 0, 6, 2);

    fn agent_with_pac() -> Agent<SimBackend> {
        let mut backend = SimBackend::new();
        // APA nonzero (address auth), GPA3 nonzero (generic auth).
        backend.preload(ISAR1, 0x0000_0010);
        backend.preload(ISAR2, 0x0000_0100);
        Agent::new(backend)
    }

    #[test]
    fn single_write_then_read_roundtrips() {
        let mut agent = Agent::new(SimBackend::new());
        agent
            .set(RegId::TpidrEl0, RegValue::Single(0xDEAD_BEEF))
            .unwrap();
        assert_eq!(
            agent.get(RegId::TpidrEl0).unwrap(),
            RegValue::Single(0xDEAD_BEEF)
        );
    }

    #[test]
    fn unwritten_registers_read_as_zero() {
        let mut agent = Agent::new(SimBackend::new());
        assert_eq!(agent.get(RegId::Midr).unwrap(), RegValue::Single(0));
    }

    #[test]
    fn pair_write_then_read_preserves_both_halves() {
        let mut agent = agent_with_pac();
        let key = RegPair {
            high: 0x0123_4567_89AB_CDEF,
            low: 0xFEDC_BA98_7654_3210,
        };
        agent.set(RegId::ApiaKey, RegValue::Pair(key)).unwrap();
        assert_eq!(agent.get(RegId::ApiaKey).unwrap(), RegValue::Pair(key));

        // The two halves land in two distinct architectural registers.
        let (high, low) = RegId::ApiaKey.descriptor().pair_encodings().unwrap();
        assert_eq!(agent.backend().peek(high), Some(key.high));
        assert_eq!(agent.backend().peek(low), Some(key.low));
    }

    #[test]
    fn read_only_writes_are_rejected_and_leave_the_store_untouched() {
        let mut agent = Agent::new(SimBackend::new());
        for id in RegId::ALL.iter().filter(|id| !id.is_writable()) {
            let err = agent.set(*id, RegValue::Single(1)).unwrap_err();
            assert_eq!(
                err,
                SysregError::UnsupportedOperation {
                    id: *id,
                    reason: UnsupportedReason::ReadOnly,
                }
            );
            let encoding = id.descriptor().single_encoding().unwrap();
            assert_eq!(agent.backend().peek(encoding), None);
        }
    }

    #[test]
    fn cardinality_mismatches_are_rejected() {
        let mut agent = agent_with_pac();
        let err = agent.set(RegId::TpidrEl0, RegValue::Pair(RegPair::default()));
        assert_eq!(
            err,
            Err(SysregError::UnsupportedOperation {
                id: RegId::TpidrEl0,
                reason: UnsupportedReason::Cardinality,
            })
        );

        let err = agent.set(RegId::ApiaKey, RegValue::Single(0));
        assert_eq!(
            err,
            Err(SysregError::UnsupportedOperation {
                id: RegId::ApiaKey,
                reason: UnsupportedReason::Cardinality,
            })
        );
    }

    #[test]
    fn key_pairs_are_gated_on_pointer_auth() {
        let mut agent = Agent::new(SimBackend::new());
        for id in RegId::ALL.iter().filter(|id| id.is_pair()) {
            assert_eq!(
                agent.get(*id),
                Err(SysregError::ArchitectureMismatch { id: *id })
            );
            assert_eq!(
                agent.set(*id, RegValue::Pair(RegPair::default())),
                Err(SysregError::ArchitectureMismatch { id: *id })
            );
        }
    }

    #[test]
    fn generic_key_needs_the_generic_auth_field() {
        // Address auth present, generic auth absent.
        let mut backend = SimBackend::new();
        backend.preload(ISAR1, 0x0000_0010);
        let mut agent = Agent::new(backend);

        assert!(agent.get(RegId::ApiaKey).is_ok());
        assert_eq!(
            agent.get(RegId::ApgaKey),
            Err(SysregError::ArchitectureMismatch { id: RegId::ApgaKey })
        );

        // And the converse: generic auth alone does not open the four
        // address-auth key pairs.
        let mut backend = SimBackend::new();
        backend.preload(ISAR1, 0x0100_0000);
        let mut agent = Agent::new(backend);
        assert!(agent.get(RegId::ApgaKey).is_ok());
        assert_eq!(
            agent.get(RegId::ApdaKey),
            Err(SysregError::ArchitectureMismatch { id: RegId::ApdaKey })
        );
    }

    #[test]
    fn id_register_snapshot_reads_through_the_backend() {
        let mut agent = agent_with_pac();
        let id = agent.id_registers().unwrap();
        assert!(id.has_pointer_auth());
        assert!(id.has_generic_pointer_auth());
        assert!(!id.has_branch_target_id());
    }

    #[test]
    fn device_requests_roundtrip_through_the_command_parser() {
        let mut agent = Agent::new(SimBackend::new());

        let mut payload = 0x1122_3344_5566_7788u64.to_le_bytes();
        agent
            .serve_device(DeviceCode::set(RegId::ScxtnumEl1), &mut payload)
            .unwrap();

        let mut read_back = [0u8; 8];
        agent
            .serve_device(DeviceCode::get(RegId::ScxtnumEl1), &mut read_back)
            .unwrap();
        assert_eq!(u64::from_le_bytes(read_back), 0x1122_3344_5566_7788);
    }

    #[test]
    fn device_requests_with_foreign_codes_are_unknown() {
        let mut agent = Agent::new(SimBackend::new());
        let mut payload = [0u8; 8];
        assert_eq!(
            agent.serve_device(0x8008_AB00, &mut payload),
            Err(SysregError::UnknownRegister { raw: 0x8008_AB00 })
        );
    }

    #[test]
    fn payload_length_must_match_the_register_width() {
        let mut agent = Agent::new(SimBackend::new());
        let mut short = [0u8; 4];
        assert_eq!(
            agent.serve_device(DeviceCode::get(RegId::Midr), &mut short),
            Err(SysregError::UnsupportedOperation {
                id: RegId::Midr,
                reason: UnsupportedReason::PayloadSize,
            })
        );

        let mut single_sized = [0u8; 8];
        assert_eq!(
            agent.serve_socket_get(0x00AC_0100, &mut single_sized),
            Err(SysregError::UnsupportedOperation {
                id: RegId::ApiaKey,
                reason: UnsupportedReason::PayloadSize,
            })
        );
    }

    #[test]
    fn socket_requests_share_the_dispatch_policy() {
        let mut agent = Agent::new(SimBackend::new());

        let payload = [0u8; 8];
        assert_eq!(
            agent.serve_socket_set(0x00AC_0000, &payload),
            Err(SysregError::UnsupportedOperation {
                id: RegId::Aa64Pfr0,
                reason: UnsupportedReason::ReadOnly,
            })
        );

        let mut isar1 = [0u8; 8];
        agent.serve_socket_get(0x00AC_0003, &mut isar1).unwrap();
        assert_eq!(u64::from_le_bytes(isar1), 0);

        assert_eq!(
            agent.serve_socket_get(0x00AC_0010, &mut isar1),
            Err(SysregError::UnknownRegister { raw: 0x00AC_0010 })
        );
    }

    struct FailingBackend;

    impl SysregBackend for FailingBackend {
        fn read(&mut self, _encoding: SysregEncoding) -> Result<u64, BackendError> {
            Err(BackendError::ReadFailed)
        }

        fn write(&mut self, _encoding: SysregEncoding, _value: u64) -> Result<(), BackendError> {
            Err(BackendError::WriteFailed)
        }
    }

    #[test]
    fn backend_failures_surface_through_dispatch() {
        let mut agent = Agent::new(FailingBackend);
        assert_eq!(
            agent.get(RegId::Midr),
            Err(SysregError::Backend(BackendError::ReadFailed))
        );
        assert_eq!(
            agent.set(RegId::TpidrEl0, RegValue::Single(0)),
            Err(SysregError::Backend(BackendError::WriteFailed))
        );
    }
}
