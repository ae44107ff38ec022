//! Feature predicates over the AArch64 ID registers.
//!
//! Pure bitfield decodes of register values already in hand; nothing here
//! touches hardware. Field positions follow the Arm ARM definitions of
//! `ID_AA64PFR0_EL1`, `ID_AA64PFR1_EL1`, `ID_AA64ISAR1_EL1` and
//! `ID_AA64ISAR2_EL1`.

// ISAR1 carries APA/API (address auth) and GPA/GPI (generic auth); ISAR2
// carries the QARMA3 forms APA3 and GPA3.
const ISAR1_ADDRESS_AUTH_MASK: u64 = 0x0000_0FF0;
const ISAR2_ADDRESS_AUTH_MASK: u64 = 0x0000_F000;
const ISAR1_GENERIC_AUTH_MASK: u64 = 0xFF00_0000;
const ISAR2_GENERIC_AUTH_MASK: u64 = 0x0000_0F00;

const PFR1_BT_MASK: u64 = 0x0000_000F;
const PFR0_RME_SHIFT: u32 = 52;
const PFR0_RME_MASK: u64 = 0xF << PFR0_RME_SHIFT;
const PFR0_CSV2_SHIFT: u32 = 56;

/// Returns `true` when address pointer authentication (the `PACI*`/`AUTI*`
/// instructions and the IA/IB/DA/DB key registers) is implemented, in any
/// of its algorithm variants.
#[must_use]
pub const fn has_pointer_auth(isar1: u64, isar2: u64) -> bool {
    isar1 & ISAR1_ADDRESS_AUTH_MASK != 0 || isar2 & ISAR2_ADDRESS_AUTH_MASK != 0
}

/// Returns `true` when generic pointer authentication (`PACGA` and the GA
/// key register) is implemented, in any of its algorithm variants.
#[must_use]
pub const fn has_generic_pointer_auth(isar1: u64, isar2: u64) -> bool {
    isar1 & ISAR1_GENERIC_AUTH_MASK != 0 || isar2 & ISAR2_GENERIC_AUTH_MASK != 0
}

/// Returns `true` when branch target identification (BTI) is implemented.
#[must_use]
pub const fn has_branch_target_id(pfr1: u64) -> bool {
    pfr1 & PFR1_BT_MASK != 0
}

/// Returns `true` when the realm management extension (RME) is implemented.
#[must_use]
pub const fn has_realm_management(pfr0: u64) -> bool {
    pfr0 & PFR0_RME_MASK != 0
}

/// Implemented RME version, 0 when absent.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn realm_management_version(pfr0: u64) -> u8 {
    ((pfr0 >> PFR0_RME_SHIFT) & 0xF) as u8
}

/// Returns `true` when the CSV2 field reports at least version 2, the
/// level that makes the `SCXTNUM_*` registers architecturally meaningful.
#[must_use]
pub const fn has_speculation_barrier_v2p2(pfr0: u64) -> bool {
    (pfr0 >> PFR0_CSV2_SHIFT) & 0xF >= 2
}

/// Snapshot of the ID registers the feature predicates consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IdRegisters {
    /// `ID_AA64PFR0_EL1` value.
    pub pfr0: u64,
    /// `ID_AA64PFR1_EL1` value.
    pub pfr1: u64,
    /// `ID_AA64ISAR1_EL1` value.
    pub isar1: u64,
    /// `ID_AA64ISAR2_EL1` value.
    pub isar2: u64,
}

impl IdRegisters {
    /// Address pointer authentication support.
    #[must_use]
    pub const fn has_pointer_auth(&self) -> bool {
        has_pointer_auth(self.isar1, self.isar2)
    }

    /// Generic pointer authentication (`PACGA`) support.
    #[must_use]
    pub const fn has_generic_pointer_auth(&self) -> bool {
        has_generic_pointer_auth(self.isar1, self.isar2)
    }

    /// Branch target identification support.
    #[must_use]
    pub const fn has_branch_target_id(&self) -> bool {
        has_branch_target_id(self.pfr1)
    }

    /// Realm management extension support.
    #[must_use]
    pub const fn has_realm_management(&self) -> bool {
        has_realm_management(self.pfr0)
    }

    /// Implemented RME version, 0 when absent.
    #[must_use]
    pub const fn realm_management_version(&self) -> u8 {
        realm_management_version(self.pfr0)
    }

    /// CSV2 at version 2 or later.
    #[must_use]
    pub const fn has_speculation_barrier_v2p2(&self) -> bool {
        has_speculation_barrier_v2p2(self.pfr0)
    }
}
