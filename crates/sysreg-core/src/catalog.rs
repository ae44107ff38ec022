//! Logical register catalog.
//!
//! Every register the protocol can address appears exactly once in
//! [`REGISTER_CATALOG`]. Logical IDs are wire-stable: singles occupy
//! `0x0000..=0x00FF`, 128-bit pairs occupy `0x0100..=0x01FF`, and telling
//! the ranges apart is one bit test on the raw value. Pair halves are two
//! distinct architectural registers; their catalog entry carries both
//! encodings, high half first.

use crate::insn::SysregEncoding;

/// First logical ID of the single-register range.
pub const SINGLE_RANGE_BASE: u16 = 0x0000;

/// First logical ID of the pair range; doubles as the range-membership mask.
pub const PAIR_RANGE_BASE: u16 = 0x0100;

/// Populated single-register entries.
pub const SINGLE_REGISTER_COUNT: usize = 16;

/// Populated pair-register entries.
pub const PAIR_REGISTER_COUNT: usize = 5;

/// Logical register IDs exposed on the wire.
///
/// Discriminants are the stable wire values; the enum never renumbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
#[allow(missing_docs)]
pub enum RegId {
    Aa64Pfr0 = 0x0000,
    Aa64Pfr1 = 0x0001,
    Aa64Isar0 = 0x0002,
    Aa64Isar1 = 0x0003,
    Aa64Isar2 = 0x0004,
    Tcr = 0x0005,
    Midr = 0x0006,
    Mpidr = 0x0007,
    Revidr = 0x0008,
    TpidrroEl0 = 0x0009,
    TpidrEl0 = 0x000A,
    TpidrEl1 = 0x000B,
    ScxtnumEl0 = 0x000C,
    ScxtnumEl1 = 0x000D,
    ContextidrEl1 = 0x000E,
    Sctlr = 0x000F,
    ApiaKey = 0x0100,
    ApibKey = 0x0101,
    ApdaKey = 0x0102,
    ApdbKey = 0x0103,
    ApgaKey = 0x0104,
}

/// Access mode a register supports through the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Access {
    /// Register rejects writes.
    ReadOnly,
    /// Register accepts reads and writes.
    ReadWrite,
}

/// Value width class of a logical register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Cardinality {
    /// One 64-bit value.
    Single,
    /// One 128-bit value moved as two 64-bit halves.
    Pair,
}

impl Cardinality {
    /// Payload size in bytes for a value of this cardinality.
    #[must_use]
    pub const fn byte_len(self) -> usize {
        match self {
            Self::Single => 8,
            Self::Pair => 16,
        }
    }
}

/// Architectural encodings backing a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RegEncoding {
    /// One 64-bit register.
    Single(SysregEncoding),
    /// High and low halves of a 128-bit value.
    Pair {
        /// Encoding of the high half.
        high: SysregEncoding,
        /// Encoding of the low half.
        low: SysregEncoding,
    },
}

/// One catalog row: identity, canonical name, access mode and encodings.
///
/// Rows are static data; they are never deserialized, so the `serde`
/// feature leaves them alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegDescriptor {
    /// Logical ID of the entry.
    pub id: RegId,
    /// Canonical lower-case architectural name.
    pub name: &'static str,
    /// Access mode the protocol grants.
    pub access: Access,
    /// MRS/MSR encoding(s) of the entry.
    pub encoding: RegEncoding,
}

impl RegDescriptor {
    const fn single(id: RegId, name: &'static str, access: Access, enc: SysregEncoding) -> Self {
        Self {
            id,
            name,
            access,
            encoding: RegEncoding::Single(enc),
        }
    }

    const fn pair(
        id: RegId,
        name: &'static str,
        high: SysregEncoding,
        low: SysregEncoding,
    ) -> Self {
        Self {
            id,
            name,
            access: Access::ReadWrite,
            encoding: RegEncoding::Pair { high, low },
        }
    }

    /// Returns the encoding of a single-width entry.
    #[must_use]
    pub const fn single_encoding(&self) -> Option<SysregEncoding> {
        match self.encoding {
            RegEncoding::Single(enc) => Some(enc),
            RegEncoding::Pair { .. } => None,
        }
    }

    /// Returns `(high, low)` encodings of a pair entry.
    #[must_use]
    pub const fn pair_encodings(&self) -> Option<(SysregEncoding, SysregEncoding)> {
        match self.encoding {
            RegEncoding::Single(_) => None,
            RegEncoding::Pair { high, low } => Some((high, low)),
        }
    }
}

/// Single source-of-truth register catalog, ordered by logical ID.
///
/// Any ID not present here is unknown by definition.
pub const REGISTER_CATALOG: &[RegDescriptor] = &[
    RegDescriptor::single(
        RegId::Aa64Pfr0,
        "id_aa64pfr0_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 4, 0),
    ),
    RegDescriptor::single(
        RegId::Aa64Pfr1,
        "id_aa64pfr1_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 4, 1),
    ),
    RegDescriptor::single(
        RegId::Aa64Isar0,
        "id_aa64isar0_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 6, 0),
    ),
    RegDescriptor::single(
        RegId::Aa64Isar1,
        "id_aa64isar1_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 6, 1),
    ),
    RegDescriptor::single(
        RegId::Aa64Isar2,
        "id_aa64isar2_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 6, 2),
    ),
    RegDescriptor::single(
        RegId::Tcr,
        "tcr_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 2, 0, 2),
    ),
    RegDescriptor::single(
        RegId::Midr,
        "midr_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 0, 0),
    ),
    RegDescriptor::single(
        RegId::Mpidr,
        "mpidr_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 0, 5),
    ),
    RegDescriptor::single(
        RegId::Revidr,
        "revidr_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 0, 0, 6),
    ),
    RegDescriptor::single(
        RegId::TpidrroEl0,
        "tpidrro_el0",
        Access::ReadOnly,
        SysregEncoding::new(3, 3, 13, 0, 3),
    ),
    RegDescriptor::single(
        RegId::TpidrEl0,
        "tpidr_el0",
        Access::ReadWrite,
        SysregEncoding::new(3, 3, 13, 0, 2),
    ),
    RegDescriptor::single(
        RegId::TpidrEl1,
        "tpidr_el1",
        Access::ReadWrite,
        SysregEncoding::new(3, 0, 13, 0, 4),
    ),
    RegDescriptor::single(
        RegId::ScxtnumEl0,
        "scxtnum_el0",
        Access::ReadWrite,
        SysregEncoding::new(3, 3, 13, 0, 7),
    ),
    RegDescriptor::single(
        RegId::ScxtnumEl1,
        "scxtnum_el1",
        Access::ReadWrite,
        SysregEncoding::new(3, 0, 13, 0, 7),
    ),
    RegDescriptor::single(
        RegId::ContextidrEl1,
        "contextidr_el1",
        Access::ReadWrite,
        SysregEncoding::new(3, 0, 13, 0, 1),
    ),
    RegDescriptor::single(
        RegId::Sctlr,
        "sctlr_el1",
        Access::ReadOnly,
        SysregEncoding::new(3, 0, 1, 0, 0),
    ),
    RegDescriptor::pair(
        RegId::ApiaKey,
        "apiakey_el1",
        SysregEncoding::new(3, 0, 2, 1, 1),
        SysregEncoding::new(3, 0, 2, 1, 0),
    ),
    RegDescriptor::pair(
        RegId::ApibKey,
        "apibkey_el1",
        SysregEncoding::new(3, 0, 2, 1, 3),
        SysregEncoding::new(3, 0, 2, 1, 2),
    ),
    RegDescriptor::pair(
        RegId::ApdaKey,
        "apdakey_el1",
        SysregEncoding::new(3, 0, 2, 2, 1),
        SysregEncoding::new(3, 0, 2, 2, 0),
    ),
    RegDescriptor::pair(
        RegId::ApdbKey,
        "apdbkey_el1",
        SysregEncoding::new(3, 0, 2, 2, 3),
        SysregEncoding::new(3, 0, 2, 2, 2),
    ),
    RegDescriptor::pair(
        RegId::ApgaKey,
        "apgakey_el1",
        SysregEncoding::new(3, 0, 2, 3, 1),
        SysregEncoding::new(3, 0, 2, 3, 0),
    ),
];

impl RegId {
    /// Every populated ID, singles first, in catalog order.
    pub const ALL: &'static [Self] = &[
        Self::Aa64Pfr0,
        Self::Aa64Pfr1,
        Self::Aa64Isar0,
        Self::Aa64Isar1,
        Self::Aa64Isar2,
        Self::Tcr,
        Self::Midr,
        Self::Mpidr,
        Self::Revidr,
        Self::TpidrroEl0,
        Self::TpidrEl0,
        Self::TpidrEl1,
        Self::ScxtnumEl0,
        Self::ScxtnumEl1,
        Self::ContextidrEl1,
        Self::Sctlr,
        Self::ApiaKey,
        Self::ApibKey,
        Self::ApdaKey,
        Self::ApdbKey,
        Self::ApgaKey,
    ];

    /// Resolves a raw wire value into a populated ID.
    ///
    /// `None` means the value is outside the catalog, including raw values
    /// inside a range but beyond its populated prefix.
    #[must_use]
    pub const fn from_u16(raw: u16) -> Option<Self> {
        match raw {
            0x0000 => Some(Self::Aa64Pfr0),
            0x0001 => Some(Self::Aa64Pfr1),
            0x0002 => Some(Self::Aa64Isar0),
            0x0003 => Some(Self::Aa64Isar1),
            0x0004 => Some(Self::Aa64Isar2),
            0x0005 => Some(Self::Tcr),
            0x0006 => Some(Self::Midr),
            0x0007 => Some(Self::Mpidr),
            0x0008 => Some(Self::Revidr),
            0x0009 => Some(Self::TpidrroEl0),
            0x000A => Some(Self::TpidrEl0),
            0x000B => Some(Self::TpidrEl1),
            0x000C => Some(Self::ScxtnumEl0),
            0x000D => Some(Self::ScxtnumEl1),
            0x000E => Some(Self::ContextidrEl1),
            0x000F => Some(Self::Sctlr),
            0x0100 => Some(Self::ApiaKey),
            0x0101 => Some(Self::ApibKey),
            0x0102 => Some(Self::ApdaKey),
            0x0103 => Some(Self::ApdbKey),
            0x0104 => Some(Self::ApgaKey),
            _ => None,
        }
    }

    /// Raw wire value of the ID.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Width class, decided by range arithmetic on the raw value alone.
    #[must_use]
    pub const fn cardinality(self) -> Cardinality {
        if self as u16 & PAIR_RANGE_BASE == 0 {
            Cardinality::Single
        } else {
            Cardinality::Pair
        }
    }

    /// Returns `true` for IDs in the 128-bit pair range.
    #[must_use]
    pub const fn is_pair(self) -> bool {
        matches!(self.cardinality(), Cardinality::Pair)
    }

    /// Offset of the ID within its range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn relative_index(self) -> u8 {
        (self as u16 & 0x00FF) as u8
    }

    /// Catalog row for the ID.
    #[must_use]
    pub const fn descriptor(self) -> &'static RegDescriptor {
        let raw = self as u16;
        let idx = if raw & PAIR_RANGE_BASE == 0 {
            raw as usize
        } else {
            SINGLE_REGISTER_COUNT + (raw & 0x00FF) as usize
        };
        &REGISTER_CATALOG[idx]
    }

    /// Canonical lower-case architectural name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Access mode the protocol grants.
    #[must_use]
    pub const fn access(self) -> Access {
        self.descriptor().access
    }

    /// Returns `true` when the protocol accepts writes to the register.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self.access(), Access::ReadWrite)
    }

    /// Resolves a canonical name (ASCII case-insensitive) into an ID.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTER_CATALOG
            .iter()
            .find_map(|entry| entry.name.eq_ignore_ascii_case(name).then_some(entry.id))
    }
}

/// A 128-bit value carried as two 64-bit halves, high half first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegPair {
    /// High 64 bits.
    pub high: u64,
    /// Low 64 bits.
    pub low: u64,
}

impl RegPair {
    /// Serializes as the wire layout: high half little-endian, then low.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 16] {
        let high = self.high.to_le_bytes();
        let low = self.low.to_le_bytes();
        let mut out = [0u8; 16];
        let mut i = 0;
        while i < 8 {
            out[i] = high[i];
            out[i + 8] = low[i];
            i += 1;
        }
        out
    }

    /// Deserializes from the wire layout produced by [`Self::to_le_bytes`].
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut high = [0u8; 8];
        let mut low = [0u8; 8];
        let mut i = 0;
        while i < 8 {
            high[i] = bytes[i];
            low[i] = bytes[i + 8];
            i += 1;
        }
        Self {
            high: u64::from_le_bytes(high),
            low: u64::from_le_bytes(low),
        }
    }
}

/// A register value of either width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RegValue {
    /// 64-bit value.
    Single(u64),
    /// 128-bit value.
    Pair(RegPair),
}

impl RegValue {
    /// Width class of the carried value.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        match self {
            Self::Single(_) => Cardinality::Single,
            Self::Pair(_) => Cardinality::Pair,
        }
    }

    /// Returns the 64-bit value, if the width class matches.
    #[must_use]
    pub const fn as_single(&self) -> Option<u64> {
        match self {
            Self::Single(value) => Some(*value),
            Self::Pair(_) => None,
        }
    }

    /// Returns the 128-bit value, if the width class matches.
    #[must_use]
    pub const fn as_pair(&self) -> Option<RegPair> {
        match self {
            Self::Single(_) => None,
            Self::Pair(pair) => Some(*pair),
        }
    }
}
