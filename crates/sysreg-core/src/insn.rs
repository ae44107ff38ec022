//! MRS/MSR instruction-word construction.
//!
//! The five operand fields (`op0`, `op1`, `CRn`, `CRm`, `op2`) identify a
//! system register; ORed with a template and a target GPR index they form a
//! complete A64 instruction word. Packing lives here and nowhere else, so
//! backends that forge `.inst` words and tests that compare against
//! assembler output both consume the same bits.

/// `MSR (register)` template with all operand fields zero.
pub const MSR_TEMPLATE: u32 = 0xD500_0000;

/// `MRS` template with all operand fields zero.
pub const MRS_TEMPLATE: u32 = 0xD520_0000;

/// `Rt` field value naming the zero register (`xzr`).
pub const GPR_ZERO_INDEX: u8 = 31;

/// Operand fields of an MRS/MSR system-register encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SysregEncoding {
    /// `op0` field (2 bits).
    pub op0: u8,
    /// `op1` field (3 bits).
    pub op1: u8,
    /// `CRn` field (4 bits).
    pub crn: u8,
    /// `CRm` field (4 bits).
    pub crm: u8,
    /// `op2` field (3 bits).
    pub op2: u8,
}

impl SysregEncoding {
    /// Builds an encoding from the five operand fields.
    #[must_use]
    pub const fn new(op0: u8, op1: u8, crn: u8, crm: u8, op2: u8) -> Self {
        Self {
            op0,
            op1,
            crn,
            crm,
            op2,
        }
    }

    /// Packs the fields into instruction-word position: `op0` at bits
    /// 19..=20, `op1` at 16..=18, `CRn` at 12..=15, `CRm` at 8..=11 and
    /// `op2` at 5..=7.
    ///
    /// Fields are masked to their architectural widths, so the result never
    /// strays outside the operand bits.
    #[must_use]
    pub const fn sreg(self) -> u32 {
        ((self.op0 as u32 & 0x3) << 19)
            | ((self.op1 as u32 & 0x7) << 16)
            | ((self.crn as u32 & 0xF) << 12)
            | ((self.crm as u32 & 0xF) << 8)
            | ((self.op2 as u32 & 0x7) << 5)
    }

    /// Recovers the operand fields from instruction-word position.
    ///
    /// Bits outside the operand fields are ignored, so a full MRS/MSR word
    /// unpacks the same way as a bare `sreg` value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_sreg(word: u32) -> Self {
        Self {
            op0: ((word >> 19) & 0x3) as u8,
            op1: ((word >> 16) & 0x7) as u8,
            crn: ((word >> 12) & 0xF) as u8,
            crm: ((word >> 8) & 0xF) as u8,
            op2: ((word >> 5) & 0x7) as u8,
        }
    }
}

/// Forges the `MRS xRt, <sysreg>` instruction word reading into GPR `rt`.
#[must_use]
pub const fn mrs_word(encoding: SysregEncoding, rt: u8) -> u32 {
    MRS_TEMPLATE | encoding.sreg() | (rt as u32 & 0x1F)
}

/// Forges the `MSR <sysreg>, xRt` instruction word writing from GPR `rt`.
#[must_use]
pub const fn msr_word(encoding: SysregEncoding, rt: u8) -> u32 {
    MSR_TEMPLATE | encoding.sreg() | (rt as u32 & 0x1F)
}
