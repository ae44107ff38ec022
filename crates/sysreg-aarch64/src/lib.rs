//! Hardware MRS/MSR backend for the sysreg protocol core.
//!
//! Everything here executes real system-register instructions and is only
//! meaningful at EL1; running the accessors from user mode traps. The crate
//! compiles to an empty library on other architectures so the workspace
//! builds everywhere.
//!
//! Two access strategies, both producing the same architectural effect:
//!
//! * symbolic — `mrs`/`msr` with the register's name, for registers every
//!   assembler recognises;
//! * numeric — a forged `.inst` word built from the packed operand fields,
//!   for registers (the pointer-authentication key halves) whose names older
//!   assemblers reject at the configured architecture level.
//!
//! The numeric strategy cannot know which general-purpose register the
//! compiler will allocate, so each forged instruction first emits an `.irp`
//! block defining a symbol per GPR name (`x0..x30`, `w0..w30`, plus the
//! zero-register aliases) equal to its 5-bit index, then lets the assembler
//! substitute the allocated register's name into that lookup.

#![cfg_attr(not(target_arch = "aarch64"), allow(unused))]

#[cfg(target_arch = "aarch64")]
pub use backend::HwBackend;

pub use sysreg_core::insn::{MRS_TEMPLATE, MSR_TEMPLATE};

/// Reads a system register by architectural name.
///
/// The name must be recognised by the assembler at the configured target
/// architecture level; an unknown name is a build failure, never a runtime
/// one.
#[cfg(target_arch = "aarch64")]
#[macro_export]
macro_rules! read_sysreg {
    ($name:literal) => {{
        let value: u64;
        unsafe {
            ::core::arch::asm!(
                concat!("mrs {value}, ", $name),
                value = out(reg) value,
                options(nomem, nostack, preserves_flags),
            );
        }
        value
    }};
}

/// Writes a system register by architectural name.
#[cfg(target_arch = "aarch64")]
#[macro_export]
macro_rules! write_sysreg {
    ($name:literal, $value:expr) => {{
        let value: u64 = $value;
        unsafe {
            ::core::arch::asm!(
                concat!("msr ", $name, ", {value}"),
                value = in(reg) value,
                options(nomem, nostack, preserves_flags),
            );
        }
    }};
}

/// Reads a system register through a forged `MRS` instruction word.
///
/// `$enc` must be a `const` [`sysreg_core::SysregEncoding`]. The forged word
/// is bit-identical to what the symbolic form would assemble to whenever the
/// assembler accepts both.
#[cfg(target_arch = "aarch64")]
#[macro_export]
macro_rules! read_sysreg_num {
    ($enc:expr) => {{
        let value: u64;
        unsafe {
            ::core::arch::asm!(
                ".irp num,0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20,21,22,23,24,25,26,27,28,29,30",
                ".equ .sysreg_gpr_x\\num, \\num",
                ".equ .sysreg_gpr_w\\num, \\num",
                ".endr",
                ".equ .sysreg_gpr_xzr, 31",
                ".equ .sysreg_gpr_wzr, 31",
                ".inst {template} | ({sreg}) | (.sysreg_gpr_{value})",
                template = const $crate::MRS_TEMPLATE,
                sreg = const ($enc).sreg(),
                value = out(reg) value,
                options(nomem, nostack, preserves_flags),
            );
        }
        value
    }};
}

/// Writes a system register through a forged `MSR` instruction word.
#[cfg(target_arch = "aarch64")]
#[macro_export]
macro_rules! write_sysreg_num {
    ($enc:expr, $value:expr) => {{
        let value: u64 = $value;
        unsafe {
            ::core::arch::asm!(
                ".irp num,0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20,21,22,23,24,25,26,27,28,29,30",
                ".equ .sysreg_gpr_x\\num, \\num",
                ".equ .sysreg_gpr_w\\num, \\num",
                ".endr",
                ".equ .sysreg_gpr_xzr, 31",
                ".equ .sysreg_gpr_wzr, 31",
                ".inst {template} | ({sreg}) | (.sysreg_gpr_{value})",
                template = const $crate::MSR_TEMPLATE,
                sreg = const ($enc).sreg(),
                value = in(reg) value,
                options(nomem, nostack, preserves_flags),
            );
        }
    }};
}

#[cfg(target_arch = "aarch64")]
mod backend {
    use sysreg_core::{BackendError, RegId, SysregBackend, SysregEncoding};

    const fn single_sreg(id: RegId) -> u32 {
        match id.descriptor().single_encoding() {
            Some(encoding) => encoding.sreg(),
            None => panic!("not a single-width register"),
        }
    }

    const fn pair_high(id: RegId) -> SysregEncoding {
        match id.descriptor().pair_encodings() {
            Some((high, _)) => high,
            None => panic!("not a pair register"),
        }
    }

    const fn pair_low(id: RegId) -> SysregEncoding {
        match id.descriptor().pair_encodings() {
            Some((_, low)) => low,
            None => panic!("not a pair register"),
        }
    }

    const SREG_PFR0: u32 = single_sreg(RegId::Aa64Pfr0);
    const SREG_PFR1: u32 = single_sreg(RegId::Aa64Pfr1);
    const SREG_ISAR0: u32 = single_sreg(RegId::Aa64Isar0);
    const SREG_ISAR1: u32 = single_sreg(RegId::Aa64Isar1);
    const SREG_ISAR2: u32 = single_sreg(RegId::Aa64Isar2);
    const SREG_TCR: u32 = single_sreg(RegId::Tcr);
    const SREG_MIDR: u32 = single_sreg(RegId::Midr);
    const SREG_MPIDR: u32 = single_sreg(RegId::Mpidr);
    const SREG_REVIDR: u32 = single_sreg(RegId::Revidr);
    const SREG_TPIDRRO_EL0: u32 = single_sreg(RegId::TpidrroEl0);
    const SREG_TPIDR_EL0: u32 = single_sreg(RegId::TpidrEl0);
    const SREG_TPIDR_EL1: u32 = single_sreg(RegId::TpidrEl1);
    const SREG_SCXTNUM_EL0: u32 = single_sreg(RegId::ScxtnumEl0);
    const SREG_SCXTNUM_EL1: u32 = single_sreg(RegId::ScxtnumEl1);
    const SREG_CONTEXTIDR_EL1: u32 = single_sreg(RegId::ContextidrEl1);
    const SREG_SCTLR: u32 = single_sreg(RegId::Sctlr);

    const APIAKEY_HI: SysregEncoding = pair_high(RegId::ApiaKey);
    const APIAKEY_LO: SysregEncoding = pair_low(RegId::ApiaKey);
    const APIBKEY_HI: SysregEncoding = pair_high(RegId::ApibKey);
    const APIBKEY_LO: SysregEncoding = pair_low(RegId::ApibKey);
    const APDAKEY_HI: SysregEncoding = pair_high(RegId::ApdaKey);
    const APDAKEY_LO: SysregEncoding = pair_low(RegId::ApdaKey);
    const APDBKEY_HI: SysregEncoding = pair_high(RegId::ApdbKey);
    const APDBKEY_LO: SysregEncoding = pair_low(RegId::ApdbKey);
    const APGAKEY_HI: SysregEncoding = pair_high(RegId::ApgaKey);
    const APGAKEY_LO: SysregEncoding = pair_low(RegId::ApgaKey);

    const SREG_APIAKEY_HI: u32 = APIAKEY_HI.sreg();
    const SREG_APIAKEY_LO: u32 = APIAKEY_LO.sreg();
    const SREG_APIBKEY_HI: u32 = APIBKEY_HI.sreg();
    const SREG_APIBKEY_LO: u32 = APIBKEY_LO.sreg();
    const SREG_APDAKEY_HI: u32 = APDAKEY_HI.sreg();
    const SREG_APDAKEY_LO: u32 = APDAKEY_LO.sreg();
    const SREG_APDBKEY_HI: u32 = APDBKEY_HI.sreg();
    const SREG_APDBKEY_LO: u32 = APDBKEY_LO.sreg();
    const SREG_APGAKEY_HI: u32 = APGAKEY_HI.sreg();
    const SREG_APGAKEY_LO: u32 = APGAKEY_LO.sreg();

    /// Real-hardware accessor behind the dispatch seam.
    ///
    /// Singles go through the symbolic strategy (all their names predate the
    /// baseline architecture level); key-pair halves go through numeric
    /// forging so the build does not depend on the assembler recognising the
    /// `apiakeyhi_el1` family.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct HwBackend;

    impl SysregBackend for HwBackend {
        #[allow(clippy::too_many_lines)]
        fn read(&mut self, encoding: SysregEncoding) -> Result<u64, BackendError> {
            let value = match encoding.sreg() {
                SREG_PFR0 => read_sysreg!("id_aa64pfr0_el1"),
                SREG_PFR1 => read_sysreg!("id_aa64pfr1_el1"),
                SREG_ISAR0 => read_sysreg!("id_aa64isar0_el1"),
                SREG_ISAR1 => read_sysreg!("id_aa64isar1_el1"),
                SREG_ISAR2 => read_sysreg!("id_aa64isar2_el1"),
                SREG_TCR => read_sysreg!("tcr_el1"),
                SREG_MIDR => read_sysreg!("midr_el1"),
                SREG_MPIDR => read_sysreg!("mpidr_el1"),
                SREG_REVIDR => read_sysreg!("revidr_el1"),
                SREG_TPIDRRO_EL0 => read_sysreg!("tpidrro_el0"),
                SREG_TPIDR_EL0 => read_sysreg!("tpidr_el0"),
                SREG_TPIDR_EL1 => read_sysreg!("tpidr_el1"),
                SREG_SCXTNUM_EL0 => read_sysreg!("scxtnum_el0"),
                SREG_SCXTNUM_EL1 => read_sysreg!("scxtnum_el1"),
                SREG_CONTEXTIDR_EL1 => read_sysreg!("contextidr_el1"),
                SREG_SCTLR => read_sysreg!("sctlr_el1"),
                SREG_APIAKEY_HI => read_sysreg_num!(APIAKEY_HI),
                SREG_APIAKEY_LO => read_sysreg_num!(APIAKEY_LO),
                SREG_APIBKEY_HI => read_sysreg_num!(APIBKEY_HI),
                SREG_APIBKEY_LO => read_sysreg_num!(APIBKEY_LO),
                SREG_APDAKEY_HI => read_sysreg_num!(APDAKEY_HI),
                SREG_APDAKEY_LO => read_sysreg_num!(APDAKEY_LO),
                SREG_APDBKEY_HI => read_sysreg_num!(APDBKEY_HI),
                SREG_APDBKEY_LO => read_sysreg_num!(APDBKEY_LO),
                SREG_APGAKEY_HI => read_sysreg_num!(APGAKEY_HI),
                SREG_APGAKEY_LO => read_sysreg_num!(APGAKEY_LO),
                _ => return Err(BackendError::ReadFailed),
            };
            Ok(value)
        }

        fn write(&mut self, encoding: SysregEncoding, value: u64) -> Result<(), BackendError> {
            match encoding.sreg() {
                SREG_TPIDR_EL0 => write_sysreg!("tpidr_el0", value),
                SREG_TPIDR_EL1 => write_sysreg!("tpidr_el1", value),
                SREG_SCXTNUM_EL0 => write_sysreg!("scxtnum_el0", value),
                SREG_SCXTNUM_EL1 => write_sysreg!("scxtnum_el1", value),
                SREG_CONTEXTIDR_EL1 => write_sysreg!("contextidr_el1", value),
                SREG_APIAKEY_HI => write_sysreg_num!(APIAKEY_HI, value),
                SREG_APIAKEY_LO => write_sysreg_num!(APIAKEY_LO, value),
                SREG_APIBKEY_HI => write_sysreg_num!(APIBKEY_HI, value),
                SREG_APIBKEY_LO => write_sysreg_num!(APIBKEY_LO, value),
                SREG_APDAKEY_HI => write_sysreg_num!(APDAKEY_HI, value),
                SREG_APDAKEY_LO => write_sysreg_num!(APDAKEY_LO, value),
                SREG_APDBKEY_HI => write_sysreg_num!(APDBKEY_HI, value),
                SREG_APDBKEY_LO => write_sysreg_num!(APDBKEY_LO, value),
                SREG_APGAKEY_HI => write_sysreg_num!(APGAKEY_HI, value),
                SREG_APGAKEY_LO => write_sysreg_num!(APGAKEY_LO, value),
                _ => return Err(BackendError::WriteFailed),
            }
            Ok(())
        }
    }
}
