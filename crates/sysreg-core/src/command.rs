//! Client↔agent command-code derivation.
//!
//! Both transports derive codes from logical IDs by pure arithmetic. The
//! same expressions serve the requesting client and the parsing agent, so
//! the mapping cannot drift between the two sides. Range capacity is
//! enforced right here with `const` assertions: a catalog that outgrows its
//! command-number space fails to build instead of failing a request.

use crate::catalog::{
    Cardinality, RegId, PAIR_RANGE_BASE, PAIR_REGISTER_COUNT, SINGLE_REGISTER_COUNT,
};

/// Request direction as seen from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Agent reads the register and returns the value.
    Get,
    /// Agent writes the value supplied by the client.
    Set,
}

/// Command magic byte of the device-node transport.
pub const DEVICE_MAGIC: u8 = 0xF0;

/// `nr` slots owned by each range on the device-node transport.
pub const DEVICE_RANGE_CAPACITY: usize = 0x80;

/// Option-value base of the control-socket transport.
pub const SOCKET_OPTION_BASE: u32 = 0x00AC_0000;

const DIR_SHIFT: u32 = 30;
const SIZE_SHIFT: u32 = 16;
const MAGIC_SHIFT: u32 = 8;
const SIZE_FIELD_MASK: u32 = 0x3FFF;

// Direction values of the classic ioctl layout: "read" moves data from the
// agent to the client, "write" the other way.
const DIR_GET: u32 = 2;
const DIR_SET: u32 = 1;

// Pair entries sit in the upper half of the 8-bit `nr` space.
const PAIR_NR_BASE: u8 = 0x80;

// Options one 16-bit page above the base belong to somebody else.
const SOCKET_PAGE_LIMIT: u32 = SOCKET_OPTION_BASE + 0x0001_0000;

const _: () = assert!(SINGLE_REGISTER_COUNT <= DEVICE_RANGE_CAPACITY);
const _: () = assert!(PAIR_REGISTER_COUNT <= DEVICE_RANGE_CAPACITY);
const _: () = {
    let highest_id = (PAIR_RANGE_BASE as usize) + PAIR_REGISTER_COUNT;
    assert!(highest_id <= (SOCKET_PAGE_LIMIT - SOCKET_OPTION_BASE) as usize);
};

const fn size_field(cardinality: Cardinality) -> u32 {
    match cardinality {
        Cardinality::Single => 8,
        Cardinality::Pair => 16,
    }
}

/// Device-node transport codes (`ioctl` style).
///
/// Layout: direction (2 bits at 30), payload size (14 bits at 16), magic
/// byte (8 bits at 8), command number (8 bits at 0). Singles use their
/// relative index as the command number; pairs use the upper half of the
/// number space at `0x80 + index`.
pub struct DeviceCode;

impl DeviceCode {
    /// Code for reading a register over the device transport.
    #[must_use]
    pub const fn get(id: RegId) -> u32 {
        Self::code(DIR_GET, id)
    }

    /// Code for writing a register over the device transport.
    #[must_use]
    pub const fn set(id: RegId) -> u32 {
        Self::code(DIR_SET, id)
    }

    const fn code(dir: u32, id: RegId) -> u32 {
        let nr = match id.cardinality() {
            Cardinality::Single => id.relative_index(),
            Cardinality::Pair => PAIR_NR_BASE + id.relative_index(),
        };
        (dir << DIR_SHIFT)
            | (size_field(id.cardinality()) << SIZE_SHIFT)
            | ((DEVICE_MAGIC as u32) << MAGIC_SHIFT)
            | nr as u32
    }

    /// Recovers direction and register from a device transport code.
    ///
    /// `None` for foreign magic bytes, unknown directions, command numbers
    /// outside the populated catalog, and size fields that do not match the
    /// register's width.
    #[must_use]
    pub const fn parse(code: u32) -> Option<(Direction, RegId)> {
        if (code >> MAGIC_SHIFT) & 0xFF != DEVICE_MAGIC as u32 {
            return None;
        }

        let direction = match code >> DIR_SHIFT {
            DIR_GET => Direction::Get,
            DIR_SET => Direction::Set,
            _ => return None,
        };

        let nr = code & 0xFF;
        let raw_id = if nr & (PAIR_NR_BASE as u32) == 0 {
            (nr & 0x7F) as u16
        } else {
            PAIR_RANGE_BASE | ((nr & 0x7F) as u16)
        };
        let id = match RegId::from_u16(raw_id) {
            Some(id) => id,
            None => return None,
        };

        if (code >> SIZE_SHIFT) & SIZE_FIELD_MASK != size_field(id.cardinality()) {
            return None;
        }

        Some((direction, id))
    }
}

/// Control-socket transport codes (system-control style).
///
/// One option value per register at `base + logical ID`; the disjoint ID
/// ranges keep options collision-free without per-direction bases.
/// Direction is carried by which of the two symmetric socket calls is used,
/// never by the option value.
pub struct SocketCode;

impl SocketCode {
    /// Option value addressing a register on the control socket.
    #[must_use]
    pub const fn option(id: RegId) -> u32 {
        SOCKET_OPTION_BASE + id.as_u16() as u32
    }

    /// Recovers the register from a control-socket option value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn parse(option: u32) -> Option<RegId> {
        if option < SOCKET_OPTION_BASE || option >= SOCKET_PAGE_LIMIT {
            return None;
        }
        RegId::from_u16((option - SOCKET_OPTION_BASE) as u16)
    }
}
