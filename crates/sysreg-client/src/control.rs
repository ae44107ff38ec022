use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use sysreg_core::{RegId, RegValue, SocketCode};

use crate::access::ClientConfig;
use crate::error::ClientError;
use crate::transport::{decode_payload, encode_payload, Transport};

// Not exported by libc: the ioctl resolving a control name to its ID, and
// the kernel-control address/info layouts it works with.
const CTLIOCGINFO: libc::c_ulong = 0xC064_4E03;
const CTL_NAME_LEN: usize = 96;

#[repr(C)]
struct CtlInfo {
    ctl_id: u32,
    ctl_name: [libc::c_char; CTL_NAME_LEN],
}

#[repr(C)]
struct SockaddrCtl {
    sc_len: u8,
    sc_family: u8,
    ss_sysaddr: u16,
    sc_id: u32,
    sc_unit: u32,
    sc_reserved: [u32; 5],
}

/// System control-socket transport to the kernel agent (macOS).
///
/// Direction is carried by which symmetric socket call is used: `getsockopt`
/// reads, `setsockopt` writes. The option value only addresses the register.
#[derive(Debug)]
pub struct ControlTransport {
    socket: OwnedFd,
}

impl ControlTransport {
    /// Connects to the agent's system control socket.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when the control name cannot be resolved
    /// or connected, typically because the kernel extension is not loaded.
    pub fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        let fd = unsafe { libc::socket(libc::AF_SYSTEM, libc::SOCK_DGRAM, libc::SYSPROTO_CONTROL) };
        if fd < 0 {
            return Err(io::Error::last_os_error().into());
        }
        let socket = unsafe { OwnedFd::from_raw_fd(fd) };

        let mut info = CtlInfo {
            ctl_id: 0,
            ctl_name: [0; CTL_NAME_LEN],
        };
        let name = config.control_name.as_bytes();
        if name.len() >= CTL_NAME_LEN {
            return Err(io::Error::from(io::ErrorKind::InvalidInput).into());
        }
        for (slot, byte) in info.ctl_name.iter_mut().zip(name) {
            *slot = *byte as libc::c_char;
        }
        if unsafe { libc::ioctl(socket.as_raw_fd(), CTLIOCGINFO, &mut info) } < 0 {
            return Err(io::Error::last_os_error().into());
        }

        let addr = SockaddrCtl {
            sc_len: mem::size_of::<SockaddrCtl>() as u8,
            sc_family: libc::AF_SYSTEM as u8,
            ss_sysaddr: libc::AF_SYS_CONTROL as u16,
            sc_id: info.ctl_id,
            sc_unit: 0,
            sc_reserved: [0; 5],
        };
        let ret = unsafe {
            libc::connect(
                socket.as_raw_fd(),
                std::ptr::addr_of!(addr).cast(),
                mem::size_of::<SockaddrCtl>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(Self { socket })
    }
}

impl Transport for ControlTransport {
    fn get(&mut self, id: RegId) -> Result<RegValue, ClientError> {
        let mut payload = vec![0u8; id.cardinality().byte_len()];
        let mut len = payload.len() as libc::socklen_t;
        let ret = unsafe {
            libc::getsockopt(
                self.socket.as_raw_fd(),
                libc::SYSPROTO_CONTROL,
                SocketCode::option(id) as libc::c_int,
                payload.as_mut_ptr().cast(),
                &mut len,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error().into());
        }
        if len as usize != payload.len() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(decode_payload(id, &payload))
    }

    fn set(&mut self, id: RegId, value: RegValue) -> Result<(), ClientError> {
        let payload = encode_payload(value);
        let ret = unsafe {
            libc::setsockopt(
                self.socket.as_raw_fd(),
                libc::SYSPROTO_CONTROL,
                SocketCode::option(id) as libc::c_int,
                payload.as_ptr().cast(),
                payload.len() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }
}
