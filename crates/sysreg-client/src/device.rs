use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;

use sysreg_core::{DeviceCode, RegId, RegValue};

use crate::access::ClientConfig;
use crate::error::ClientError;
use crate::transport::{decode_payload, encode_payload, Transport};

/// Character-device transport to the kernel agent (Linux).
///
/// Each request is one `ioctl` on the device node; the command code carries
/// direction, payload size and register, the argument points at the payload
/// buffer.
#[derive(Debug)]
pub struct DeviceTransport {
    device: File,
}

impl DeviceTransport {
    /// Opens the agent's device node.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when the node cannot be opened, typically
    /// because the kernel module is not loaded.
    pub fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        let device = OpenOptions::new().read(true).open(&config.device_path)?;
        Ok(Self { device })
    }

    fn ioctl(&self, code: u32, payload: &mut [u8]) -> Result<(), ClientError> {
        // The agent validates code/payload consistency again on its side;
        // this call only moves the bytes.
        let ret = unsafe {
            libc::ioctl(
                self.device.as_raw_fd(),
                libc::c_ulong::from(code),
                payload.as_mut_ptr(),
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }
}

impl Transport for DeviceTransport {
    fn get(&mut self, id: RegId) -> Result<RegValue, ClientError> {
        let mut payload = vec![0u8; id.cardinality().byte_len()];
        self.ioctl(DeviceCode::get(id), &mut payload)?;
        Ok(decode_payload(id, &payload))
    }

    fn set(&mut self, id: RegId, value: RegValue) -> Result<(), ClientError> {
        let mut payload = encode_payload(value);
        self.ioctl(DeviceCode::set(id), &mut payload)?;
        Ok(())
    }
}
