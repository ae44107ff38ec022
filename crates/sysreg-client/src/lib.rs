//! Unprivileged client access to the sysreg kernel agent.
//!
//! The agent exposes the register catalog over one of two OS transports: a
//! character device driven by `ioctl` command codes on Linux, or a system
//! control socket driven by symmetric `getsockopt`/`setsockopt` calls on
//! macOS. Both derive their command codes from `sysreg-core`, so the client
//! side of the wire is by construction bit-identical to what the agent
//! parses. [`Loopback`] closes the loop in-process against a simulated
//! store, which is how everything above the transport seam is tested.

mod access;
mod error;
mod transport;

#[cfg(target_os = "macos")]
mod control;
#[cfg(target_os = "linux")]
mod device;

pub use access::{AccessStats, ClientConfig, RegAccess};
#[cfg(target_os = "macos")]
pub use control::ControlTransport;
#[cfg(target_os = "linux")]
pub use device::DeviceTransport;
pub use error::ClientError;
pub use transport::{Loopback, Transport};
