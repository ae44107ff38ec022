use sysreg_core::{
    Agent, Cardinality, DeviceCode, RegId, RegPair, RegValue, SimBackend, SysregBackend,
};

use crate::error::ClientError;

/// One request/response channel to the agent.
///
/// Implementations derive their command codes exclusively through
/// `sysreg_core::command`, never by hand.
pub trait Transport {
    /// Reads a register or pair by logical ID.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the agent refuses the request or the
    /// transport fails.
    fn get(&mut self, id: RegId) -> Result<RegValue, ClientError>;

    /// Writes a register or pair by logical ID.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the agent refuses the request or the
    /// transport fails.
    fn set(&mut self, id: RegId, value: RegValue) -> Result<(), ClientError>;
}

pub(crate) fn decode_payload(id: RegId, payload: &[u8]) -> RegValue {
    match id.cardinality() {
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
    }
}

pub(crate) fn encode_payload(value: RegValue) -> Vec<u8> {
    match value {
        RegValue::Single(value) => value.to_le_bytes().to_vec(),
        RegValue::Pair(pair) => pair.to_le_bytes().to_vec(),
    }
}

/// In-process transport: an [`Agent`] served over real device command codes.
///
/// Every request is marshalled to wire bytes, coded with [`DeviceCode`] and
/// parsed back by the agent, so a loopback round trip exercises the same
/// client/agent mapping the kernel transports rely on.
#[derive(Debug, Default)]
pub struct Loopback<B> {
    agent: Agent<B>,
}

impl Loopback<SimBackend> {
    /// Loopback over an empty simulated store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: SysregBackend> Loopback<B> {
    /// Loopback over a caller-supplied backend.
    #[must_use]
    pub fn with_backend(backend: B) -> Self {
        Self {
            agent: Agent::new(backend),
        }
    }

    /// The agent serving this transport.
    #[must_use]
    pub fn agent(&self) -> &Agent<B> {
        &self.agent
    }

    /// Exclusive access to the serving agent.
    pub fn agent_mut(&mut self) -> &mut Agent<B> {
        &mut self.agent
    }
}

impl<B: SysregBackend> Transport for Loopback<B> {
    fn get(&mut self, id: RegId) -> Result<RegValue, ClientError> {
        let mut payload = vec![0u8; id.cardinality().byte_len()];
        self.agent.serve_device(DeviceCode::get(id), &mut payload)?;
        Ok(decode_payload(id, &payload))
    }

    fn set(&mut self, id: RegId, value: RegValue) -> Result<(), ClientError> {
        let mut payload = encode_payload(value);
        self.agent.serve_device(DeviceCode::set(id), &mut payload)?;
        Ok(())
    }
}
