//! End-to-end agent dispatch over the simulated register store, driven
//! through the same command codes the client side derives.

#![allow(clippy::pedantic, clippy::nursery)]

use proptest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use rstest::rstest;
use sysreg_core::{
    Agent, DeviceCode, RegId, RegPair, RegValue, SimBackend, SocketCode, SysregEncoding,
    SysregError, UnsupportedReason,
};

const ISAR1: SysregEncoding = SysregEncoding::new(3, 0, 0, 6, 1);
const ISAR2: SysregEncoding = SysregEncoding::new(3, 0, 0, 6, 2);

fn agent_with_pac() -> Agent<SimBackend> {
    let mut backend = SimBackend::new();
    backend.preload(ISAR1, 0x0000_0010); // APA
    backend.preload(ISAR2, 0x0000_0100); // GPA3
    Agent::new(backend)
}

#[rstest]
#[case(RegId::ApiaKey)]
#[case(RegId::ApibKey)]
#[case(RegId::ApdaKey)]
#[case(RegId::ApdbKey)]
#[case(RegId::ApgaKey)]
fn every_key_pair_roundtrips_over_the_device_transport(#[case] id: RegId) {
    let mut agent = agent_with_pac();
    let key = RegPair {
        high: 0xA5A5_A5A5_0000_0001,
        low: 0x5A5A_5A5A_FFFF_FFFE,
    };

    let mut payload = key.to_le_bytes();
    agent.serve_device(DeviceCode::set(id), &mut payload).unwrap();

    let mut read_back = [0u8; 16];
    agent
        .serve_device(DeviceCode::get(id), &mut read_back)
        .unwrap();
    assert_eq!(RegPair::from_le_bytes(read_back), key);
}

#[test]
fn device_and_socket_transports_address_the_same_register() {
    let mut agent = Agent::new(SimBackend::new());

    // Write over the socket transport, read back over the device transport.
    let value = 0x0123_4567_89AB_CDEFu64;
    agent
        .serve_socket_set(SocketCode::option(RegId::TpidrEl1), &value.to_le_bytes())
        .unwrap();

    let mut payload = [0u8; 8];
    agent
        .serve_device(DeviceCode::get(RegId::TpidrEl1), &mut payload)
        .unwrap();
    assert_eq!(u64::from_le_bytes(payload), value);
}

#[rstest]
#[case(RegId::Aa64Pfr0)]
#[case(RegId::Aa64Isar2)]
#[case(RegId::Tcr)]
#[case(RegId::Midr)]
#[case(RegId::TpidrroEl0)]
#[case(RegId::Sctlr)]
fn writes_to_read_only_registers_are_rejected_on_both_transports(#[case] id: RegId) {
    let mut agent = Agent::new(SimBackend::new());
    let rejected = SysregError::UnsupportedOperation {
        id,
        reason: UnsupportedReason::ReadOnly,
    };

    let mut payload = [0xFFu8; 8];
    assert_eq!(
        agent.serve_device(DeviceCode::set(id), &mut payload),
        Err(rejected)
    );
    assert_eq!(
        agent.serve_socket_set(SocketCode::option(id), &payload),
        Err(rejected)
    );

    // The rejected writes never reached the store.
    let encoding = id.descriptor().single_encoding().unwrap();
    assert_eq!(agent.backend().peek(encoding), None);
    assert_eq!(agent.get(id), Ok(RegValue::Single(0)));
}

#[test]
fn feature_snapshot_flows_through_the_same_dispatch() {
    let mut agent = agent_with_pac();
    agent
        .backend_mut()
        .preload(SysregEncoding::new(3, 0, 0, 4, 0), 0x0210_0000_0000_0000);
    agent
        .backend_mut()
        .preload(SysregEncoding::new(3, 0, 0, 4, 1), 0x0000_0001);

    let id = agent.id_registers().unwrap();
    assert!(id.has_pointer_auth());
    assert!(id.has_generic_pointer_auth());
    assert!(id.has_branch_target_id());
    assert!(id.has_realm_management());
    assert_eq!(id.realm_management_version(), 1);
    assert!(id.has_speculation_barrier_v2p2());
}

#[test]
fn unknown_codes_report_the_raw_value_they_carried() {
    let mut agent = Agent::new(SimBackend::new());
    let mut payload = [0u8; 8];

    // In-range layout, unpopulated command number.
    assert_eq!(
        agent.serve_device(0x8008_F010, &mut payload),
        Err(SysregError::UnknownRegister { raw: 0x8008_F010 })
    );
    assert_eq!(
        agent.serve_socket_get(0x00AD_0000, &mut payload),
        Err(SysregError::UnknownRegister { raw: 0x00AD_0000 })
    );
}
