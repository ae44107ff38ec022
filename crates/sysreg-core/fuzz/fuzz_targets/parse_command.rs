#![no_main]

use libfuzzer_sys::fuzz_target;
use sysreg_core::{Agent, DeviceCode, Direction, SimBackend, SocketCode, SysregEncoding};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let code = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let option = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    // Parsers are total; accepted codes must re-derive to themselves.
    if let Some((direction, id)) = DeviceCode::parse(code) {
        let rebuilt = match direction {
            Direction::Get => DeviceCode::get(id),
            Direction::Set => DeviceCode::set(id),
        };
        assert_eq!(rebuilt, code);
    }
    if let Some(id) = SocketCode::parse(option) {
        assert_eq!(SocketCode::option(id), option);
    }

    // Field unpack keeps only operand bits and repacks to the same value.
    let encoding = SysregEncoding::from_sreg(code);
    assert_eq!(encoding.sreg(), code & 0x001F_FFE0);

    // Dispatch over arbitrary codes and payload never panics.
    let mut agent = Agent::new(SimBackend::new());
    let mut payload = data[8..].to_vec();
    let _ = agent.serve_device(code, &mut payload);
    let _ = agent.serve_socket_get(option, &mut payload);
    let _ = agent.serve_socket_set(option, &payload);
});
