use std::time::Duration;

use obd2_dtc::{
    config::SessionConfig,
    connection::SettleTimer,
    device::mock::{MockHandle, MockTransport},
    lookup::CodeTables,
    workflow::{self, Outcome},
    Error, Obd2,
};

#[derive(Default)]
struct NoWait {
    waits: usize,
}

impl SettleTimer for NoWait {
    fn settle(&mut self, _period: Duration) -> Result<(), Error> {
        self.waits += 1;
        Ok(())
    }
}

/// Adapter that cannot reach the bus for the first `bus_failures` probes
fn adapter(bus_failures: usize, stored: &'static str) -> MockTransport {
    let mut probes = 0;
    MockTransport::new(move |cmd| {
        let reply = match cmd {
            "AT Z" => "\r\rELM327 v1.5\r\r>",
            "AT E0" => "AT E0\rOK\r\r>",
            "AT S0" | "AT SP A3" => "OK\r\r>",
            "AT IB 10" => "?\r\r>",
            "AT @1" => "OBDII to RS232 Interpreter\r\r>",
            "AT RV" => "12.6V\r\r>",
            "0100" => {
                probes += 1;
                if probes <= bus_failures {
                    "SEARCHING...\rUNABLE TO CONNECT\r\r>"
                } else {
                    "4100BE3FA813\r\r>"
                }
            }
            "AT DP" => "ISO 9141-2\r\r>",
            "0902" => "49020100000031\r4902024847434D\r49020338323633\r49020433413030\r49020534333532\r\r>",
            "03" => stored,
            "07" => "NO DATA\r\r>",
            _ => "?\r\r>",
        };
        Some(reply.to_owned())
    })
}

fn run(
    transport: MockTransport,
    timer: &mut NoWait,
) -> (MockHandle, Result<Outcome, Error>, String) {
    let handle = transport.handle();
    let mut out = Vec::new();
    let result = workflow::run(
        Obd2::new(transport),
        timer,
        &SessionConfig::default(),
        &CodeTables::standard(),
        &mut out,
    );
    (handle, result, String::from_utf8(out).unwrap())
}

#[test]
fn full_session() {
    let mut timer = NoWait::default();
    let (handle, result, out) = run(adapter(1, "0143000301710000\r\r>"), &mut timer);

    let Outcome::Completed(summary) = result.unwrap() else {
        panic!("session did not complete:\n{}", out);
    };
    assert_eq!(summary.vin.as_deref(), Some("   1HGCM82633A004352"));
    assert_eq!(summary.stored.codes(), vec!["C0300", "P0301", "C3100"]);
    assert!(summary.pending.is_empty());

    assert_eq!(
        handle.commands(),
        vec![
            "AT Z", "AT E0", "AT S0", "AT SP A3", "AT IB 10", "AT @1", "AT @2", "AT RV", "0100",
            "0100", "AT DP", "0902", "03", "07",
        ]
    );
    assert_eq!(timer.waits, 2);
    assert!(handle.is_closed());

    assert!(out.contains("ELM327 v1.5\n"));
    assert!(out.contains("SUCCESS: AT E0 - set echo off\n"));
    assert!(out.contains("SUCCESS: AT SP A3 - set protocol to ISO 9141-2\n"));
    assert!(out.contains("FAILED: AT IB 10 - set high speed CAN BUS\n"));
    assert!(out.contains("Volt reading at OBDII Connector: 12.6V\n"));
    assert!(out.contains("USING CAN BUS Protocol: ISO 9141-2\n"));
    assert!(out.contains("Vehicle VIN:    1HGCM82633A004352\n"));
    assert!(out.contains(
        "Stored errors:\nC0300 : [DESCRIPTION NOT FOUND]\nP0301 : Cylinder 1 Misfire Detected\n"
    ));
    assert!(out.contains("Pending errors:\n"));
}

#[test]
fn unreachable_bus_aborts_and_closes() {
    let mut timer = NoWait::default();
    let (handle, result, out) = run(adapter(usize::MAX, "0143000301710000\r\r>"), &mut timer);

    assert_eq!(result.unwrap(), Outcome::ConnectionFailed);
    assert!(handle.is_closed());
    assert_eq!(timer.waits, 5);

    let commands = handle.commands();
    assert_eq!(commands.iter().filter(|c| *c == "0100").count(), 5);
    assert_eq!(commands.last().map(String::as_str), Some("0100"));
    assert!(!commands.iter().any(|c| c == "0902" || c == "03" || c == "07"));
    assert!(out.ends_with("FAILED TO CONNECT TO CAN BUS\n"));
}

#[test]
fn decode_error_ends_session() {
    let mut timer = NoWait::default();
    let (handle, result, _) = run(adapter(0, "01SEARCHING...\r\r>"), &mut timer);

    assert!(matches!(result, Err(Error::MalformedToken(_))));
    assert!(handle.is_closed());
    assert!(!handle.commands().iter().any(|c| c == "07"));
}
