use common::{test_config, FakeTransport, R404_IDENTITY, R410_IDENTITY};
use nova_modem::{LogSink, ModemError, ModemVariant, NovaModem};
use test_log::test;

mod common;

fn modem(transport: FakeTransport) -> NovaModem<FakeTransport, LogSink> {
    NovaModem::new(transport, LogSink, test_config())
}

#[test]
fn it_classifies_the_variant_once_at_construction() {
    let r404 = modem(FakeTransport::new(R404_IDENTITY));
    let r410 = modem(FakeTransport::new(R410_IDENTITY));

    assert_eq!(r404.variant(), ModemVariant::R404);
    assert_eq!(r410.variant(), ModemVariant::R410);
    assert_eq!(r410.transport().queries, ["ATI"]);
}

#[test]
fn it_describes_the_modem() {
    let r404 = modem(FakeTransport::new(R404_IDENTITY));
    let r410 = modem(FakeTransport::new(R410_IDENTITY));

    assert_eq!(
        r404.description(),
        "Hologram Nova US 4G LTE Cat-M1 Cellular USB Modem (R404)"
    );
    assert_eq!(
        r410.description(),
        "Hologram Nova US 4G LTE Cat-M1 Cellular USB Modem (R410)"
    );
}

#[test]
fn it_reads_the_operator() {
    let transport =
        FakeTransport::new(R410_IDENTITY).respond("AT+COPS?", "+COPS: 0,0,\"Carrier\",7");
    let mut attached = modem(transport);
    let mut detached = modem(FakeTransport::new(R410_IDENTITY).respond("AT+COPS?", "+COPS: 2"));

    assert_eq!(attached.operator(), Some("Carrier".to_owned()));
    assert_eq!(detached.operator(), None);
}

#[test]
fn it_checks_registration() {
    let home = FakeTransport::new(R410_IDENTITY).respond("AT+CEREG?", "+CEREG: 2,1");
    let searching = FakeTransport::new(R410_IDENTITY).respond("AT+CEREG?", "+CEREG: 2,2");
    let garbled = FakeTransport::new(R410_IDENTITY).respond("AT+CEREG?", "");

    assert!(modem(home).is_registered());
    assert!(!modem(searching).is_registered());
    assert!(!modem(garbled).is_registered());
}

#[test]
fn it_sends_the_init_sequence() {
    let mut modem = modem(FakeTransport::new(R410_IDENTITY));

    modem.init_serial_commands().unwrap();

    assert_eq!(
        modem.transport().sent,
        [
            "ATE0",
            "AT+CMEE=2",
            "AT+CPIN?",
            "AT+CPMS=\"ME\",\"ME\",\"ME\"",
            "AT+CEREG=2"
        ]
    );
}

#[test]
fn it_tolerates_optional_init_failures() {
    let transport = FakeTransport::new(R410_IDENTITY).reject("AT+CPMS=\"ME\",\"ME\",\"ME\"");
    let mut modem = modem(transport);

    modem.init_serial_commands().unwrap();

    assert_eq!(modem.transport().sent.len(), 5);
}

#[test]
fn it_fails_init_when_echo_cannot_be_disabled() {
    let mut modem = modem(FakeTransport::new(R410_IDENTITY).reject("ATE0"));

    let result = modem.init_serial_commands();

    assert!(matches!(result, Err(ModemError::CommandRejected { .. })));
    assert_eq!(modem.transport().sent, ["ATE0"]);
}
