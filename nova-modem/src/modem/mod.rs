use crate::config::DriverConfig;
use crate::error::{ModemError, Result};
use crate::event::{EventSink, ModemEvent};
use crate::parser::{parse_operator, parse_registration, LocationFix};
use crate::transport::{format_command, ModemTransport, SocketId};
use crate::urc::{self, Urc};
use crate::variant::{classify, ModemVariant};
use tracing::{debug, info, warn};

pub mod location;
pub mod socket;

pub use location::{LocationOutcome, LocationStatus};

/// USB vendor/product ids the modem enumerates with.
pub const USB_IDS: &[(u16, u16)] = &[(0x05c6, 0x90b2)];

/// Kernel module that binds the modem's serial interfaces.
pub const KERNEL_MODULE: &str = "option";

const PRODUCT_NAME: &str = "Hologram Nova US 4G LTE Cat-M1 Cellular USB Modem";

/// Driver for the Nova R404/R410 modem.
///
/// The variant is queried once in [`NovaModem::new`]; GNSS state and the last
/// known fix live as long as the driver.
pub struct NovaModem<T, S> {
    transport: T,
    events: S,
    config: DriverConfig,
    variant: ModemVariant,
    socket_id: SocketId,
    gnss_enabled: bool,
    last_location: Option<LocationFix>,
}

impl<T: ModemTransport, S: EventSink> NovaModem<T, S> {
    pub fn new(mut transport: T, events: S, config: DriverConfig) -> Self {
        let identity = transport.query("I");
        let variant = classify(&identity);
        info!(%variant, "detected modem variant");

        Self {
            transport,
            events,
            config,
            variant,
            socket_id: SocketId::default(),
            gnss_enabled: false,
            last_location: None,
        }
    }

    pub fn variant(&self) -> ModemVariant {
        self.variant
    }

    pub fn description(&self) -> String {
        format!("{PRODUCT_NAME} ({})", self.variant)
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Puts the modem in the state the rest of the driver expects: no echo, verbose
    /// errors, SMS in modem memory and EPS registration URCs with location info.
    pub fn init_serial_commands(&mut self) -> Result<()> {
        self.set("E0", None)?;

        let optional: [(&str, Option<&str>); 4] = [
            ("+CMEE", Some("2")),
            ("+CPIN?", None),
            ("+CPMS", Some("\"ME\",\"ME\",\"ME\"")),
            ("+CEREG", Some("2")),
        ];
        for (command, param) in optional {
            if let Err(err) = self.set(command, param) {
                warn!(%err, "init command failed, continuing");
            }
        }

        Ok(())
    }

    pub fn is_registered(&mut self) -> bool {
        let response = self.transport.query("+CEREG?");
        match parse_registration(&response) {
            Ok(status) => status.is_registered(),
            Err(err) => {
                warn!(%err, "could not read network registration");
                false
            }
        }
    }

    /// Name of the operator the modem is attached to. The R4 series has no
    /// `+UDOPN`, so this is read from `+COPS?`.
    pub fn operator(&mut self) -> Option<String> {
        let response = self.transport.query("+COPS?");
        parse_operator(&response)
    }

    /// Routes one unsolicited line to its handler.
    pub fn dispatch_urc(&mut self, line: &str) -> Result<()> {
        match urc::classify(line) {
            Urc::Location(payload) => self.on_location_urc(&payload),
            Urc::SocketClosed(socket_id) => {
                info!(%socket_id, "socket closed by modem");
                self.events.emit(ModemEvent::SocketClosed(socket_id));
                Ok(())
            }
            Urc::ContextDeactivated => {
                warn!("packet data context deactivated by the network");
                self.events.emit(ModemEvent::ContextDeactivated);
                Ok(())
            }
            Urc::Other(line) => {
                debug!(%line, "ignoring URC");
                Ok(())
            }
        }
    }

    /// Sends a command with the default timeout, treating anything but OK as an error.
    fn set(&mut self, command: &str, param: Option<&str>) -> Result<String> {
        let timeout = self.config.timeouts.command;
        let result = self.transport.send(command, param, timeout);
        if !result.is_ok() {
            return Err(ModemError::CommandRejected {
                command: format_command(command, param),
            });
        }

        Ok(result.response)
    }
}
