//! Driver core for the Nova R404/R410 Cat-M1 modem.
//!
//! The driver talks to the modem through a [`ModemTransport`], which can be the
//! bundled [`SerialTransport`] or anything else that speaks AT commands, and
//! reports asynchronous happenings through an [`EventSink`].

pub mod config;
pub mod error;
pub mod event;
pub mod modem;
pub mod parser;
pub mod serial;
pub mod transport;
pub mod urc;
pub mod variant;

pub use config::DriverConfig;
pub use error::{ModemError, Result};
pub use event::{EventSink, LogSink, ModemEvent};
pub use modem::{LocationOutcome, LocationStatus, NovaModem};
pub use parser::LocationFix;
pub use serial::SerialTransport;
pub use transport::{CommandResult, ModemTransport, ResultCode, SocketId};
pub use variant::ModemVariant;
