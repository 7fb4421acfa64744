use crate::transport::SocketId;
use thiserror::Error;

pub type Result<T, E = ModemError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ModemError {
    /// One of the `+UGPIOC` commands powering the GNSS receiver was rejected.
    #[error("failed to enable GNSS module")]
    HardwareEnableFailed,

    /// The modem rejected `+ULOC`, so no fix will be reported.
    #[error("location request was rejected by the modem")]
    LocationRequestFailed,

    #[error("malformed {what} response: {payload:?}")]
    MalformedResponse { what: &'static str, payload: String },

    #[error("failed to connect socket {socket_id} to {host}:{port}")]
    Connect {
        socket_id: SocketId,
        host: String,
        port: u16,
    },

    #[error("modem rejected command {command}")]
    CommandRejected { command: String },

    #[error("failed to open serial port")]
    Serial(#[from] serialport::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid driver config")]
    Config(#[from] serde_json::Error),
}

impl ModemError {
    pub(crate) fn malformed(what: &'static str, payload: &str) -> Self {
        Self::MalformedResponse {
            what,
            payload: payload.to_owned(),
        }
    }
}
