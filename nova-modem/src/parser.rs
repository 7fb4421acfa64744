//! Parsers for the handful of structured AT payloads the driver consumes.
//!
//! See the u-blox SARA-R4 AT commands manual (UBX-17003787) for the formats of
//! `+UULOC`, `+CEREG`, `+UPSND` and `+USOCR`.

use crate::error::{ModemError, Result};
use crate::transport::SocketId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LOCATION_URC_PREFIX: &str = "+UULOC:";

/// A position report from `+UULOC`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// UTC date as reported, `dd/mm/yyyy`.
    pub date: String,
    /// UTC time as reported, `hh:mm:ss.sss`.
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above mean sea level.
    pub altitude: f64,
    /// Radius of the horizontal uncertainty circle in metres.
    pub uncertainty: f64,
}

impl fmt::Display for LocationFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.date,
            self.time,
            self.latitude,
            self.longitude,
            self.altitude,
            self.uncertainty
        )
    }
}

/// `<stat>` of `+CEREG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    NotRegistered,
    Home,
    Searching,
    Denied,
    Unknown,
    Roaming,
    EmergencyOnly,
    Other(u8),
}

impl RegistrationStatus {
    pub fn is_registered(self) -> bool {
        matches!(self, RegistrationStatus::Home | RegistrationStatus::Roaming)
    }
}

impl From<u8> for RegistrationStatus {
    fn from(stat: u8) -> Self {
        match stat {
            0 => RegistrationStatus::NotRegistered,
            1 => RegistrationStatus::Home,
            2 => RegistrationStatus::Searching,
            3 => RegistrationStatus::Denied,
            4 => RegistrationStatus::Unknown,
            5 => RegistrationStatus::Roaming,
            8 => RegistrationStatus::EmergencyOnly,
            other => RegistrationStatus::Other(other),
        }
    }
}

/// Drops an optional `+XXXX:` prefix and returns the remaining fields.
fn fields<'a>(payload: &'a str, prefix: &str) -> Vec<&'a str> {
    let payload = payload.trim();
    let payload = payload.strip_prefix(prefix).unwrap_or(payload);

    payload.split(',').map(str::trim).collect()
}

fn parse_f64(field: &str, payload: &str) -> Result<f64> {
    field
        .parse()
        .map_err(|_| ModemError::malformed("location", payload))
}

/// Builds a [`LocationFix`] from a `+UULOC` payload, with or without its prefix.
/// Only the six field standard format (`response_type = 0`) is accepted.
pub fn parse_location(payload: &str) -> Result<LocationFix> {
    let fields = fields(payload, LOCATION_URC_PREFIX);
    let [date, time, latitude, longitude, altitude, uncertainty] = fields[..] else {
        return Err(ModemError::malformed("location", payload));
    };

    Ok(LocationFix {
        date: date.to_owned(),
        time: time.to_owned(),
        latitude: parse_f64(latitude, payload)?,
        longitude: parse_f64(longitude, payload)?,
        altitude: parse_f64(altitude, payload)?,
        uncertainty: parse_f64(uncertainty, payload)?,
    })
}

/// Extracts the operator name from a `+COPS?` response. Fewer than three fields
/// means the modem is not attached to any operator.
pub fn parse_operator(payload: &str) -> Option<String> {
    let parts: Vec<&str> = payload.trim().split(',').collect();
    if parts.len() < 3 {
        return None;
    }

    Some(parts[2].trim().trim_matches('"').to_owned())
}

/// Parses the read form of `+CEREG?`, i.e. `+CEREG: <n>,<stat>[,...]`.
pub fn parse_registration(payload: &str) -> Result<RegistrationStatus> {
    fields(payload, "+CEREG:")
        .get(1)
        .and_then(|stat| stat.parse::<u8>().ok())
        .map(RegistrationStatus::from)
        .ok_or_else(|| ModemError::malformed("registration", payload))
}

/// Parses `+UPSND: <profile>,8,<status>` and tells whether the PSD profile is active.
pub fn parse_context_status(payload: &str) -> Result<bool> {
    fields(payload, "+UPSND:")
        .get(2)
        .and_then(|status| status.parse::<u8>().ok())
        .map(|status| status == 1)
        .ok_or_else(|| ModemError::malformed("context status", payload))
}

/// Parses `+USOCR: <socket>`.
pub fn parse_socket_id(payload: &str) -> Result<SocketId> {
    fields(payload, "+USOCR:")
        .first()
        .and_then(|id| id.parse().ok())
        .map(SocketId)
        .ok_or_else(|| ModemError::malformed("socket create", payload))
}
