use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Driver configuration. Every field has a default matching the Nova firmware, so a
/// config file only needs to list what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub timeouts: Timeouts,
    pub location: LocationConfig,
    pub serial: SerialConfig,
}

impl DriverConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;

        Ok(config)
    }
}

/// Per-command timeouts, in seconds when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "secs")]
    pub command: Duration,

    /// `+USOCO`; link establishment on Cat-M1 can take up to two minutes.
    #[serde(with = "secs")]
    pub connect: Duration,

    #[serde(with = "secs")]
    pub close: Duration,

    #[serde(with = "secs")]
    pub context_activation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command: Duration::from_secs(10),
            connect: Duration::from_secs(122),
            close: Duration::from_secs(40),
            context_activation: Duration::from_secs(30),
        }
    }
}

/// Parameters of `+ULOC` and the bound on how long we wait for `+UULOC`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// 2 = single shot.
    pub mode: u8,
    /// 3 = GNSS and CellLocate.
    pub sensor: u8,
    /// Seconds the modem itself spends on the fix.
    pub timeout_s: u16,
    /// Target accuracy in metres.
    pub accuracy_m: u32,
    #[serde(with = "secs")]
    pub wait_timeout: Duration,
}

/// `+ULOC` `<response_type>`. Fixed to the standard six field report, the only one
/// [`crate::parser::parse_location`] understands.
const STANDARD_RESPONSE: u8 = 0;

impl LocationConfig {
    pub fn request_param(&self) -> String {
        format!(
            "{},{},{STANDARD_RESPONSE},{},{}",
            self.mode, self.sensor, self.timeout_s, self.accuracy_m
        )
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            mode: 2,
            sensor: 3,
            timeout_s: 10,
            accuracy_m: 10,
            wait_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub device: PathBuf,
    pub baud_rate: u32,
    #[serde(with = "millis")]
    pub read_timeout: Duration,
    /// APN used when the packet data context has to be brought up.
    pub apn: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyUSB0"),
            baud_rate: 9600,
            read_timeout: Duration::from_millis(500),
            apn: "hologram".to_owned(),
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
