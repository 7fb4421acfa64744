use crate::config::{SerialConfig, Timeouts};
use crate::error::Result;
use crate::parser::{parse_context_status, parse_registration};
use crate::transport::{format_command, CommandResult, ModemTransport, ResultCode};
use crate::urc::{is_registration_urc, is_unsolicited};
use serialport::SerialPort;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// PSD profile used for the packet data context.
const PSD_PROFILE: u8 = 0;

/// [`ModemTransport`] over the modem's AT serial port.
///
/// URCs that show up while a command is in flight are queued and handed out by
/// [`ModemTransport::poll_urc`] before anything new is read from the port.
pub struct SerialTransport<P = Box<dyn SerialPort>> {
    port: P,
    rx: Vec<u8>,
    urcs: VecDeque<String>,
    config: SerialConfig,
    timeouts: Timeouts,
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Echo,
    Final(ResultCode),
    Urc,
    Payload,
}

impl SerialTransport {
    /// Opens the configured serial device.
    pub fn open(config: &SerialConfig, timeouts: &Timeouts) -> Result<Self> {
        let device = config.device.to_string_lossy().into_owned();
        let port = serialport::new(device.as_str(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()?;
        info!(%device, baud_rate = config.baud_rate, "opened modem serial port");

        Ok(Self::from_port(port, config.clone(), timeouts.clone()))
    }
}

impl<P: Read + Write> SerialTransport<P> {
    pub fn from_port(port: P, config: SerialConfig, timeouts: Timeouts) -> Self {
        Self {
            port,
            rx: Vec::new(),
            urcs: VecDeque::new(),
            config,
            timeouts,
        }
    }

    /// Returns the next non-empty line, or `None` once `deadline` passes.
    fn read_line(&mut self, deadline: Instant) -> io::Result<Option<String>> {
        let mut buf = [0u8; 256];

        loop {
            while let Some(line) = take_line(&mut self.rx) {
                if !line.is_empty() {
                    return Ok(Some(line));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            match self.port.read(&mut buf) {
                Ok(0) => std::thread::sleep(Duration::from_millis(50)),
                Ok(n) => self.rx.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Complete lines still buffered before a command is written belong to an earlier
    /// exchange. URCs among them are kept, anything else would be misread as the
    /// next command's answer.
    fn discard_stale_lines(&mut self) {
        while let Some(line) = take_line(&mut self.rx) {
            if line.is_empty() {
                continue;
            }
            if is_unsolicited(&line) {
                self.urcs.push_back(line);
            } else {
                debug!(%line, "discarding stale line");
            }
        }
    }

    fn is_registered(&mut self) -> bool {
        let result = self.send("+CEREG?", None, self.timeouts.command);
        if !result.is_ok() {
            return false;
        }

        match parse_registration(&result.response) {
            Ok(status) => {
                debug!(?status, "network registration");
                status.is_registered()
            }
            Err(err) => {
                warn!(%err, "could not read network registration");
                false
            }
        }
    }
}

impl<P: Read + Write> ModemTransport for SerialTransport<P> {
    fn send(
        &mut self,
        command: &str,
        param: Option<&str>,
        timeout: Duration,
    ) -> CommandResult {
        let line = format_command(command, param);
        debug!(command = %line, "sending AT command");

        self.discard_stale_lines();
        if let Err(err) = self.port.write_all(format!("{line}\r").as_bytes()) {
            warn!(command = %line, %err, "failed to write AT command");
            return CommandResult::error("");
        }

        let deadline = Instant::now() + timeout;
        let prefix = response_prefix(command);
        let mut payload = Vec::new();

        loop {
            let next = match self.read_line(deadline) {
                Ok(Some(next)) => next,
                Ok(None) => {
                    warn!(command = %line, ?timeout, "AT command timed out");
                    return CommandResult::error(payload.join("\n"));
                }
                Err(err) => {
                    warn!(command = %line, %err, "error reading from port");
                    return CommandResult::error(payload.join("\n"));
                }
            };

            match classify_line(&next, prefix) {
                Line::Echo => {}
                Line::Urc => self.urcs.push_back(next),
                Line::Payload => payload.push(next),
                Line::Final(ResultCode::Ok) => {
                    debug!(command = %line, ?payload, "AT command succeeded");
                    return CommandResult::ok(payload.join("\n"));
                }
                Line::Final(ResultCode::Error) => {
                    warn!(command = %line, result = %next, "AT command returned error");
                    payload.push(next);
                    return CommandResult::error(payload.join("\n"));
                }
            }
        }
    }

    fn query(&mut self, command: &str) -> String {
        let result = self.send(command, None, self.timeouts.command);
        if !result.is_ok() {
            warn!(command, response = %result.response, "query failed");
        }

        result.response
    }

    fn poll_urc(&mut self) -> Option<String> {
        if let Some(urc) = self.urcs.pop_front() {
            return Some(urc);
        }

        let deadline = Instant::now() + self.config.read_timeout;
        match self.read_line(deadline) {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "error polling for URC");
                None
            }
        }
    }

    fn is_context_active(&mut self) -> bool {
        if !self.is_registered() {
            return false;
        }

        let param = format!("{PSD_PROFILE},8");
        let result = self.send("+UPSND", Some(param.as_str()), self.timeouts.command);
        if !result.is_ok() {
            return false;
        }

        parse_context_status(&result.response).unwrap_or_else(|err| {
            warn!(%err, "could not read packet data context status");
            false
        })
    }

    fn ensure_context_active(&mut self) -> bool {
        if self.is_context_active() {
            return true;
        }

        info!(apn = %self.config.apn, "setting up packet data context");
        let apn = format!("{PSD_PROFILE},1,\"{}\"", self.config.apn);
        let dynamic_ip = format!("{PSD_PROFILE},7,\"0.0.0.0\"");
        let activate = format!("{PSD_PROFILE},3");
        for (setting, param) in [("apn", apn), ("dynamic ip", dynamic_ip)] {
            let result = self.send("+UPSD", Some(param.as_str()), self.timeouts.command);
            if !result.is_ok() {
                error!(setting, response = %result.response, "packet data context setup failed");
                return false;
            }
        }

        let result = self.send(
            "+UPSDA",
            Some(activate.as_str()),
            self.timeouts.context_activation,
        );
        if result.is_ok() {
            info!("packet data context active");
            true
        } else {
            error!(response = %result.response, "packet data context setup failed");
            false
        }
    }
}

/// Removes the first `\n`-terminated line from `rx`.
fn take_line(rx: &mut Vec<u8>) -> Option<String> {
    let end = rx.iter().position(|b| *b == b'\n')?;
    let line: Vec<u8> = rx.drain(..=end).collect();

    Some(String::from_utf8_lossy(&line).trim().to_owned())
}

/// `+CEREG?` answers with `+CEREG:`, `I` with unprefixed lines.
fn response_prefix(command: &str) -> &str {
    if !command.starts_with('+') {
        return "";
    }

    command
        .split(['?', '='])
        .next()
        .unwrap_or(command)
}

fn classify_line(line: &str, response_prefix: &str) -> Line {
    match line {
        "OK" => Line::Final(ResultCode::Ok),
        "ERROR" | "NO CARRIER" => Line::Final(ResultCode::Error),
        l if l.starts_with("+CME ERROR") || l.starts_with("+CMS ERROR") => {
            Line::Final(ResultCode::Error)
        }
        l if l.starts_with("AT") => Line::Echo,
        l if is_registration_urc(l) => Line::Urc,
        l if !response_prefix.is_empty() && l.starts_with(response_prefix) => {
            Line::Payload
        }
        l if is_unsolicited(l) => Line::Urc,
        _ => Line::Payload,
    }
}
