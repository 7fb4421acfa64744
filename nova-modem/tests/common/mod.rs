#![allow(dead_code)]
use mockall::mock;
use nova_modem::{
    config::DriverConfig, transport::format_command, CommandResult, EventSink,
    ModemEvent, ModemTransport,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const R410_IDENTITY: &str =
    "Manufacturer: u-blox\nModel: SARA-R410M-02B\nRevision: L0.0.00.00.05.08";
pub const R404_IDENTITY: &str =
    "Manufacturer: u-blox\nModel: SARA-R404M\nRevision: L0.0.00.00.05.06";

pub const REPORT: &str = "+UULOC: 27/09/2017,10:42:23.000,45.7865039,13.7207354,17,2500";
pub const OTHER_REPORT: &str = "+UULOC: 28/09/2017,08:00:00.000,40.0,-73.5,10,30";

mock! {
    pub Sink {}
    impl EventSink for Sink {
        fn emit(&self, event: ModemEvent);
    }
}

/// Scripted transport that records everything the driver sends.
pub struct FakeTransport {
    pub identity: String,
    pub sent: Vec<String>,
    pub timeouts: Vec<(String, Duration)>,
    pub queries: Vec<String>,
    pub rejected: HashSet<String>,
    pub responses: HashMap<String, String>,
    /// `None` entries model a poll that timed out without a line.
    pub urcs: VecDeque<Option<String>>,
    /// Answers for `is_context_active`, `context_default` once drained.
    pub context: VecDeque<bool>,
    pub context_default: bool,
    pub context_checks: usize,
    pub ensure_ok: bool,
    pub ensure_calls: usize,
}

impl FakeTransport {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_owned(),
            sent: Vec::new(),
            timeouts: Vec::new(),
            queries: Vec::new(),
            rejected: HashSet::new(),
            responses: HashMap::new(),
            urcs: VecDeque::new(),
            context: VecDeque::new(),
            context_default: true,
            context_checks: 0,
            ensure_ok: true,
            ensure_calls: 0,
        }
    }

    pub fn reject(mut self, command: &str) -> Self {
        self.rejected.insert(command.to_owned());
        self
    }

    pub fn respond(mut self, command: &str, response: &str) -> Self {
        self.responses.insert(command.to_owned(), response.to_owned());
        self
    }

    pub fn urc(mut self, line: &str) -> Self {
        self.urcs.push_back(Some(line.to_owned()));
        self
    }

    pub fn silence(mut self) -> Self {
        self.urcs.push_back(None);
        self
    }

    pub fn context(mut self, answers: &[bool]) -> Self {
        self.context.extend(answers);
        self
    }

    pub fn sent_matching(&self, prefix: &str) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl ModemTransport for FakeTransport {
    fn send(
        &mut self,
        command: &str,
        param: Option<&str>,
        timeout: Duration,
    ) -> CommandResult {
        let line = format_command(command, param);
        self.sent.push(line.clone());
        self.timeouts.push((line.clone(), timeout));

        let response = self.responses.get(&line).cloned().unwrap_or_default();
        if self.rejected.contains(&line) {
            CommandResult::error(response)
        } else {
            CommandResult::ok(response)
        }
    }

    fn query(&mut self, command: &str) -> String {
        let line = format_command(command, None);
        self.queries.push(line.clone());
        if command == "I" {
            return self.identity.clone();
        }

        self.responses.get(&line).cloned().unwrap_or_default()
    }

    fn poll_urc(&mut self) -> Option<String> {
        self.urcs.pop_front().flatten()
    }

    fn is_context_active(&mut self) -> bool {
        self.context_checks += 1;
        self.context.pop_front().unwrap_or(self.context_default)
    }

    fn ensure_context_active(&mut self) -> bool {
        self.ensure_calls += 1;
        self.ensure_ok
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that records formatted log lines, and returns them
/// alongside `f`'s result.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();

    (result, logs)
}

pub fn test_config() -> DriverConfig {
    let mut config = DriverConfig::default();
    config.location.wait_timeout = Duration::from_millis(200);

    config
}
