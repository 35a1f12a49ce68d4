//! Terminal host for the orchestrator.

use std::io::{self, BufRead, BufReader, Write};
use std::sync::Mutex;

use parley_action::{EnvironmentError, SystemEnvironment, SystemProperties};
use parley_core::UserInfo;
use tracing::warn;

/// Writes output lines to a terminal and reads answers from it.
///
/// Owns the only reader of its input, so the interactive loop reads its
/// commands through [`ConsoleEnvironment::read_line`] too.
pub struct ConsoleEnvironment {
    properties: SystemProperties,
    user: UserInfo,
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEnvironment {
    /// A console on the process's stdin and stdout.
    pub fn stdio(user: UserInfo) -> Self {
        Self::with_io(
            user,
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(
        user: UserInfo,
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            properties: SystemProperties::current("Parley console", "Parley developers"),
            user,
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    /// Next input line without its line ending, `None` at end of input.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| io::Error::other("console input lock poisoned"))?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Show `text` without a line break and flush.
    pub fn prompt(&self, text: &str) {
        if let Err(e) = self.emit(|out| {
            write!(out, "{text}")?;
            out.flush()
        }) {
            warn!(error = %e, "Console output failed");
        }
    }

    fn emit(&self, f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> io::Result<()> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| io::Error::other("console output lock poisoned"))?;
        f(&mut **output)
    }
}

impl SystemEnvironment for ConsoleEnvironment {
    fn properties(&self) -> &SystemProperties {
        &self.properties
    }

    fn user(&self) -> &UserInfo {
        &self.user
    }

    fn write(&self, text: &str) {
        if let Err(e) = self.emit(|out| writeln!(out, "{text}")) {
            warn!(error = %e, "Console output failed");
        }
    }

    fn can_request_input(&self) -> bool {
        true
    }

    /// Blank answers and end of input count as no answer.
    fn request_input(&self, prompt: &str) -> Result<Option<String>, EnvironmentError> {
        self.prompt(&format!("{prompt} "));
        let answer = self.read_line()?;
        Ok(answer.filter(|a| !a.trim().is_empty()))
    }
}
