//! Interactive start-up prompts: change ticket and credentials.

use std::io;

use console::Term;
use secrecy::SecretString;

/// Ticket identifier and credentials shared read-only by every worker.
#[derive(Debug)]
pub struct RunContext {
    /// Change-control ticket stamped into device logs and the report.
    pub ticket: String,

    /// Username for every device.
    pub username: String,

    /// Password for every device.
    pub password: SecretString,
}

impl RunContext {
    pub fn new(
        ticket: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            ticket: ticket.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Prompt on the terminal for the ticket, username and masked password.
    pub fn prompt(term: &Term) -> io::Result<Self> {
        let ticket = ask(term, "Change Control/Ticket: ", Term::read_line)?;
        let username = ask(term, "Username: ", Term::read_line)?;
        let password = ask(term, "Password: ", Term::read_secure_line)?;
        Ok(Self::new(ticket, username, password))
    }
}

/// Write `label` and read with `read` until the answer is non-empty.
fn ask(term: &Term, label: &str, read: fn(&Term) -> io::Result<String>) -> io::Result<String> {
    until_non_empty(|| {
        term.write_str(label)?;
        read(term)
    })
}

fn until_non_empty(mut read: impl FnMut() -> io::Result<String>) -> io::Result<String> {
    loop {
        let answer = read()?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}
