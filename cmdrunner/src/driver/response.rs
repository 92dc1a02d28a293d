//! Response type for command execution results.

/// Response from a prompt-terminated command.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (command echo and trailing prompt removed).
    pub result: String,

    /// Failure string found in the output, if any.
    pub failure_message: Option<String>,
}

impl Response {
    /// Build a response from raw output, normalizing it.
    pub fn from_raw(command: impl Into<String>, raw: &str) -> Self {
        let command = command.into();
        Self {
            result: normalize_output(raw, &command),
            command,
            failure_message: None,
        }
    }

    /// Mark the response as failed.
    pub fn with_failure(mut self, failure_message: impl Into<String>) -> Self {
        self.failure_message = Some(failure_message.into());
        self
    }
}

/// Strip the echoed command from the start and the prompt line from the end.
pub(crate) fn normalize_output(raw: &str, command: &str) -> String {
    let output = raw.trim_start_matches(['\r', '\n']);
    let output = output
        .strip_prefix(command)
        .unwrap_or(output)
        .trim_start_matches(['\r', '\n']);

    match output.rfind('\n') {
        Some(pos) => output[..pos].trim_end_matches('\r').to_string(),
        None => String::new(),
    }
}
