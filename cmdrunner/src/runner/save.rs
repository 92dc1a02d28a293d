//! Saving the running configuration.
//!
//! `write memory` may stop at up to two questions: whether to overwrite
//! the saved configuration and which file to write. Each is answered with
//! an empty line, in that order. Anything else the device says is the
//! final output.

use crate::error::Result;
use crate::session::Session;

/// Question asked before replacing the saved configuration.
pub const OVERWRITE_PROMPT: &str = "Overwrite the previous NVRAM configuration?[confirm]";

/// Question asked for the destination file.
pub const FILENAME_PROMPT: &str = "Destination filename [startup-config]";

/// Where the save exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    AwaitingOverwritePrompt,
    AwaitingFilenamePrompt,
    Done,
}

/// What to do after looking at a device response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    /// Send an empty confirmation and feed the answer back in.
    Confirm,
    /// The last response is the final save output.
    Finished,
}

/// State machine for the save exchange.
#[derive(Debug)]
pub struct SaveExchange {
    state: SaveState,
}

impl SaveExchange {
    pub fn new() -> Self {
        Self {
            state: SaveState::AwaitingOverwritePrompt,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Feed the latest response from the device.
    ///
    /// A response that lacks the awaited question moves on to the next
    /// state and is checked against that one too.
    pub fn advance(&mut self, response: &str) -> SaveStep {
        loop {
            match self.state {
                SaveState::AwaitingOverwritePrompt => {
                    self.state = SaveState::AwaitingFilenamePrompt;
                    if response.contains(OVERWRITE_PROMPT) {
                        return SaveStep::Confirm;
                    }
                }
                SaveState::AwaitingFilenamePrompt => {
                    self.state = SaveState::Done;
                    if response.contains(FILENAME_PROMPT) {
                        return SaveStep::Confirm;
                    }
                }
                SaveState::Done => return SaveStep::Finished,
            }
        }
    }
}

impl Default for SaveExchange {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `command` and answer its confirmation questions; returns the final output.
pub async fn save_config<S: Session>(session: &mut S, command: &str) -> Result<String> {
    let mut exchange = SaveExchange::new();
    let mut output = session.send_timed(command).await?;
    while exchange.advance(&output) == SaveStep::Confirm {
        output = session.send_timed("").await?;
    }
    Ok(output)
}
