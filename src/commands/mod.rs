mod config;
mod generation;

pub use config::*;
pub use generation::*;

/// A user-invokable action the host shows as a ribbon icon and a palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const SEND_COMMAND: CommandSpec = CommandSpec {
    id: "send-to-ollama",
    name: "Send to Ollama",
    icon: "send",
};

pub const STOP_COMMAND: CommandSpec = CommandSpec {
    id: "stop-ollama",
    name: "Stop Ollama",
    icon: "square",
};

pub const COMMANDS: &[CommandSpec] = &[SEND_COMMAND, STOP_COMMAND];
