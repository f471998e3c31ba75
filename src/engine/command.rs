//! Control-surface command events
//!
//! Hotkey handlers and other control-surface code never touch the loop
//! directly; they enqueue discrete commands that the loop drains and applies
//! to the shared configuration at the top of each tick. This keeps
//! user-interface code off the loop thread entirely.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::SharedConfig;

/// A discrete control-surface event consumed by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip the pause flag
    TogglePause,
    /// Set the pause flag explicitly
    SetPaused(bool),
    /// Flip the clicking-enabled flag
    ToggleClicking,
    /// Set the clicking-enabled flag explicitly
    SetClickingEnabled(bool),
    /// The detected-colors inspection view opened or closed
    SetInspectionViewActive(bool),
    /// A color-picker overlay opened or closed
    SetPickerActive(bool),
}

/// Sender half handed to the control surface
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Enqueue a command; silently dropped once the loop has exited
    pub fn send(&self, command: Command) {
        let _ = self.tx.send(command);
    }
}

/// Receiver half drained by the loop each tick
pub type CommandReceiver = Receiver<Command>;

/// Create the command queue
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    (CommandSender { tx }, rx)
}

/// Apply one command to the shared configuration
pub fn apply(config: &SharedConfig, command: Command) {
    match command {
        Command::TogglePause => {
            config.toggle_paused();
        }
        Command::SetPaused(paused) => config.set_paused(paused),
        Command::ToggleClicking => {
            config.toggle_clicking();
        }
        Command::SetClickingEnabled(enabled) => config.set_clicking_enabled(enabled),
        Command::SetInspectionViewActive(active) => config.set_inspection_view_active(active),
        Command::SetPickerActive(active) => config.set_picker_active(active),
    }
}
