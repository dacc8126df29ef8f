//! Shared session state
//!
//! What the front-end shows: the latest snapshot plus short histories of
//! event labels and disassembled instructions.

use std::collections::VecDeque;

use crate::core::OperatingMode;
use crate::telemetry::{CpuState, DeviceEvent};

/// Entries kept in each history
pub const HISTORY_LIMIT: usize = 256;

/// Shared session state
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Mode negotiated with the firmware
    pub mode: OperatingMode,
    /// Most recent snapshot
    pub current: Option<CpuState>,
    /// Event labels, oldest first
    pub command_log: VecDeque<String>,
    /// Disassembly of executed instructions, oldest first
    pub disasm_log: VecDeque<String>,
    /// Frames decoded so far
    pub frames_seen: u64,
    /// Frames carrying an event code this host does not know
    pub unknown_events: u64,
}

impl SessionState {
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Fold a new snapshot into the state, replacing the current one
    pub fn apply(&mut self, state: CpuState) {
        self.frames_seen += 1;
        if matches!(state.event, DeviceEvent::Unknown(_)) {
            self.unknown_events += 1;
        }
        push_bounded(&mut self.command_log, state.label.clone());
        if !state.listing.is_empty() {
            push_bounded(&mut self.disasm_log, state.listing.clone());
        }
        self.current = Some(state);
    }

    pub fn has_state(&self) -> bool {
        self.current.is_some()
    }

    pub fn pc(&self) -> Option<u16> {
        self.current.as_ref().map(|s| s.pc)
    }
}

fn push_bounded(log: &mut VecDeque<String>, entry: String) {
    if log.len() == HISTORY_LIMIT {
        log.pop_front();
    }
    log.push_back(entry);
}
