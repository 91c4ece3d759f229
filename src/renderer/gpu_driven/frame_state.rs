//! Per-frame phase sequencing and component lifecycle

use crate::error::{EngineError, EngineResult};
use std::fmt;

/// Phase of the frame currently being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    ResetCounters,
    Cull,
    Draw,
}

impl FramePhase {
    /// The only phase allowed to follow this one
    pub fn next(self) -> FramePhase {
        match self {
            FramePhase::Idle => FramePhase::ResetCounters,
            FramePhase::ResetCounters => FramePhase::Cull,
            FramePhase::Cull => FramePhase::Draw,
            FramePhase::Draw => FramePhase::Idle,
        }
    }
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Enforces `Idle -> ResetCounters -> Cull -> Draw -> Idle`
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    phase: FramePhase,
    frames_completed: u64,
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self {
            phase: FramePhase::Idle,
            frames_completed: 0,
        }
    }
}

impl FrameSequencer {
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Move to `to`, rejecting anything but the successor phase
    pub fn advance_to(&mut self, to: FramePhase) -> EngineResult<()> {
        if self.phase.next() != to {
            return Err(EngineError::FrameOrder {
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }

        if to == FramePhase::Idle {
            self.frames_completed += 1;
        }
        self.phase = to;
        Ok(())
    }

    /// Drop a partially recorded frame
    pub fn abort(&mut self) {
        self.phase = FramePhase::Idle;
    }
}

/// Lifecycle of the point cloud renderer component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Initialized, accepting frames
    Ready,
    /// A pipeline fault occurred; every later frame fails
    Faulted,
    /// Device buffers released
    ShutDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
