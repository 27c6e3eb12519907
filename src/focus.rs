//! Pomodoro-style focus timer
//!
//! A countdown that is independent of task time tracking. The state machine
//! is driven one second at a time; [`run`] wires it to the terminal.

use anyhow::Result;
use std::io::Write;
use std::time::Duration;

use crate::timer::format_mmss;

/// Preset session lengths in minutes
pub const PRESETS: [u32; 3] = [5, 15, 25];

/// Session length used when none is given
pub const DEFAULT_MINUTES: u32 = 25;

/// Focus timer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FocusError {
    #[error("focus session must be at least one minute, got {0}")]
    InvalidDuration(u32),
}

/// Outcome of advancing the timer by one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Paused or already finished; nothing changed
    Idle,
    /// Still counting; seconds left
    Running(u64),
    /// Reached zero on this tick
    Finished,
}

/// Countdown state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    length: u64,
    remaining: u64,
    active: bool,
}

impl Default for FocusTimer {
    fn default() -> Self {
        let length = u64::from(DEFAULT_MINUTES) * 60;
        Self {
            length,
            remaining: length,
            active: false,
        }
    }
}

impl FocusTimer {
    pub fn new(minutes: u32) -> Result<Self, FocusError> {
        let mut timer = Self::default();
        timer.set_minutes(minutes)?;
        Ok(timer)
    }

    /// Change the session length; the timer is paused and refilled
    pub fn set_minutes(&mut self, minutes: u32) -> Result<(), FocusError> {
        if minutes == 0 {
            return Err(FocusError::InvalidDuration(minutes));
        }
        self.length = u64::from(minutes) * 60;
        self.remaining = self.length;
        self.active = false;
        Ok(())
    }

    /// Start or pause. A finished timer stays paused until reset.
    pub fn toggle(&mut self) {
        if self.remaining == 0 {
            self.active = false;
            return;
        }
        self.active = !self.active;
    }

    /// Pause and refill to the configured length
    pub fn reset(&mut self) {
        self.active = false;
        self.remaining = self.length;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            Tick::Finished
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Remaining time as `MM:SS`
    pub fn display(&self) -> String {
        format_mmss(self.remaining)
    }
}

fn tick_duration() -> Duration {
    Duration::from_secs(1)
}

/// Run `rounds` focus sessions back to back in the terminal, redrawing
/// once per second.
///
/// Ctrl-C ends the run early.
pub async fn run(minutes: u32, rounds: u32) -> Result<()> {
    let mut timer = FocusTimer::new(minutes)?;

    if PRESETS.contains(&minutes) {
        tracing::info!(minutes, rounds, "Focus session started");
    } else {
        tracing::info!(minutes, rounds, "Focus session started with custom length");
    }

    let mut stdout = std::io::stdout();
    let mut interval = tokio::time::interval(tick_duration());
    // The first tick completes immediately
    interval.tick().await;

    for round in 1..=rounds.max(1) {
        timer.reset();
        timer.toggle();

        print!("\r⏱  {} ", timer.display());
        stdout.flush()?;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match timer.tick() {
                        Tick::Finished => {
                            println!("\r⏱  {} \x07", timer.display());
                            println!("Focus session {} complete. Take a break!", round);
                            tracing::info!(minutes, round, "Focus session finished");
                            break;
                        }
                        Tick::Running(remaining) => {
                            print!("\r⏱  {} ", format_mmss(remaining));
                            stdout.flush()?;
                        }
                        Tick::Idle => {}
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    tracing::info!(
                        round,
                        paused = !timer.is_active(),
                        remaining_secs = timer.remaining(),
                        focused_secs = timer.length() - timer.remaining(),
                        "Focus session stopped early"
                    );
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}
