//! Per-side countdown clocks.

use gambit_core::Side;
use serde::Serialize;

/// Outcome of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing ran: no owner, paused, or not in a playing phase.
    Stopped,
    /// `side` lost one second and has `remaining` left.
    Decremented { side: Side, remaining: u32 },
    /// `side` just reached zero.
    FlagFell(Side),
    /// `side` was already at zero; the clock stays floored.
    Expired(Side),
}

/// Remaining time for both sides, in whole seconds.
///
/// At most one side owns the running clock. Pausing keeps the owner and
/// only suspends decrementing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockState {
    pub white: u32,
    pub black: u32,
    pub running: Option<Side>,
    pub paused: bool,
}

impl ClockState {
    /// Both sides at `seconds`, not running.
    pub const fn new(seconds: u32) -> Self {
        ClockState {
            white: seconds,
            black: seconds,
            running: None,
            paused: false,
        }
    }

    pub fn remaining(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    fn remaining_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    /// Hands the running clock to `side`.
    pub fn run_for(&mut self, side: Side) {
        self.running = Some(side);
    }

    /// Stops the clock for good (game over or reset).
    pub fn stop(&mut self) {
        self.running = None;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Returns the side whose time is currently draining, if any.
    pub fn ticking_side(&self) -> Option<Side> {
        if self.paused {
            None
        } else {
            self.running
        }
    }

    /// Takes one second off the running side, flooring at zero.
    pub fn tick(&mut self) -> Tick {
        let Some(side) = self.ticking_side() else {
            return Tick::Stopped;
        };
        let remaining = self.remaining_mut(side);
        if *remaining == 0 {
            return Tick::Expired(side);
        }
        *remaining -= 1;
        if *remaining == 0 {
            Tick::FlagFell(side)
        } else {
            Tick::Decremented {
                side,
                remaining: *remaining,
            }
        }
    }
}
