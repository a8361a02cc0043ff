use chrono::{DateTime, TimeDelta, Utc};

use crate::models::LAMP_COUNT;

/// Desired state of the six lamps: commanded on/off, auto-mode flag and an
/// optional timer expiry per slot.
///
/// A timer only ever runs on a lamp that is on and not in auto-mode. Manual
/// commands clear it immediately; `tick` sweeps whatever is left over.
///
/// Every method taking a lamp index returns `None` for an index outside
/// `0..LAMP_COUNT` and leaves the bank untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LampBank {
    commands: [bool; LAMP_COUNT],
    auto_modes: [bool; LAMP_COUNT],
    timers: [Option<DateTime<Utc>>; LAMP_COUNT],
}

impl LampBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<bool> {
        self.commands.to_vec()
    }

    pub fn auto_modes(&self) -> Vec<bool> {
        self.auto_modes.to_vec()
    }

    pub fn is_on(&self, index: usize) -> Option<bool> {
        self.commands.get(index).copied()
    }

    pub fn is_auto(&self, index: usize) -> Option<bool> {
        self.auto_modes.get(index).copied()
    }

    pub fn timer(&self, index: usize) -> Option<DateTime<Utc>> {
        self.timers.get(index).copied().flatten()
    }

    /// Flip the lamp and take it out of auto-mode. Returns the new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let on = !*self.commands.get(index)?;
        self.set_manual(index, on);
        Some(on)
    }

    pub fn set_state(&mut self, index: usize, on: bool) -> Option<bool> {
        if index >= LAMP_COUNT {
            return None;
        }
        self.set_manual(index, on);
        Some(on)
    }

    pub fn set_all(&mut self, on: bool) {
        for index in 0..LAMP_COUNT {
            self.set_manual(index, on);
        }
    }

    /// Switch the lamp on for `minutes`, or indefinitely when `minutes <= 0`.
    ///
    /// Returns the expiry that was set, `Some(None)` meaning no timer.
    pub fn set_timer(
        &mut self,
        index: usize,
        minutes: i64,
        now: DateTime<Utc>,
    ) -> Option<Option<DateTime<Utc>>> {
        if index >= LAMP_COUNT {
            return None;
        }
        let expiry = if minutes > 0 {
            TimeDelta::try_minutes(minutes).and_then(|d| now.checked_add_signed(d))
        } else {
            None
        };
        self.commands[index] = true;
        self.auto_modes[index] = false;
        self.timers[index] = expiry;
        Some(expiry)
    }

    /// Flip auto-mode. The command and any timer are left as they are.
    pub fn toggle_auto(&mut self, index: usize) -> Option<bool> {
        let auto = !*self.auto_modes.get(index)?;
        self.auto_modes[index] = auto;
        Some(auto)
    }

    /// One pass of the timer engine. Returns the lamps whose timer expired
    /// and were switched off.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<usize> {
        let mut expired = Vec::new();
        for index in 0..LAMP_COUNT {
            if let Some(expiry) = self.timers[index] {
                if now >= expiry {
                    self.commands[index] = false;
                    self.timers[index] = None;
                    expired.push(index);
                }
            }
            if !self.commands[index] || self.auto_modes[index] {
                self.timers[index] = None;
            }
        }
        expired
    }

    /// Whole seconds left on the lamp's timer, rounded up so that the value
    /// only reaches 0 once the timer is due. 0 when no timer is set.
    pub fn remaining_seconds(&self, index: usize, now: DateTime<Utc>) -> i64 {
        match self.timer(index) {
            Some(expiry) if expiry > now => {
                let millis = (expiry - now).num_milliseconds();
                (millis + 999) / 1000
            }
            _ => 0,
        }
    }

    pub fn remaining_all(&self, now: DateTime<Utc>) -> Vec<i64> {
        (0..LAMP_COUNT)
            .map(|index| self.remaining_seconds(index, now))
            .collect()
    }

    fn set_manual(&mut self, index: usize, on: bool) {
        self.commands[index] = on;
        self.auto_modes[index] = false;
        self.timers[index] = None;
    }
}
