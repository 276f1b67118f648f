//! Weekly availability grid for a single counselor.
//!
//! A grid is the cross product of the configured days and time labels. Each
//! cell is a [`TimeBlock`]; a block that carries `booked_by` is always
//! unavailable and is left untouched by every availability edit.

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeBlock {
    pub day: String,
    pub time: String,
    pub available: bool,
    pub booked_by: Option<String>,
}

impl TimeBlock {
    pub fn new<D: Into<String>, T: Into<String>>(day: D, time: T, available: bool) -> Self {
        Self {
            day: day.into(),
            time: time.into(),
            available,
            booked_by: None,
        }
    }

    pub fn is_booked(&self) -> bool {
        self.booked_by.is_some()
    }

    /// Flips availability unless the block is booked. Returns whether it changed.
    pub fn toggle(&mut self) -> bool {
        if self.is_booked() {
            return false;
        }
        self.available = !self.available;
        true
    }

    pub fn set_available(&mut self, available: bool) -> bool {
        if self.is_booked() || self.available == available {
            return false;
        }
        self.available = available;
        true
    }

    pub fn reserve<S: Into<String>>(&mut self, client: S) -> bool {
        if !self.available || self.is_booked() {
            return false;
        }
        self.available = false;
        self.booked_by = Some(client.into());
        true
    }

    /// Frees a booked block and makes it available again.
    pub fn release(&mut self) -> bool {
        if !self.is_booked() {
            return false;
        }
        self.booked_by = None;
        self.available = true;
        true
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct WeekSchedule {
    pub days: Vec<String>,
    pub times: Vec<String>,
    pub blocks: Vec<TimeBlock>,
}

impl WeekSchedule {
    /// A grid where every block starts with the same availability.
    pub fn uniform(days: &[String], times: &[String], available: bool) -> Self {
        let blocks = days
            .iter()
            .flat_map(|day| {
                times
                    .iter()
                    .map(move |time| TimeBlock::new(day.as_str(), time.as_str(), available))
            })
            .collect();
        Self {
            days: days.to_vec(),
            times: times.to_vec(),
            blocks,
        }
    }

    /// Randomized seed data. Each block independently ends up booked by one of
    /// `clients` (when any are given), available, or blocked.
    pub fn generate<R: Rng + ?Sized>(
        days: &[String],
        times: &[String],
        rng: &mut R,
        clients: &[String],
    ) -> Self {
        let mut schedule = Self::uniform(days, times, false);
        for block in schedule.blocks.iter_mut() {
            if let Some(client) = clients.choose(rng) {
                if rng.gen_bool(0.2) {
                    block.booked_by = Some(client.clone());
                    continue;
                }
            }
            block.available = rng.gen_bool(0.6);
        }
        schedule
    }

    /// Builds a grid from stored blocks, keeping the configured ordering and
    /// appending blocks whose day or time is no longer configured.
    pub fn from_blocks(days: &[String], times: &[String], blocks: Vec<TimeBlock>) -> Self {
        let mut schedule = Self::uniform(days, times, false);
        for block in blocks {
            match schedule.position(&block.day, &block.time) {
                Some(idx) => schedule.blocks[idx] = block,
                None => schedule.blocks.push(block),
            }
        }
        schedule
    }

    fn position(&self, day: &str, time: &str) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.day == day && block.time == time)
    }

    pub fn get(&self, day: &str, time: &str) -> Option<&TimeBlock> {
        self.position(day, time).map(|idx| &self.blocks[idx])
    }

    pub fn get_mut(&mut self, day: &str, time: &str) -> Option<&mut TimeBlock> {
        let idx = self.position(day, time)?;
        Some(&mut self.blocks[idx])
    }

    /// Silent no-op for booked or unknown slots.
    pub fn toggle(&mut self, day: &str, time: &str) -> bool {
        self.get_mut(day, time).map_or(false, TimeBlock::toggle)
    }

    /// Returns the number of blocks that changed.
    pub fn set_all(&mut self, available: bool) -> usize {
        self.blocks
            .iter_mut()
            .map(|block| block.set_available(available))
            .filter(|changed| *changed)
            .count()
    }

    pub fn reserve(&mut self, day: &str, time: &str, client: &str) -> bool {
        self.get_mut(day, time)
            .map_or(false, |block| block.reserve(client))
    }

    pub fn release(&mut self, day: &str, time: &str) -> bool {
        self.get_mut(day, time).map_or(false, TimeBlock::release)
    }

    pub fn available_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.available).count()
    }

    pub fn booked_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_booked()).count()
    }
}
