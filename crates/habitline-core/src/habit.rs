//! Habit aggregate and the daily toggle policy.
//!
//! A habit owns its completion history. Whether it is done "today" is never
//! stored; it is always read back from the history for an explicit date, so
//! the tracking view and the streak can't disagree.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::streak::{self, CalendarZone};

/// A user-defined daily habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    /// Account that owns the habit
    pub owner_id: String,
    /// Trimmed, non-empty display name
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Completion markers, one per completed day (older stores may hold duplicates)
    #[serde(default)]
    pub completions: Vec<DateTime<Utc>>,
}

/// Result of [`Habit::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The day was not done and is now marked done
    Completed,
    /// The day was done and every marker for it was removed
    Uncompleted,
}

impl Habit {
    /// Create a habit with an empty history.
    ///
    /// # Errors
    /// Returns an error if the name or owner is blank after trimming.
    pub fn new(
        owner_id: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(ValidationError::EmptyOwner);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: normalize_name(name)?,
            created_at,
            completions: Vec::new(),
        })
    }

    /// Whether the habit has a marker on `day`.
    pub fn completed_on(&self, day: NaiveDate, zone: CalendarZone) -> bool {
        streak::is_completed_on(&self.completions, day, zone)
    }

    /// Current streak as of `day`.
    pub fn streak(&self, day: NaiveDate, zone: CalendarZone) -> u32 {
        streak::compute_streak(&self.completions, day, zone)
    }

    /// Number of markers that normalize to the same day as another marker.
    pub fn duplicate_markers(&self, zone: CalendarZone) -> usize {
        self.completions.len() - streak::completed_days(&self.completions, zone).len()
    }

    /// Mark `day` done. Returns `false` if it already was; no second marker
    /// is written for a day.
    pub fn mark_done(&mut self, day: NaiveDate, zone: CalendarZone) -> bool {
        if self.completed_on(day, zone) {
            return false;
        }
        self.completions.push(zone.start_of_day(day));
        true
    }

    /// Remove every marker on `day`. Returns how many were removed.
    pub fn unmark(&mut self, day: NaiveDate, zone: CalendarZone) -> usize {
        let before = self.completions.len();
        self.completions.retain(|ts| zone.calendar_day(*ts) != day);
        before - self.completions.len()
    }

    /// Flip the done state of `day`.
    pub fn toggle(&mut self, day: NaiveDate, zone: CalendarZone) -> ToggleOutcome {
        if self.unmark(day, zone) > 0 {
            ToggleOutcome::Uncompleted
        } else {
            self.completions.push(zone.start_of_day(day));
            ToggleOutcome::Completed
        }
    }
}

fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Row of the tracking view: what a client renders for one habit on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitView {
    pub id: String,
    pub name: String,
    pub completed: bool,
    pub streak: u32,
    pub streak_label: Option<String>,
}

impl HabitView {
    /// Project `habit` onto `day` for the tracking view.
    pub fn build(habit: &Habit, day: NaiveDate, zone: CalendarZone) -> Self {
        let streak = habit.streak(day, zone);
        Self {
            id: habit.id.clone(),
            name: habit.name.clone(),
            completed: habit.completed_on(day, zone),
            streak,
            streak_label: streak::streak_label(streak),
        }
    }
}
