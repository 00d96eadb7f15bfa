//! # Habitline Core Library
//!
//! This library provides the core logic for the Habitline habit tracker.
//! The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Streak Engine**: pure functions turning a completion history and an
//!   explicit reference date into a consecutive-day streak
//! - **Habit**: the habit aggregate and its daily toggle policy
//! - **Storage**: SQLite-based habit storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`compute_streak`]: current streak as of a given day
//! - [`CalendarZone`]: timezone policy for mapping timestamps to days
//! - [`Habit`]: habit with its completion markers
//! - [`HabitDb`]: habit persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod habit;
pub mod storage;
pub mod streak;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Habit, HabitView, ToggleOutcome};
pub use storage::{Config, HabitDb};
pub use streak::{compute_streak, streak_label, summarize, CalendarZone, StreakSummary};
