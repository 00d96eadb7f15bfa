//! Daily tracking commands: the "today" view and the done toggle.

use clap::Subcommand;
use habitline_core::{Config, HabitDb, HabitView};

use super::{owned_habit, resolve_day, CmdResult};

#[derive(Subcommand)]
pub enum TrackAction {
    /// Show habits with their done state and current streak
    List {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit done, or undo it if already done
    Toggle {
        /// Habit ID
        id: String,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
    },
}

/// One line of the text view, e.g. `[x] Read  (3 days streak)`.
fn render_line(view: &HabitView, show_zero_streaks: bool) -> String {
    let mark = if view.completed { 'x' } else { ' ' };
    let label = match (&view.streak_label, show_zero_streaks) {
        (Some(label), _) => Some(label.clone()),
        (None, true) => Some("0 days streak".to_string()),
        (None, false) => None,
    };
    match label {
        Some(label) => format!("[{mark}] {}  ({label})", view.name),
        None => format!("[{mark}] {}", view.name),
    }
}

pub fn run(action: TrackAction) -> CmdResult {
    let config = Config::load()?;
    let zone = config.zone();
    let db = HabitDb::open()?;

    match action {
        TrackAction::List { as_of, json } => {
            let day = resolve_day(as_of.as_deref(), zone)?;
            let habits = db.list_habits(&config.account.owner_id)?;
            for habit in &habits {
                let duplicates = habit.duplicate_markers(zone);
                if duplicates > 0 {
                    tracing::warn!(habit_id = %habit.id, duplicates, "same-day completion markers found");
                }
            }
            let views: Vec<HabitView> = habits
                .iter()
                .map(|habit| HabitView::build(habit, day, zone))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else if views.is_empty() {
                println!("No habits to track yet");
            } else {
                for view in &views {
                    println!("{}", render_line(view, config.display.show_zero_streaks));
                }
            }
        }
        TrackAction::Toggle { id, as_of } => {
            let day = resolve_day(as_of.as_deref(), zone)?;
            let mut habit = owned_habit(&db, &config, &id)?;
            let outcome = habit.toggle(day, zone);
            db.save_completions(&habit)?;
            tracing::info!(habit_id = %habit.id, %day, ?outcome, "habit toggled");
            println!("{}", serde_json::to_string_pretty(&HabitView::build(&habit, day, zone))?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(completed: bool, streak: u32) -> HabitView {
        HabitView {
            id: "h1".into(),
            name: "Read".into(),
            completed,
            streak,
            streak_label: habitline_core::streak_label(streak),
        }
    }

    #[test]
    fn renders_done_habit_with_streak() {
        assert_eq!(render_line(&view(true, 3), false), "[x] Read  (3 days streak)");
        assert_eq!(render_line(&view(true, 1), false), "[x] Read  (1 day streak)");
    }

    #[test]
    fn omits_zero_streak_unless_configured() {
        assert_eq!(render_line(&view(false, 0), false), "[ ] Read");
        assert_eq!(render_line(&view(false, 0), true), "[ ] Read  (0 days streak)");
    }
}
