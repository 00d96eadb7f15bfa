//! Habit management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use habitline_core::{summarize, Config, Habit, HabitDb};

use super::{owned_habit, resolve_day, CmdResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
    },
    /// List habits
    List,
    /// Delete a habit and its history
    Delete {
        /// Habit ID
        id: String,
    },
    /// Show streak statistics for a habit
    Show {
        /// Habit ID
        id: String,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
    },
}

pub fn run(action: HabitAction) -> CmdResult {
    let config = Config::load()?;
    let db = HabitDb::open()?;

    match action {
        HabitAction::Add { name } => {
            let habit = Habit::new(&config.account.owner_id, &name, Utc::now())?;
            db.create_habit(&habit)?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List => {
            let habits = db.list_habits(&config.account.owner_id)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Delete { id } => {
            let habit = owned_habit(&db, &config, &id)?;
            db.delete_habit(&habit.id)?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Show { id, as_of } => {
            let zone = config.zone();
            let day = resolve_day(as_of.as_deref(), zone)?;
            let habit = owned_habit(&db, &config, &id)?;
            let summary = summarize(&habit.completions, day, zone);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
