// goal.rs — Goal subcommands: add, list.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use eco_engine::{Goal, GoalType, GoalUnit};

use crate::host::{print_summary, Host};

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a goal and evaluate it against existing events.
    Add {
        #[arg(long)]
        user: String,
        /// reduce, recycle, or track.
        #[arg(long = "type")]
        goal_type: GoalType,
        /// Target value (must be > 0).
        #[arg(long)]
        target: f64,
        /// kg or count.
        #[arg(long, default_value = "kg")]
        unit: GoalUnit,
        /// Only count events at or after this time (RFC 3339).
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Only count events at or before this time (RFC 3339).
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Re-evaluate and list all goals.
    List {
        #[arg(long)]
        user: String,
    },
}

pub fn execute(cmd: &GoalCommands, host: &Host) -> anyhow::Result<()> {
    match cmd {
        GoalCommands::Add {
            user,
            goal_type,
            target,
            unit,
            start,
            end,
        } => {
            let goal = Goal::new(user.as_str(), *goal_type, *target, *unit)?
                .with_window(*start, *end)?;
            let store = host.user(user)?;
            let _guard = store.lock()?;
            let mut goals = store.goals()?;
            goals.push(goal.clone());
            store.save_goals(&goals)?;
            println!("Goal created: {}", goal.goal_id);
            print_summary(&host.reevaluate(&store)?);
            Ok(())
        }
        GoalCommands::List { user } => list_goals(host, user),
    }
}

fn list_goals(host: &Host, user: &str) -> anyhow::Result<()> {
    let store = host.user(user)?;
    {
        let _guard = store.lock()?;
        print_summary(&host.reevaluate(&store)?);
    }

    let mut goals = store.goals()?;
    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }
    goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    println!(
        "{:<38} {:<8} {:>10} {:>10} {:<6} {:<10} WINDOW",
        "ID", "TYPE", "CURRENT", "TARGET", "UNIT", "STATUS"
    );
    for goal in &goals {
        let window = match (goal.window_start, goal.window_end) {
            (None, None) => "all time".to_string(),
            (start, end) => format!(
                "{} .. {}",
                start.map_or("-".to_string(), |s| s.format("%Y-%m-%d").to_string()),
                end.map_or("-".to_string(), |e| e.format("%Y-%m-%d").to_string())
            ),
        };
        println!(
            "{:<38} {:<8} {:>10.2} {:>10.2} {:<6} {:<10} {}",
            goal.goal_id.to_string(),
            goal.goal_type,
            goal.current_value,
            goal.target_value,
            goal.unit,
            if goal.completed { "completed" } else { "active" },
            window
        );
    }
    Ok(())
}
