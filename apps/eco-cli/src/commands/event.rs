// event.rs — Event subcommands: add, toggle, list.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use eco_engine::{DisposalEvent, WasteCategory};
use uuid::Uuid;

use crate::host::{print_summary, Host};

#[derive(Subcommand)]
pub enum EventCommands {
    /// Log a disposal event and re-evaluate progress.
    Add {
        /// User the event belongs to.
        #[arg(long)]
        user: String,
        /// organic, recyclable, hazardous, or other.
        #[arg(long)]
        category: WasteCategory,
        /// Weight in kilograms.
        #[arg(long)]
        weight: Option<f64>,
        /// Mark the waste as recycled.
        #[arg(long)]
        recycled: bool,
        /// Disposal time (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Free-text note.
        #[arg(long)]
        description: Option<String>,
        /// ID of the facility the waste was taken to.
        #[arg(long)]
        center: Option<u64>,
    },
    /// Flip an event's recycled flag and re-evaluate progress.
    Toggle {
        #[arg(long)]
        user: String,
        /// Event ID.
        id: Uuid,
    },
    /// Show the most recent events.
    List {
        #[arg(long)]
        user: String,
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &EventCommands, host: &Host) -> anyhow::Result<()> {
    match cmd {
        EventCommands::Add {
            user,
            category,
            weight,
            recycled,
            at,
            description,
            center,
        } => {
            let disposed_at = at.unwrap_or_else(Utc::now);
            let mut event =
                DisposalEvent::new(user.as_str(), *category, disposed_at).recycled(*recycled);
            if let Some(kg) = weight {
                event = event.with_weight(*kg)?;
            }
            if let Some(text) = description {
                event = event.with_description(text.as_str());
            }
            if let Some(id) = center {
                if !host.engine.locator().catalog().iter().any(|f| f.facility_id == *id) {
                    anyhow::bail!("Unknown facility: {}", id);
                }
                event = event.at_facility(*id);
            }
            add_event(host, event)
        }
        EventCommands::Toggle { user, id } => toggle_recycled(host, user, *id),
        EventCommands::List { user, n } => list_events(host, user, *n),
    }
}

fn add_event(host: &Host, event: DisposalEvent) -> anyhow::Result<()> {
    let store = host.user(&event.user_id)?;
    let _guard = store.lock()?;
    let mut events = store.events()?;
    events.push(event.clone());
    store.save_events(&events)?;

    println!("Event logged: {}", event.event_id);
    print_summary(&host.reevaluate(&store)?);
    Ok(())
}

fn toggle_recycled(host: &Host, user: &str, id: Uuid) -> anyhow::Result<()> {
    let store = host.user(user)?;
    let _guard = store.lock()?;
    let mut events = store.events()?;
    let event = events
        .iter_mut()
        .find(|e| e.event_id == id)
        .ok_or_else(|| anyhow::anyhow!("Event not found: {}", id))?;
    event.recycled = !event.recycled;
    let now_recycled = event.recycled;
    store.save_events(&events)?;

    println!(
        "Event {} marked as {}",
        id,
        if now_recycled { "recycled" } else { "not recycled" }
    );
    print_summary(&host.reevaluate(&store)?);
    Ok(())
}

fn list_events(host: &Host, user: &str, n: usize) -> anyhow::Result<()> {
    let mut events = host.user(user)?.events()?;
    if events.is_empty() {
        println!("No events found.");
        return Ok(());
    }
    events.sort_by(|a, b| b.disposed_at.cmp(&a.disposed_at));

    println!(
        "{:<38} {:<12} {:>9} {:<9} DATE",
        "ID", "CATEGORY", "KG", "RECYCLED"
    );
    for event in events.iter().take(n) {
        let weight = event
            .weight_kg
            .map(|w| format!("{:.2}", w))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<12} {:>9} {:<9} {}",
            event.event_id.to_string(),
            event.category,
            weight,
            if event.recycled { "yes" } else { "no" },
            event.disposed_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
