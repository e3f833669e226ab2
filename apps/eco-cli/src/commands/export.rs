// export.rs — CSV export of a user's disposal events.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::Context;
use eco_engine::DisposalEvent;

use crate::host::Host;

const HEADER: [&str; 6] = [
    "Date",
    "Waste Type",
    "Weight (kg)",
    "Description",
    "Recycled",
    "Facility",
];

pub fn execute(host: &Host, user: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let events = host.user(user)?.events()?;
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_events(&events, file)?;
            eprintln!("Exported {} event(s) to {}", events.len(), path.display());
        }
        None => write_events(&events, io::stdout().lock())?,
    }
    Ok(())
}

/// Write events oldest first. Missing values are empty cells.
pub fn write_events<W: io::Write>(events: &[DisposalEvent], out: W) -> anyhow::Result<()> {
    let mut sorted: Vec<&DisposalEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.disposed_at);

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for event in sorted {
        writer.write_record([
            event.disposed_at.format("%Y-%m-%d").to_string(),
            event.category.as_str().to_string(),
            event.weight_kg.map(|w| w.to_string()).unwrap_or_default(),
            event.description.clone().unwrap_or_default(),
            if event.recycled { "Yes" } else { "No" }.to_string(),
            event
                .recycling_center_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
