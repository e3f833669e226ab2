// progress.rs — Evaluation and reporting: evaluate, achievements, stats.

use eco_engine::ProgressEngine;

use crate::host::{print_summary, Host};

pub fn evaluate(host: &Host, user: &str) -> anyhow::Result<()> {
    let store = host.user(user)?;
    let _guard = store.lock()?;
    let summary = host.reevaluate(&store)?;
    println!(
        "Evaluated {} goal(s); {} new achievement(s).",
        summary.goals_evaluated,
        summary.new_unlocks.len()
    );
    print_summary(&summary);

    let unread = store.inbox()?.unread_count();
    if unread > 0 {
        println!("{} unread notification(s).", unread);
    }
    Ok(())
}

pub fn achievements(host: &Host, user: &str) -> anyhow::Result<()> {
    let unlocks = host.user(user)?.unlocks()?;

    for definition in host.engine.achievement_engine().catalog() {
        match unlocks
            .iter()
            .find(|u| u.achievement_key == definition.key)
        {
            Some(unlock) => println!(
                "[x] {:<18} {} (unlocked {})",
                definition.title,
                definition.description,
                unlock.unlocked_at.format("%Y-%m-%d")
            ),
            None => println!("[ ] {:<18} {}", definition.title, definition.description),
        }
    }
    println!();
    println!(
        "{} of {} unlocked.",
        unlocks.len(),
        host.engine.achievement_engine().catalog().len()
    );
    Ok(())
}

pub fn stats(host: &Host, user: &str, json: bool) -> anyhow::Result<()> {
    let events = host.user(user)?.events()?;
    let stats = ProgressEngine::statistics(&events);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Entries:         {}", stats.total_entries);
    println!("Total weight:    {:.2} kg", stats.total_weight_kg);
    println!(
        "Recycled:        {} ({:.2} kg, {:.1}% of entries)",
        stats.recycled_count, stats.recycled_weight_kg, stats.recycling_rate_pct
    );
    println!("CO2 saved:       {:.2} kg", stats.co2_saved_kg);
    println!("Trees saved:     {:.2}", stats.trees_saved);
    println!(
        "Still possible:  {:.2} kg CO2, {:.2} trees",
        stats.potential_co2_kg, stats.potential_trees
    );

    if !stats.by_category.is_empty() {
        println!();
        for (category, totals) in &stats.by_category {
            println!(
                "  {:<12} {:>4} entries {:>9.2} kg",
                category, totals.count, totals.weight_kg
            );
        }
    }
    if !stats.monthly.is_empty() {
        println!();
        for (month, totals) in &stats.monthly {
            println!(
                "  {:<12} {:>4} entries {:>9.2} kg",
                month, totals.count, totals.weight_kg
            );
        }
    }
    Ok(())
}
