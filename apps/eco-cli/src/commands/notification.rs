// notification.rs — Inbox subcommands: list, read.

use clap::Subcommand;
use uuid::Uuid;

use crate::host::Host;

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// Show notifications, newest first.
    List {
        #[arg(long)]
        user: String,
        /// Number of notifications to show.
        #[arg(short, default_value = "50")]
        n: usize,
        /// Only unread notifications.
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification as read, or all of them when no ID is given.
    Read {
        #[arg(long)]
        user: String,
        /// Notification ID.
        id: Option<Uuid>,
    },
}

pub fn execute(cmd: &NotificationCommands, host: &Host) -> anyhow::Result<()> {
    match cmd {
        NotificationCommands::List { user, n, unread } => list(host, user, *n, *unread),
        NotificationCommands::Read { user, id } => mark_read(host, user, *id),
    }
}

fn list(host: &Host, user: &str, n: usize, unread_only: bool) -> anyhow::Result<()> {
    let inbox = host.user(user)?.inbox()?;
    let shown: Vec<_> = inbox
        .notifications()
        .iter()
        .filter(|note| !unread_only || !note.read)
        .take(n)
        .collect();
    if shown.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    println!("{} unread of {}.", inbox.unread_count(), inbox.notifications().len());
    for note in shown {
        println!(
            "{} {}  {}  {}: {}",
            if note.read { " " } else { "*" },
            note.notification_id,
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.title,
            note.body
        );
    }
    Ok(())
}

fn mark_read(host: &Host, user: &str, id: Option<Uuid>) -> anyhow::Result<()> {
    let store = host.user(user)?;
    let _guard = store.lock()?;
    let mut inbox = store.inbox()?;

    let changed = match id {
        Some(id) => usize::from(inbox.mark_read(id)?),
        None => inbox.mark_all_read(),
    };
    if changed > 0 {
        store.save_inbox(&inbox)?;
    }
    println!("Marked {} notification(s) as read.", changed);
    Ok(())
}
