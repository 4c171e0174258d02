//! Offline notification commands.
//!
//! A CLI process has no live sessions, so these only persist the record.
//! Recipients see it on their next notification list.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use quill_types::account::AccountId;
use quill_types::notification::NotificationScope;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum NotifyTarget {
    /// Notify every account.
    Broadcast {
        #[arg(long)]
        title: String,

        #[arg(long)]
        message: String,
    },

    /// Notify one account.
    Account {
        /// Recipient account id (UUID).
        account_id: AccountId,

        #[arg(long)]
        title: String,

        #[arg(long)]
        message: String,
    },
}

pub async fn notify(state: &AppState, target: NotifyTarget, json: bool) -> Result<()> {
    let (scope, title, message) = match target {
        NotifyTarget::Broadcast { title, message } => {
            (NotificationScope::Broadcast, title, message)
        }
        NotifyTarget::Account {
            account_id,
            title,
            message,
        } => (NotificationScope::Targeted { account_id }, title, message),
    };

    let report = state.dispatcher.dispatch(scope, &title, &message).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let recipient = match scope.target() {
        Some(account_id) => format!("account {account_id}"),
        None => "everyone".to_string(),
    };
    println!();
    println!(
        "  {} Notification {} stored for {}",
        style("✓").green().bold(),
        style(report.notification.id).cyan(),
        recipient
    );
    println!();
    Ok(())
}
