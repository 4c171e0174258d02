//! System status command.

use anyhow::Result;
use console::style;

use quill_core::repository::conversation::ConversationRepository;
use quill_core::repository::notification::NotificationRepository;
use quill_infra::sqlite::account::SqliteAccountRepository;
use quill_infra::sqlite::notification::SqliteNotificationRepository;

use crate::state::AppState;

/// Display config summary and storage counts.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let repo = state.conversation_service.repo();
    let conversations = repo.count_conversations().await?;
    let turns = repo.count_turns().await?;
    let accounts = SqliteAccountRepository::new(state.db_pool.clone())
        .count_accounts()
        .await?;
    let unread = SqliteNotificationRepository::new(state.db_pool.clone())
        .count_unread()
        .await?;
    let provider_configured = state.pipeline.gateway().is_configured();
    let config = &state.config;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "config": &*state.config,
            "provider_configured": provider_configured,
            "accounts": accounts,
            "conversations": conversations,
            "turns": turns,
            "unread_notifications": unread,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} Quill v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Config ──").dim());
    println!("  Data dir:      {}", state.data_dir.display());
    println!("  Credit cost:   {}", config.credit_cost);
    println!("  Context:       {} turns", config.context_window);
    println!(
        "  Provider:      {} ({})",
        config.completion.model,
        if provider_configured {
            style("configured".to_string()).green()
        } else {
            style(format!("simulated, set {}", config.completion.api_key_env)).yellow()
        }
    );
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Accounts:      {}", style(accounts).bold());
    println!("  Conversations: {}", style(conversations).bold());
    println!("  Turns:         {}", turns);
    println!("  Unread:        {}", unread);
    println!();

    Ok(())
}
