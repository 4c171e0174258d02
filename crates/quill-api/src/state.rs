//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Core services are generic over repository/provider traits; AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use quill_core::chat::context::ContextAssembler;
use quill_core::chat::lock::ConversationLocks;
use quill_core::chat::pipeline::ConversationPipeline;
use quill_core::chat::service::ConversationService;
use quill_core::ledger::CreditLedger;
use quill_core::live::bus::NotificationBus;
use quill_core::live::dispatcher::NotificationDispatcher;
use quill_core::live::registry::ConnectionRegistry;
use quill_core::llm::gateway::CompletionGateway;
use quill_infra::config::{load_config, resolve_data_dir};
use quill_infra::llm::GeminiProvider;
use quill_infra::sqlite::account::SqliteAccountRepository;
use quill_infra::sqlite::api_key::SqliteApiKeyStore;
use quill_infra::sqlite::conversation::SqliteConversationRepository;
use quill_infra::sqlite::notification::SqliteNotificationRepository;
use quill_infra::sqlite::pool::{DatabasePool, database_url};
use quill_types::config::QuillConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcretePipeline =
    ConversationPipeline<SqliteConversationRepository, SqliteAccountRepository, GeminiProvider>;

pub type ConcreteConversationService = ConversationService<SqliteConversationRepository>;

pub type ConcreteDispatcher = NotificationDispatcher<SqliteNotificationRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ConcretePipeline>,
    pub conversation_service: Arc<ConcreteConversationService>,
    pub dispatcher: Arc<ConcreteDispatcher>,
    pub api_keys: SqliteApiKeyStore,
    pub config: Arc<QuillConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_pool = DatabasePool::new(&format!("{}?mode=rwc", database_url(&data_dir))).await?;
        let provider = GeminiProvider::from_config(&config.completion)?;

        Ok(Self::assemble(data_dir, db_pool, config, provider))
    }

    /// Wire services over an open pool.
    pub fn assemble(
        data_dir: PathBuf,
        db_pool: DatabasePool,
        config: QuillConfig,
        provider: Option<GeminiProvider>,
    ) -> Self {
        let ledger = CreditLedger::new(SqliteAccountRepository::new(db_pool.clone()))
            .with_max_attempts(config.ledger_max_attempts);
        let gateway = CompletionGateway::new(provider, &config.completion);
        let locks = ConversationLocks::new();
        let pipeline = ConversationPipeline::new(
            SqliteConversationRepository::new(db_pool.clone()),
            ledger,
            gateway,
            ContextAssembler::new(config.context_window),
            config.credit_cost,
            locks.clone(),
        );

        let conversation_service =
            ConversationService::new(SqliteConversationRepository::new(db_pool.clone()), locks);

        let dispatcher = NotificationDispatcher::new(
            SqliteNotificationRepository::new(db_pool.clone()),
            Arc::new(ConnectionRegistry::new()),
            NotificationBus::new(config.notification_channel_capacity),
        );

        Self {
            pipeline: Arc::new(pipeline),
            conversation_service: Arc::new(conversation_service),
            dispatcher: Arc::new(dispatcher),
            api_keys: SqliteApiKeyStore::new(db_pool.clone()),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
