use thiserror::Error;

/// Errors from repository operations (used by trait definitions in quill-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the credit ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient credits: balance {balance}, required {required}")]
    InsufficientCredits { balance: i64, required: u32 },

    #[error("account not found")]
    AccountNotFound,

    #[error("balance update conflicted {attempts} times")]
    Conflict { attempts: u32 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Why a submitted message was not exchanged.
///
/// Every variant except `Repository` is raised before anything is written.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("message content is required")]
    EmptyContent,

    #[error("conversation not found")]
    ConversationNotFound,

    #[error("account not found")]
    AccountNotFound,

    #[error("insufficient credits: balance {balance}, required {required}")]
    InsufficientCredits { balance: i64, required: u32 },

    #[error("credit balance busy, retry the request")]
    Transient,

    #[error("exchange task failed: {0}")]
    Aborted(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<LedgerError> for ExchangeError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientCredits { balance, required } => {
                ExchangeError::InsufficientCredits { balance, required }
            }
            LedgerError::AccountNotFound => ExchangeError::AccountNotFound,
            LedgerError::Conflict { .. } => ExchangeError::Transient,
            LedgerError::Repository(e) => ExchangeError::Repository(e),
        }
    }
}

/// Errors from conversation management.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation not found")]
    NotFound,

    #[error("invalid title: {0}")]
    InvalidTitle(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from notification dispatch and read tracking.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification not found")]
    NotFound,

    #[error("invalid notification: {0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
