//! Conversation pipeline: one credit-metered message exchange.
//!
//! Every call to [`ConversationPipeline::submit_message`] walks the same
//! states:
//!
//! 1. validate the content
//! 2. authorize the conversation (exists, owned by the caller)
//! 3. debit the fixed exchange cost
//! 4. persist the user turn
//! 5. assemble context (the just-written turn is dropped from the window)
//! 6. ask the completion gateway (never fails)
//! 7. persist the assistant turn
//! 8. auto-title a conversation still carrying the default title
//!
//! Steps 1-3 write nothing, so a rejection there is side-effect free. Once
//! the debit succeeded the remaining steps run on their own task and finish
//! even if the caller stops waiting; the debit is never rolled back.
//!
//! Exchanges on the same conversation are serialized with the shared
//! [`ConversationLocks`] table, so turns persist in arrival order and renames
//! or deletes wait for an exchange in flight. Different conversations
//! proceed independently.

use std::sync::Arc;

use chrono::Utc;
use quill_types::account::AccountId;
use quill_types::chat::{Conversation, Exchange, Turn};
use quill_types::error::ExchangeError;
use tracing::{Instrument, info};
use uuid::Uuid;

use super::context::ContextAssembler;
use super::lock::ConversationLocks;
use super::title::derive_title;
use crate::ledger::CreditLedger;
use crate::llm::gateway::CompletionGateway;
use crate::llm::provider::CompletionProvider;
use crate::repository::account::AccountRepository;
use crate::repository::conversation::ConversationRepository;

/// Default credits charged per exchange.
pub const DEFAULT_CREDIT_COST: u32 = 10;

pub struct ConversationPipeline<C, A, P>
where
    C: ConversationRepository,
    A: AccountRepository,
    P: CompletionProvider,
{
    conversations: C,
    ledger: CreditLedger<A>,
    gateway: CompletionGateway<P>,
    assembler: ContextAssembler,
    credit_cost: u32,
    locks: ConversationLocks,
}

impl<C, A, P> ConversationPipeline<C, A, P>
where
    C: ConversationRepository + 'static,
    A: AccountRepository + 'static,
    P: CompletionProvider + 'static,
{
    pub fn new(
        conversations: C,
        ledger: CreditLedger<A>,
        gateway: CompletionGateway<P>,
        assembler: ContextAssembler,
        credit_cost: u32,
        locks: ConversationLocks,
    ) -> Self {
        Self {
            conversations,
            ledger,
            gateway,
            assembler,
            credit_cost,
            locks,
        }
    }

    pub fn ledger(&self) -> &CreditLedger<A> {
        &self.ledger
    }

    pub fn gateway(&self) -> &CompletionGateway<P> {
        &self.gateway
    }

    pub fn credit_cost(&self) -> u32 {
        self.credit_cost
    }

    /// Run one exchange for `account_id` on `conversation_id`.
    ///
    /// Surrounding whitespace is stripped from `text` before it is stored.
    #[tracing::instrument(
        name = "submit_message",
        skip_all,
        fields(account_id = %account_id, conversation_id = %conversation_id)
    )]
    pub async fn submit_message(
        self: &Arc<Self>,
        account_id: &AccountId,
        conversation_id: &Uuid,
        text: &str,
    ) -> Result<Exchange, ExchangeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExchangeError::EmptyContent);
        }

        let turn_lock = self.locks.acquire(*conversation_id).await;

        // Read under the lock so the title check below sees earlier exchanges.
        let conversation = self
            .conversations
            .find_conversation(conversation_id)
            .await?
            .filter(|c| c.is_owned_by(account_id))
            .ok_or(ExchangeError::ConversationNotFound)?;

        let remaining_credits = self.ledger.try_debit(account_id, self.credit_cost).await?;

        // Charged: the rest must not be cancelled with the caller's future.
        let pipeline = Arc::clone(self);
        let text = text.to_string();
        let task = tokio::spawn(
            async move {
                let _turn_lock = turn_lock;
                pipeline
                    .finish_exchange(conversation, text, remaining_credits)
                    .await
            }
            .in_current_span(),
        );

        task.await
            .map_err(|e| ExchangeError::Aborted(e.to_string()))?
    }

    async fn finish_exchange(
        &self,
        conversation: Conversation,
        text: String,
        remaining_credits: i64,
    ) -> Result<Exchange, ExchangeError> {
        let conversation_id = &conversation.id;

        let user_turn = self
            .conversations
            .insert_turn(&Turn::user(*conversation_id, text.clone()))
            .await?;

        let context = self
            .assembler
            .build_context(&self.conversations, conversation_id)
            .await?
            .without_latest_turn(&user_turn.id);

        let outcome = self.gateway.complete(context.iter(), &text).await;

        let assistant_turn = self
            .conversations
            .insert_turn(&Turn::assistant(
                *conversation_id,
                outcome.text,
                outcome.tokens_used,
                self.credit_cost,
            ))
            .await?;

        let mut new_title = None;
        if conversation.has_default_title() {
            let title = derive_title(&text);
            if self
                .conversations
                .set_title_if_default(conversation_id, &title)
                .await?
            {
                new_title = Some(title);
            }
        }
        if new_title.is_none() {
            self.conversations
                .touch_conversation(conversation_id, Utc::now())
                .await?;
        }

        info!(
            remaining_credits,
            tokens_used = assistant_turn.tokens_used,
            source = ?outcome.source,
            "Exchange completed"
        );

        Ok(Exchange {
            user_turn,
            assistant_turn,
            remaining_credits,
            new_title,
        })
    }
}
