//! Context assembler: the bounded conversation window used for prompting.

use quill_types::completion::ContextEntry;
use quill_types::error::RepositoryError;
use uuid::Uuid;

use crate::repository::conversation::ConversationRepository;

/// Default number of turns read into a context window.
pub const DEFAULT_CONTEXT_WINDOW: u32 = 10;

/// Reads the most recent turns of a conversation for prompting.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    window: u32,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WINDOW)
    }
}

impl ContextAssembler {
    pub fn new(window: u32) -> Self {
        Self { window }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Load the window for `conversation_id`, oldest turn first.
    ///
    /// An empty conversation yields an empty window.
    pub async fn build_context<C: ConversationRepository>(
        &self,
        repo: &C,
        conversation_id: &Uuid,
    ) -> Result<ContextWindow, RepositoryError> {
        let turns = repo.list_recent_turns(conversation_id, self.window).await?;
        let entries = turns
            .into_iter()
            .filter(|t| t.conversation_id == *conversation_id)
            .map(|t| {
                (
                    t.id,
                    ContextEntry {
                        role: t.role,
                        text: t.content,
                    },
                )
            })
            .collect();
        Ok(ContextWindow { entries })
    }
}

/// A finite, restartable window of `(role, text)` pairs.
///
/// Each call to [`ContextWindow::iter`] starts again from the oldest entry.
#[derive(Debug, Clone, Default)]
pub struct ContextWindow {
    entries: Vec<(Uuid, ContextEntry)>,
}

impl ContextWindow {
    pub fn iter(&self) -> impl Iterator<Item = &ContextEntry> + Clone + '_ {
        self.entries.iter().map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the newest entry if it is the turn `turn_id`.
    ///
    /// The pipeline reads the window after persisting the user turn and
    /// passes that turn's text separately, so it must not appear twice.
    pub fn without_latest_turn(mut self, turn_id: &Uuid) -> Self {
        if self.entries.last().is_some_and(|(id, _)| id == turn_id) {
            self.entries.pop();
        }
        self
    }
}

impl<'a> IntoIterator for &'a ContextWindow {
    type Item = &'a ContextEntry;
    type IntoIter = Box<dyn Iterator<Item = &'a ContextEntry> + Send + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.entries.iter().map(|(_, entry)| entry))
    }
}
