//! Bounded in-process conversation memory.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use selflow_core::{ContextType, ContextUpdate, ConversationTurn};

use crate::collaborators::ContextStore;

#[derive(Debug, Default)]
struct Memory {
    turns: VecDeque<ConversationTurn>,
    total_interactions: u64,
    by_context_type: BTreeMap<String, u64>,
    last_interaction: Option<DateTime<Utc>>,
    system_state: Option<Value>,
    system_state_updated: Option<DateTime<Utc>>,
}

/// What [`InMemoryContextStore::get_context_summary`] reports.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub total_interactions: u64,
    pub stored_turns: usize,
    pub max_history: usize,
    pub interactions_by_context_type: BTreeMap<String, u64>,
    pub last_interaction: Option<DateTime<Utc>>,
    pub system_state: Option<Value>,
    pub system_state_updated: Option<DateTime<Utc>>,
}

/// Keeps the most recent `max_history` turns in memory. Every context type
/// shares one history.
#[derive(Debug)]
pub struct InMemoryContextStore {
    max_history: usize,
    memory: Mutex<Memory>,
}

impl InMemoryContextStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            memory: Mutex::new(Memory::default()),
        }
    }

    pub fn summary(&self) -> ContextSummary {
        let memory = self.memory.lock().unwrap_or_else(|e| e.into_inner());
        ContextSummary {
            total_interactions: memory.total_interactions,
            stored_turns: memory.turns.len(),
            max_history: self.max_history,
            interactions_by_context_type: memory.by_context_type.clone(),
            last_interaction: memory.last_interaction,
            system_state: memory.system_state.clone(),
            system_state_updated: memory.system_state_updated,
        }
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn build_context(
        &self,
        _interaction_type: &ContextType,
        _user_message: &str,
    ) -> anyhow::Result<Vec<ConversationTurn>> {
        let memory = self.memory.lock().unwrap_or_else(|e| e.into_inner());
        Ok(memory.turns.iter().cloned().collect())
    }

    async fn update_context(&self, update: ContextUpdate) -> anyhow::Result<()> {
        let mut memory = self.memory.lock().unwrap_or_else(|e| e.into_inner());
        match update {
            ContextUpdate::Interaction(record) => {
                let now = Utc::now();
                memory.total_interactions += 1;
                *memory
                    .by_context_type
                    .entry(record.context_type.to_string())
                    .or_default() += 1;
                memory.last_interaction = Some(now);
                memory.turns.push_back(ConversationTurn {
                    user_message: record.user_message,
                    assistant_response: record.assistant_response,
                    context_type: record.context_type,
                    timestamp: now,
                });
                while memory.turns.len() > self.max_history {
                    memory.turns.pop_front();
                }
            }
            ContextUpdate::SystemState {
                system_state,
                update_time,
            } => {
                memory.system_state = Some(system_state);
                memory.system_state_updated = Some(update_time);
            }
        }
        Ok(())
    }

    fn get_context_summary(&self) -> Value {
        serde_json::to_value(self.summary()).unwrap_or(Value::Null)
    }
}
