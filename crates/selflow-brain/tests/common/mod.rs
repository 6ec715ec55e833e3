//! Scriptable fake collaborators shared by the brain tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use selflow_brain::{
    ActionExecutor, AgentReply, ApprovedAction, BrainBuilder, CentralBrain, CommandTranslator,
    ContextStore, EmbryoTrainer, ExecutionReport, FragmentStream, GenerationClient,
    GenerationHealth, TaskOrchestrator, UserInterfaceAgent,
};
use selflow_core::{
    BrainConfig, ContextType, ContextUpdate, ConversationTurn, Disposition, GenerationContext,
    SystemAction,
};

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeGeneration {
    pub healthy: bool,
    pub fragments: Vec<String>,
    /// Yield this many fragments, then an error.
    pub fail_stream_after: Option<usize>,
    pub panic_on_generate: bool,
    pub starts: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<(String, usize, String)>>>,
}

impl FakeGeneration {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            healthy: true,
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            fail_stream_after: None,
            panic_on_generate: false,
            starts: Arc::default(),
            closes: Arc::default(),
            prompts: Arc::default(),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::replying(&["unused"])
        }
    }

    fn remember(&self, prompt: &str, context: &GenerationContext, system_prompt: &str) {
        self.prompts.lock().unwrap().push((
            prompt.to_string(),
            context.conversation_history.len(),
            system_prompt.to_string(),
        ));
    }
}

#[async_trait]
impl GenerationClient for FakeGeneration {
    async fn start(&self) -> anyhow::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn generate_response(
        &self,
        prompt: &str,
        context: &GenerationContext,
        system_prompt: &str,
    ) -> anyhow::Result<String> {
        if self.panic_on_generate {
            panic!("generation backend crashed");
        }
        self.remember(prompt, context, system_prompt);
        tokio::task::yield_now().await;
        Ok(self.fragments.concat())
    }

    async fn stream_response(
        &self,
        prompt: &str,
        context: &GenerationContext,
        system_prompt: &str,
    ) -> anyhow::Result<FragmentStream> {
        self.remember(prompt, context, system_prompt);
        let mut items: Vec<anyhow::Result<String>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_stream_after {
            items.truncate(n);
            items.push(Err(anyhow::anyhow!("connection reset")));
        }
        Ok(futures::stream::iter(items).boxed())
    }

    fn get_health_status(&self) -> GenerationHealth {
        GenerationHealth {
            is_healthy: self.healthy,
            model_name: "fake-model".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Context store
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingStore {
    pub updates: Arc<Mutex<Vec<ContextUpdate>>>,
    pub fail_writes: bool,
}

impl RecordingStore {
    pub fn updates(&self) -> Vec<ContextUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContextStore for RecordingStore {
    async fn build_context(
        &self,
        _interaction_type: &ContextType,
        _user_message: &str,
    ) -> anyhow::Result<Vec<ConversationTurn>> {
        Ok(Vec::new())
    }

    async fn update_context(&self, update: ContextUpdate) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("store is read-only");
        }
        self.updates.lock().unwrap().push(update);
        Ok(())
    }

    fn get_context_summary(&self) -> Value {
        json!({ "writes": self.updates.lock().unwrap().len() })
    }
}

// ---------------------------------------------------------------------------
// System controller
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ScriptedController {
    pub disposition: Disposition,
    pub feedback: String,
    pub report: ExecutionReport,
    /// Translation bails with this text.
    pub translate_fault: Option<String>,
    /// Execution bails with this text.
    pub execute_fault: Option<String>,
    /// Translate from a raw payload with this disposition string instead.
    pub raw_disposition: Option<String>,
    pub executions: Arc<AtomicUsize>,
    pub last_action_id: Arc<Mutex<Option<String>>>,
}

impl ScriptedController {
    pub fn new(disposition: Disposition, feedback: &str) -> Self {
        Self {
            disposition,
            feedback: feedback.to_string(),
            report: ExecutionReport::succeeded("done"),
            translate_fault: None,
            execute_fault: None,
            raw_disposition: None,
            executions: Arc::default(),
            last_action_id: Arc::default(),
        }
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandTranslator for ScriptedController {
    async fn translate_user_command(
        &self,
        command: &str,
        _user_context: Option<&Value>,
    ) -> anyhow::Result<SystemAction> {
        if let Some(fault) = &self.translate_fault {
            anyhow::bail!("{fault}");
        }
        let action = match &self.raw_disposition {
            Some(disposition) => SystemAction::from_value(json!({
                "action_id": "raw-1",
                "recommended_action": disposition,
                "user_feedback": self.feedback,
                "details": { "command": command },
            }))?,
            None => SystemAction::new(self.disposition, self.feedback.clone())
                .with_details(json!({ "command": command })),
        };
        *self.last_action_id.lock().unwrap() = Some(action.action_id.clone());
        Ok(action)
    }
}

#[async_trait]
impl ActionExecutor for ScriptedController {
    async fn execute_system_action(
        &self,
        _action: &ApprovedAction,
    ) -> anyhow::Result<ExecutionReport> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = &self.execute_fault {
            anyhow::bail!("{fault}");
        }
        Ok(self.report.clone())
    }
}

// ---------------------------------------------------------------------------
// Specialized agents
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeAgent {
    pub fail: bool,
}

impl FakeAgent {
    fn reply(&self, what: &str) -> anyhow::Result<AgentReply> {
        if self.fail {
            anyhow::bail!("{what} crashed");
        }
        Ok(AgentReply::ok(json!({ "handled_by": what })))
    }
}

#[async_trait]
impl UserInterfaceAgent for FakeAgent {
    async fn process_chat_message(
        &self,
        _message: &str,
        _context: Option<&Value>,
    ) -> anyhow::Result<AgentReply> {
        self.reply("user_interface")
    }
}

#[async_trait]
impl TaskOrchestrator for FakeAgent {
    async fn coordinate_task(
        &self,
        _task_description: &str,
        _context: Option<&Value>,
    ) -> anyhow::Result<AgentReply> {
        self.reply("orchestrator")
    }
}

#[async_trait]
impl EmbryoTrainer for FakeAgent {
    async fn generate_training_labels(&self, events: &[Value]) -> anyhow::Result<AgentReply> {
        Ok(self.reply("trainer")?.with_message(format!("{} labels", events.len())))
    }

    async fn validate_embryo_training(&self, _embryo_data: &Value) -> anyhow::Result<AgentReply> {
        self.reply("trainer")
    }

    async fn assess_birth_readiness(&self, _embryo_data: &Value) -> anyhow::Result<AgentReply> {
        self.reply("trainer")
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn builder(generation: FakeGeneration, store: RecordingStore) -> BrainBuilder {
    CentralBrain::builder(BrainConfig::default())
        .generation_client(generation)
        .context_store(store)
}

pub async fn running(generation: FakeGeneration, store: RecordingStore) -> Arc<CentralBrain> {
    builder(generation, store).launch().await.unwrap()
}

pub async fn with_controller(controller: ScriptedController) -> Arc<CentralBrain> {
    builder(FakeGeneration::replying(&["ok"]), RecordingStore::default())
        .system_controller(move || Ok(controller.clone()))
        .launch()
        .await
        .unwrap()
}
