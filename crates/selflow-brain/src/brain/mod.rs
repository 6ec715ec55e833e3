//! The central brain: lifecycle plus the collaborator registry every
//! operation routes through.

mod command;
mod conversation;
mod delegation;
mod status;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use ollama_agent::OllamaClient;
use selflow_core::prompts::NOT_AVAILABLE_APOLOGY;
use selflow_core::{BrainConfig, BrainError, Capability};

use crate::collaborators::{
    ActionExecutor, CommandTranslator, ContextStore, EmbryoTrainer, GenerationClient,
    TaskOrchestrator, UserInterfaceAgent,
};
use crate::context::InMemoryContextStore;
use crate::guard::{shielded, shielded_sync};
use crate::ollama::ollama_config;
use crate::reply::Failure;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The collaborators installed right now. Cloned out as a snapshot by every
/// interaction; the lock is never held across an await.
#[derive(Clone, Default)]
pub(crate) struct Collaborators {
    pub(crate) generation: Option<Arc<dyn GenerationClient>>,
    pub(crate) context: Option<Arc<dyn ContextStore>>,
    pub(crate) user_interface: Option<Arc<dyn UserInterfaceAgent>>,
    pub(crate) orchestrator: Option<Arc<dyn TaskOrchestrator>>,
    pub(crate) trainer: Option<Arc<dyn EmbryoTrainer>>,
    pub(crate) translator: Option<Arc<dyn CommandTranslator>>,
    pub(crate) executor: Option<Arc<dyn ActionExecutor>>,
}

impl Collaborators {
    fn drop_agents(&mut self) {
        self.user_interface = None;
        self.orchestrator = None;
        self.trainer = None;
        self.translator = None;
        self.executor = None;
    }
}

type Installer = Box<dyn Fn(&mut Collaborators) -> anyhow::Result<()> + Send + Sync>;

/// A specialized agent constructed on every successful start.
struct AgentSlot {
    capability: Capability,
    install: Installer,
}

// ---------------------------------------------------------------------------
// BrainBuilder
// ---------------------------------------------------------------------------

/// Assembles a [`CentralBrain`].
///
/// The generation client and context store default to an [`OllamaClient`]
/// and an [`InMemoryContextStore`] derived from the config. Specialized
/// agents are registered as factories and built on each `start`; a factory
/// error only disables that agent.
pub struct BrainBuilder {
    config: BrainConfig,
    generation: Option<Arc<dyn GenerationClient>>,
    context_store: Option<Arc<dyn ContextStore>>,
    agents: Vec<AgentSlot>,
}

impl BrainBuilder {
    pub fn new(config: BrainConfig) -> Self {
        Self {
            config,
            generation: None,
            context_store: None,
            agents: Vec::new(),
        }
    }

    pub fn generation_client(mut self, client: impl GenerationClient + 'static) -> Self {
        self.generation = Some(Arc::new(client));
        self
    }

    pub fn context_store(mut self, store: impl ContextStore + 'static) -> Self {
        self.context_store = Some(Arc::new(store));
        self
    }

    pub fn user_interface<A, F>(self, factory: F) -> Self
    where
        A: UserInterfaceAgent + 'static,
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.agent(Capability::UserInterface, move |c| {
            c.user_interface = Some(Arc::new(factory()?));
            Ok(())
        })
    }

    pub fn task_orchestrator<A, F>(self, factory: F) -> Self
    where
        A: TaskOrchestrator + 'static,
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.agent(Capability::AgentOrchestrator, move |c| {
            c.orchestrator = Some(Arc::new(factory()?));
            Ok(())
        })
    }

    pub fn embryo_trainer<A, F>(self, factory: F) -> Self
    where
        A: EmbryoTrainer + 'static,
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.agent(Capability::EmbryoTrainer, move |c| {
            c.trainer = Some(Arc::new(factory()?));
            Ok(())
        })
    }

    pub fn command_translator<A, F>(self, factory: F) -> Self
    where
        A: CommandTranslator + 'static,
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.agent(Capability::CommandTranslator, move |c| {
            c.translator = Some(Arc::new(factory()?));
            Ok(())
        })
    }

    pub fn action_executor<A, F>(self, factory: F) -> Self
    where
        A: ActionExecutor + 'static,
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.agent(Capability::ActionExecutor, move |c| {
            c.executor = Some(Arc::new(factory()?));
            Ok(())
        })
    }

    /// Register one object as both command translator and action executor.
    pub fn system_controller<A, F>(self, factory: F) -> Self
    where
        A: CommandTranslator + ActionExecutor + 'static,
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.agent(Capability::CommandTranslator, move |c| {
            let controller = Arc::new(factory()?);
            c.translator = Some(controller.clone());
            c.executor = Some(controller);
            Ok(())
        })
    }

    fn agent(
        mut self,
        capability: Capability,
        install: impl Fn(&mut Collaborators) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.agents.push(AgentSlot {
            capability,
            install: Box::new(install),
        });
        self
    }

    pub fn build(self) -> CentralBrain {
        let generation = self.generation.unwrap_or_else(|| {
            Arc::new(OllamaClient::new(ollama_config(&self.config))) as Arc<dyn GenerationClient>
        });
        let context_store = self.context_store.unwrap_or_else(|| {
            Arc::new(InMemoryContextStore::new(
                self.config.context_management.max_history,
            )) as Arc<dyn ContextStore>
        });
        CentralBrain {
            config: self.config,
            generation,
            context_store,
            agents: self.agents,
            lifecycle: tokio::sync::Mutex::new(()),
            running: AtomicBool::new(false),
            startup_time: RwLock::new(None),
            collaborators: RwLock::new(Collaborators::default()),
            interaction_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build and start in one call.
    pub async fn launch(self) -> Result<Arc<CentralBrain>, Failure> {
        let brain = Arc::new(self.build());
        brain.start().await?;
        Ok(brain)
    }
}

// ---------------------------------------------------------------------------
// CentralBrain
// ---------------------------------------------------------------------------

pub struct CentralBrain {
    config: BrainConfig,
    generation: Arc<dyn GenerationClient>,
    context_store: Arc<dyn ContextStore>,
    agents: Vec<AgentSlot>,
    /// Serializes start/stop. Interactions never take it.
    lifecycle: tokio::sync::Mutex<()>,
    running: AtomicBool,
    startup_time: RwLock<Option<DateTime<Utc>>>,
    collaborators: RwLock<Collaborators>,
    interaction_count: Arc<AtomicU64>,
}

impl CentralBrain {
    pub fn builder(config: BrainConfig) -> BrainBuilder {
        BrainBuilder::new(config)
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn startup_time(&self) -> Option<DateTime<Utc>> {
        *self.startup_time.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count.load(Ordering::SeqCst)
    }

    /// Start the generation client, install the context store and build
    /// every registered agent.
    ///
    /// Fails with [`FailureKind::Unhealthy`](crate::FailureKind::Unhealthy)
    /// when the generation client reports unhealthy; the client is closed
    /// again and the brain stays stopped.
    pub async fn start(&self) -> Result<(), Failure> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_running() {
            tracing::info!("central brain already running");
            return Ok(());
        }
        tracing::info!(agents = self.agents.len(), "starting central brain");

        shielded(Capability::GenerationClient, self.generation.start())
            .await
            .map_err(|e| Failure::apologizing(e, NOT_AVAILABLE_APOLOGY))?;
        {
            let mut installed = self.collaborators.write().unwrap_or_else(|e| e.into_inner());
            installed.generation = Some(Arc::clone(&self.generation));
            installed.context = Some(Arc::clone(&self.context_store));
        }

        let health = shielded_sync(Capability::GenerationClient, || {
            self.generation.get_health_status()
        });
        let unhealthy = match health {
            Some(h) if h.is_healthy => None,
            Some(h) => Some(format!("model '{}' is not available", h.model_name)),
            None => Some("health query panicked".to_string()),
        };
        if let Some(reason) = unhealthy {
            tracing::error!(reason = %reason, "generation client unhealthy, aborting start");
            self.release_generation().await;
            *self.collaborators.write().unwrap_or_else(|e| e.into_inner()) =
                Collaborators::default();
            return Err(Failure::from_error(BrainError::Unhealthy(reason)));
        }

        self.running.store(true, Ordering::SeqCst);
        *self.startup_time.write().unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());

        for slot in &self.agents {
            let mut staged = self.snapshot();
            match shielded_sync(slot.capability, || (slot.install)(&mut staged)) {
                Some(Ok(())) => {
                    *self.collaborators.write().unwrap_or_else(|e| e.into_inner()) = staged;
                    tracing::info!(capability = slot.capability.as_str(), "agent ready");
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        capability = slot.capability.as_str(),
                        error = %format!("{e:#}"),
                        "agent failed to initialize, continuing without it"
                    );
                }
                None => {
                    tracing::warn!(
                        capability = slot.capability.as_str(),
                        "agent factory panicked, continuing without it"
                    );
                }
            }
        }

        tracing::info!("central brain started");
        Ok(())
    }

    /// Close the generation client and drop every agent. Idempotent.
    ///
    /// The context store stays installed so health reports keep its summary.
    pub async fn stop(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        let was_running = self.running.swap(false, Ordering::SeqCst);
        self.release_generation().await;
        self.collaborators
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .drop_agents();
        *self.startup_time.write().unwrap_or_else(|e| e.into_inner()) = None;
        if was_running {
            tracing::info!("central brain stopped");
        }
    }

    async fn release_generation(&self) {
        let generation = self
            .collaborators
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .generation
            .take();
        if let Some(generation) = generation {
            if let Err(e) = shielded(Capability::GenerationClient, generation.close()).await {
                tracing::warn!(error = %e, "generation client did not close cleanly");
            }
        }
    }

    pub(crate) fn snapshot(&self) -> Collaborators {
        self.collaborators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The collaborator snapshot, or `NotRunning`.
    pub(crate) fn running_snapshot(&self) -> Result<Collaborators, BrainError> {
        if self.is_running() {
            Ok(self.snapshot())
        } else {
            Err(BrainError::NotRunning)
        }
    }

    pub(crate) fn next_interaction_id(&self) -> u64 {
        self.interaction_count.fetch_add(1, Ordering::SeqCst) + 1
    }
}
