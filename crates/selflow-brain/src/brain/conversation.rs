use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::Value;

use selflow_core::prompts::{self, NOT_AVAILABLE_APOLOGY, PROCESSING_APOLOGY, STREAM_APOLOGY};
use selflow_core::{
    BrainError, Capability, ContextType, ContextUpdate, ConversationTurn, GenerationContext,
    InteractionMetadata, InteractionRecord,
};

use super::{CentralBrain, Collaborators};
use crate::collaborators::{FragmentStream, GenerationClient};
use crate::guard::shielded;
use crate::reply::{ChatOutcome, ChatResponse, Failure};

impl CentralBrain {
    /// Answer one conversational turn with the generation client.
    pub async fn process_user_input(
        &self,
        message: &str,
        context_type: ContextType,
    ) -> Result<ChatResponse, Failure> {
        let collaborators = self
            .running_snapshot()
            .map_err(|e| Failure::new(&e, NOT_AVAILABLE_APOLOGY))?;

        let interaction_id = self.next_interaction_id();
        let started = Instant::now();
        tracing::debug!(interaction_id, context_type = %context_type, "processing user input");

        let result = async {
            let generation = generation(&collaborators)?;
            let context = load_context(&collaborators, &context_type, message).await?;
            let system_prompt = prompts::system_prompt(&context_type);
            let reply = shielded(
                Capability::GenerationClient,
                generation.generate_response(message, &context, &system_prompt),
            )
            .await?;
            let response_time = started.elapsed().as_secs_f64();
            record_interaction(
                &collaborators,
                message,
                &reply,
                &context_type,
                interaction_id,
                response_time,
            )
            .await?;
            Ok::<_, BrainError>(ChatResponse {
                message: reply,
                context_type: context_type.clone(),
                interaction_id,
                response_time,
            })
        }
        .await;

        result.map_err(|e| {
            tracing::warn!(interaction_id, error = %e, "user input failed");
            Failure::new(&e, PROCESSING_APOLOGY)
        })
    }

    /// Chat through the user-interface agent, falling back to
    /// [`process_user_input`](Self::process_user_input) when the agent is
    /// absent or faults.
    pub async fn chat_with_user_interface_agent(
        &self,
        message: &str,
        context: Option<&Value>,
    ) -> Result<ChatOutcome, Failure> {
        let collaborators = self
            .running_snapshot()
            .map_err(|e| Failure::new(&e, NOT_AVAILABLE_APOLOGY))?;

        if let Some(agent) = collaborators.user_interface {
            match shielded(
                Capability::UserInterface,
                agent.process_chat_message(message, context),
            )
            .await
            {
                Ok(reply) => return Ok(ChatOutcome::Agent(reply)),
                Err(e) => {
                    tracing::warn!(error = %e, "user interface agent failed, answering directly")
                }
            }
        }

        self.process_user_input(message, ContextType::Chat)
            .await
            .map(ChatOutcome::Direct)
    }

    /// Stream the generated reply fragment by fragment.
    ///
    /// Nothing happens until the stream is polled. A fault yields one apology
    /// fragment and ends the stream; fragments already yielded stand. The
    /// interaction is recorded once the generation is exhausted, so dropping
    /// the stream early records nothing.
    pub fn stream_user_response(
        &self,
        message: impl Into<String>,
        context_type: ContextType,
    ) -> BoxStream<'static, String> {
        let Ok(collaborators) = self.running_snapshot() else {
            return stream::once(async { NOT_AVAILABLE_APOLOGY.to_string() }).boxed();
        };
        let message = message.into();
        let counter = Arc::clone(&self.interaction_count);

        stream! {
            let interaction_id = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let started = Instant::now();

            let mut fragments = match open_stream(&collaborators, &message, &context_type).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    tracing::warn!(interaction_id, error = %e, "stream failed to open");
                    yield STREAM_APOLOGY.to_string();
                    return;
                }
            };

            let mut full_response = String::new();
            loop {
                let next = shielded(Capability::GenerationClient, async {
                    fragments.next().await.transpose()
                })
                .await;
                match next {
                    Ok(Some(fragment)) => {
                        full_response.push_str(&fragment);
                        yield fragment;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(interaction_id, error = %e, "stream interrupted");
                        yield STREAM_APOLOGY.to_string();
                        return;
                    }
                }
            }

            let response_time = started.elapsed().as_secs_f64();
            if let Err(e) = record_interaction(
                &collaborators,
                &message,
                &full_response,
                &context_type,
                interaction_id,
                response_time,
            )
            .await
            {
                tracing::warn!(interaction_id, error = %e, "streamed interaction not recorded");
                yield STREAM_APOLOGY.to_string();
            }
        }
        .boxed()
    }
}

fn generation(collaborators: &Collaborators) -> Result<Arc<dyn GenerationClient>, BrainError> {
    collaborators
        .generation
        .clone()
        .ok_or(BrainError::Unavailable(Capability::GenerationClient))
}

async fn load_context(
    collaborators: &Collaborators,
    context_type: &ContextType,
    message: &str,
) -> Result<GenerationContext, BrainError> {
    let history: Vec<ConversationTurn> = match &collaborators.context {
        Some(store) => {
            shielded(
                Capability::ContextStore,
                store.build_context(context_type, message),
            )
            .await?
        }
        None => Vec::new(),
    };
    Ok(GenerationContext::new(history))
}

async fn open_stream(
    collaborators: &Collaborators,
    message: &str,
    context_type: &ContextType,
) -> Result<FragmentStream, BrainError> {
    let generation = generation(collaborators)?;
    let context = load_context(collaborators, context_type, message).await?;
    let system_prompt = prompts::system_prompt(context_type);
    shielded(
        Capability::GenerationClient,
        generation.stream_response(message, &context, &system_prompt),
    )
    .await
}

async fn record_interaction(
    collaborators: &Collaborators,
    message: &str,
    response: &str,
    context_type: &ContextType,
    interaction_id: u64,
    response_time: f64,
) -> Result<(), BrainError> {
    let Some(store) = &collaborators.context else {
        return Ok(());
    };
    let update = ContextUpdate::Interaction(InteractionRecord {
        user_message: message.to_string(),
        assistant_response: response.to_string(),
        context_type: context_type.clone(),
        metadata: InteractionMetadata {
            interaction_id,
            response_time,
        },
    });
    shielded(Capability::ContextStore, store.update_context(update)).await?;
    tracing::debug!(interaction_id, response_time, "interaction recorded");
    Ok(())
}
