use std::io::Write;

use anyhow::Context;
use futures::StreamExt;
use selflow_brain::{CentralBrain, ChatOutcome};
use selflow_core::ContextType;

use super::{runtime, Settings};
use crate::output::print_json;

pub fn run(
    settings: &Settings,
    message: &str,
    context_type: &str,
    stream: bool,
    agent: bool,
    json: bool,
) -> anyhow::Result<()> {
    let brain = settings.brain()?;
    let context_type = ContextType::from(context_type);

    runtime()?.block_on(async {
        brain
            .start()
            .await
            .context("failed to start the central brain")?;
        let result = if stream {
            stream_reply(&brain, message, context_type, json).await
        } else if agent {
            agent_reply(&brain, message, json).await
        } else {
            direct_reply(&brain, message, context_type, json).await
        };
        brain.stop().await;
        result
    })
}

async fn direct_reply(
    brain: &CentralBrain,
    message: &str,
    context_type: ContextType,
    json: bool,
) -> anyhow::Result<()> {
    let reply = brain.process_user_input(message, context_type).await?;
    if json {
        print_json(&reply)?;
    } else {
        println!("{}", reply.message);
    }
    Ok(())
}

async fn agent_reply(brain: &CentralBrain, message: &str, json: bool) -> anyhow::Result<()> {
    let outcome = brain.chat_with_user_interface_agent(message, None).await?;
    if json {
        return print_json(&outcome);
    }
    match outcome {
        ChatOutcome::Direct(reply) => println!("{}", reply.message),
        ChatOutcome::Agent(reply) => match reply.message {
            Some(text) => println!("{text}"),
            None => print_json(&reply.data)?,
        },
    }
    Ok(())
}

async fn stream_reply(
    brain: &CentralBrain,
    message: &str,
    context_type: ContextType,
    json: bool,
) -> anyhow::Result<()> {
    let mut fragments = brain.stream_user_response(message, context_type);
    if json {
        let collected: Vec<String> = fragments.collect().await;
        return print_json(&serde_json::json!({
            "fragments": collected,
            "message": collected.concat(),
        }));
    }

    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.next().await {
        write!(stdout, "{fragment}")?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}
