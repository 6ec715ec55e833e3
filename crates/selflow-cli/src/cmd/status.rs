use super::{runtime, try_start, Settings};
use crate::output::{print_availability, print_json};

pub fn health(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let brain = settings.brain()?;
    let health = runtime()?.block_on(async {
        try_start(&brain).await;
        let health = brain.get_health_status();
        brain.stop().await;
        health
    });

    if json {
        return print_json(&health);
    }

    let state = if health.central_brain_running {
        "running"
    } else {
        "stopped"
    };
    println!("Central AI Brain: {state}");
    println!(
        "Generation: {} ({})",
        if health.generation_healthy {
            "healthy"
        } else {
            "unhealthy"
        },
        health
            .generation_model
            .as_deref()
            .unwrap_or(&brain.config().ai_brain.model_name)
    );
    println!("Interactions: {}", health.interaction_count);
    println!();

    let agents = &health.agents;
    print_availability(&[
        ("user_interface", agents.user_interface),
        ("agent_orchestrator", agents.agent_orchestrator),
        ("embryo_trainer", agents.embryo_trainer),
        ("command_translator", agents.command_translator),
        ("action_executor", agents.action_executor),
    ]);
    Ok(())
}

pub fn insights(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let brain = settings.brain()?;
    let insights = runtime()?.block_on(async {
        try_start(&brain).await;
        let insights = brain.get_system_insights();
        brain.stop().await;
        insights
    });

    if json {
        return print_json(&insights);
    }
    let stats = &insights.interaction_statistics;
    println!("Total interactions: {}", stats.total_interactions);
    println!("Uptime: {:.2}h", stats.uptime_hours);
    if let Some(rate) = insights.performance_metrics.interactions_per_hour {
        println!("Interactions per hour: {rate:.1}");
    }
    Ok(())
}

pub fn summary(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let brain = settings.brain()?;
    let summary = runtime()?.block_on(async {
        try_start(&brain).await;
        let summary = brain.get_status_summary();
        brain.stop().await;
        summary
    });

    if json {
        print_json(&serde_json::json!({ "summary": summary }))
    } else {
        println!("{summary}");
        Ok(())
    }
}
