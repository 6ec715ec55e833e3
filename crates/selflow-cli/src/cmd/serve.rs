use super::{runtime, try_start, Settings};

pub fn run(settings: &Settings, port: u16) -> anyhow::Result<()> {
    let brain = settings.brain()?;

    runtime()?.block_on(async move {
        try_start(&brain).await;
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "SelFlow API → http://localhost:{actual_port}  ({})",
            brain.get_status_summary()
        );
        selflow_server::serve_on(brain, listener).await
    })
}
