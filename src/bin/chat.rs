use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use agenda::config::AppConfig;
use agenda::models::ConversationRequest;
use agenda::services::calendar::gateway_from_config;
use agenda::services::conversation;
use agenda::services::nlp::PhraseDateResolver;
use agenda::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    let calendar = gateway_from_config(&config)?;
    let state = Arc::new(AppState {
        config,
        calendar: Box::new(calendar),
        resolver: Box::new(PhraseDateResolver),
    });

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Agenda is ready! Type your message below (exit to quit).\n")
        .await?;

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = conversation::process_message(&state, ConversationRequest::new(message)).await;
        stdout
            .write_all(format!("Agent: {reply}\n").as_bytes())
            .await?;
    }

    Ok(())
}
