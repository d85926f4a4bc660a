//! Formpilot CLI - run a form-filling conversation on stdin/stdout.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::error;

use formpilot::adapters::{InMemorySessionStore, OpenAiExtractor, OpenAiExtractorConfig};
use formpilot::application::{ProcessTurnCommand, ProcessTurnHandler, StartConversationHandler};
use formpilot::config::AppConfig;
use formpilot::domain::dialogue::guidance;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formpilot=info".into()),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let extractor_config = OpenAiExtractorConfig::new(config.extractor.api_key.expose_secret())
        .with_model(&config.extractor.model)
        .with_base_url(&config.extractor.base_url)
        .with_timeout(Duration::from_secs(config.extractor.timeout_secs));

    let store = Arc::new(InMemorySessionStore::new());
    let extractor = Arc::new(OpenAiExtractor::new(extractor_config));

    let started = StartConversationHandler::new(store.clone()).handle().await?;
    let conversation_id = started.session.conversation_id;
    for message in &started.session.messages {
        println!("{}", message.text);
    }

    let handler = ProcessTurnHandler::new(store, extractor);
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let result = match handler
            .handle(ProcessTurnCommand {
                conversation_id,
                user_text: line,
            })
            .await
        {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "turn failed");
                println!("{}", guidance::TROUBLE_MESSAGE);
                continue;
            }
        };

        for reply in &result.replies {
            println!("{}", reply);
        }

        if result.session.complete {
            if let Some(output) = &result.session.final_output {
                println!("{}", serde_json::to_string_pretty(output)?);
            }
            break;
        }
    }

    Ok(())
}
