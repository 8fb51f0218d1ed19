//! CLI for novelforge.
//!
//! ```ignore
//! use novelforge::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! runtime.block_on(run_cli_command(command))?;
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use version::{usage, version_line, VERSION};

use std::io::Write;

use color_eyre::eyre::{eyre, Result};
use tracing::{debug, info};

use crate::client::NovelForgeClient;
use crate::config::ClientConfig;
use crate::error::StreamError;
use crate::models::AiRequest;
use crate::sse::SessionState;

/// Run a parsed command against the service configured in the environment.
pub async fn run_cli_command(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Version => {
            println!("{}", version_line());
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", usage());
            Ok(())
        }
        CliCommand::Invalid(reason) => Err(eyre!("{}\n\n{}", reason, usage())),
        CliCommand::Novels => {
            let client = NovelForgeClient::new(ClientConfig::from_env())?;
            let novels = client.list_novels().await?;
            if novels.is_empty() {
                println!("No novels yet.");
            }
            for novel in novels {
                let id = novel.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{:>5}  {}", id, novel.title);
            }
            Ok(())
        }
        CliCommand::Chat(prompt) => {
            let client = NovelForgeClient::new(ClientConfig::from_env())?;
            let reply = client.chat(&AiRequest::new(prompt)).await?;
            println!("{}", reply);
            Ok(())
        }
        CliCommand::Stream(prompt) => stream_prompt(&prompt).await,
    }
}

async fn stream_prompt(prompt: &str) -> Result<()> {
    let client = NovelForgeClient::new(ClientConfig::from_env())?;
    let reader = client.stream_reader();
    info!(url = reader.url(), "streaming");

    let mut failure: Option<StreamError> = None;
    let state = reader
        .consume_text(
            prompt,
            |text| emit(&mut std::io::stdout(), &text),
            Some(|err: StreamError| failure = Some(err)),
        )
        .await;
    println!();

    match (state, failure) {
        (_, Some(err)) => Err(eyre!(err.user_message())),
        (SessionState::Failed, None) => Err(eyre!("stream failed")),
        _ => Ok(()),
    }
}

/// Write streamed text right away. Write failures are logged, not fatal.
fn emit<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        debug!("failed to write streamed text: {}", e);
    }
}
