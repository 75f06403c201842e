//! CLI for weft.
//!
//! Attaches to the stored thread (or a new one), submits a message, and
//! prints the reconciled transcript. UI events are echoed to stderr as they
//! arrive. Ctrl+C cancels the run and prints whatever arrived so far.
//!
//! ```ignore
//! use weft::cli::{parse_args, run_cli_command};
//! use weft::config::ClientConfig;
//!
//! let command = parse_args(std::env::args());
//! run_cli_command(command, ClientConfig::from_env()).await?;
//! ```

pub mod args;
pub mod transcript;

pub use args::{parse_args, CliCommand, SubmitArgs, USAGE};
pub use transcript::{render_element, render_transcript};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::models::RunInput;
use crate::session::{Session, SessionHooks};

/// The current version of weft, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Execute a parsed command.
pub async fn run_cli_command(command: CliCommand, config: ClientConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            println!("weft {}", VERSION);
            Ok(())
        }
        CliCommand::Usage { error: None } => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Usage { error: Some(error) } => {
            eprintln!("{}", USAGE);
            Err(eyre!(error))
        }
        CliCommand::Reset { url } => {
            let mut session = Session::from_config(&apply_url(config, url));
            session.reset().await?;
            println!("Thread cleared");
            Ok(())
        }
        CliCommand::Submit(args) => submit(args, config).await,
    }
}

fn apply_url(config: ClientConfig, url: Option<String>) -> ClientConfig {
    match url {
        Some(url) => config.with_base_url(url),
        None => config,
    }
}

async fn submit(args: SubmitArgs, config: ClientConfig) -> Result<()> {
    let config = apply_url(config, args.url);
    let hooks = SessionHooks::new().on_ui_event(|element| {
        eprintln!("ui {}", render_element(element));
    });
    let mut session = Session::from_config(&config).with_hooks(hooks);

    if args.new_thread {
        session.reset().await?;
    }
    session.attach().await?;

    let mut input = RunInput::message(args.message);
    if let Some(context) = args.context {
        input = input.with_context(context);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = session.submit(input, &cancel).await;
    print!("{}", render_transcript(&session.state()));

    match result {
        Ok(summary) => {
            if summary.decode_faults > 0 {
                eprintln!("{} frame(s) could not be decoded", summary.decode_faults);
            }
            if let Some(thread_id) = session.thread_id() {
                eprintln!("thread {}", thread_id);
            }
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            eprintln!("Cancelled");
            Ok(())
        }
        Err(e) => {
            eprintln!("{} ({})", e.user_message(), e.recovery_hint());
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_apply_url() {
        let config = apply_url(ClientConfig::default(), Some("http://x:9/".to_string()));
        assert_eq!(config.base_url, "http://x:9");
        assert_eq!(apply_url(ClientConfig::default(), None), ClientConfig::default());
    }

    #[tokio::test]
    async fn test_version_command() {
        assert!(run_cli_command(CliCommand::Version, ClientConfig::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_usage_error_fails() {
        let result = run_cli_command(
            CliCommand::Usage {
                error: Some("a message is required".to_string()),
            },
            ClientConfig::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
