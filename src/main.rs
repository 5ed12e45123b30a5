//! `studiofx [backdrop|assistant] [config.json]`
//!
//! `backdrop` (the default) opens the particle backdrop in a window.
//! `assistant` runs the chat session on stdin. Lines starting with `/` are
//! commands: `/tool <name>`, `/tools`, `/welcome <name>`, `/quit`.

use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studiofx::assistant::{ChatSession, Tool};
use studiofx::config::{AssistantConfig, StudioConfig};
use studiofx::error::RunError;

enum Command {
    Backdrop,
    Assistant,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref() {
        None | Some("backdrop") => Command::Backdrop,
        Some("assistant") => Command::Assistant,
        Some(other) => {
            eprintln!("unknown command `{other}`");
            eprintln!("usage: studiofx [backdrop|assistant] [config.json]");
            return ExitCode::from(2);
        }
    };

    match run(command, args.next()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "exited with error");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config_path: Option<String>) -> Result<(), RunError> {
    let config = match config_path {
        Some(path) => {
            let config = StudioConfig::load(&path)?;
            tracing::info!(path = %path, "using configuration file");
            config
        }
        None => StudioConfig::default(),
    };

    match command {
        Command::Backdrop => studiofx::window::run(config),
        Command::Assistant => run_assistant(config.assistant),
    }
}

fn run_assistant(config: AssistantConfig) -> Result<(), RunError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(assistant_repl(config))?;
    Ok(())
}

async fn assistant_repl(config: AssistantConfig) -> std::io::Result<()> {
    let mut session = ChatSession::mock(&config).with_listener(|message| println!("{message}"));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("tool: {} (/tools to list, /quit to leave)", session.active_tool());
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            session.send(line).await;
            continue;
        };

        let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "quit" | "exit" => break,
            "tools" => {
                for tool in Tool::ALL {
                    println!("  {tool}");
                }
            }
            "tool" => match Tool::from_label(rest) {
                Some(tool) => {
                    session.set_tool(tool);
                    println!("tool: {tool}");
                }
                None => println!("unknown tool `{rest}`"),
            },
            "welcome" => {
                session.welcome(rest.trim());
            }
            _ => println!("unknown command `/{name}`"),
        }
    }
    Ok(())
}
