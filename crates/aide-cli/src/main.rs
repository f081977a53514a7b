//! aide - interactive chat host for the session engine

mod config;
mod host;

use aide_client::GenerationClient;
use aide_session::{ActionStatus, Role, Session, SessionEvent, SessionNotice};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// aide - AI coding assistant chat
#[derive(Parser, Debug)]
#[command(name = "aide")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generation backend base URL
    #[arg(short, long)]
    backend: Option<String>,

    /// Workspace root directory
    #[arg(short, long)]
    workspace: Option<String>,

    /// Execute planned actions without confirmation
    #[arg(long)]
    auto_execute: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

const HELP: &str = "\
Commands:
  /pin <path>      pin a file into the context
  /unpin <path>    remove a pinned file
  /context         show pinned context
  /context clear   drop pinned files and analysis
  /analyze         analyze the workspace
  /auto on|off     toggle auto-execution of planned actions
  /clear           wipe the chat history
  /help            show this help
  /quit            exit
Anything else is sent as a chat message.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("aide=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let config = config::Config::load();
    let backend_url = args
        .backend
        .or(config.backend_url.clone())
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    let workspace = match args.workspace {
        Some(w) => std::path::PathBuf::from(w),
        None => std::env::current_dir()?,
    };

    let client = Arc::new(GenerationClient::new(
        &backend_url,
        config.resolve_api_key(),
    )?);
    let mut session = Session::new(client, Arc::new(host::CliHost::new()), &workspace);
    if args.auto_execute || config.auto_execute.unwrap_or(false) {
        session.set_auto_execute(true);
    }

    let mut notices = session.subscribe();

    println!("aide - backend {} - workspace {}", backend_url, workspace.display());
    println!("Type /help for commands.");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    // Messages already shown from previous history updates
    let mut printed = 0usize;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::ShowContext => {
                if session.context_files().is_empty() {
                    println!("No pinned files.");
                }
                for file in session.context_files() {
                    println!("  {} ({})", file.path.display(), file.language);
                }
                println!(
                    "Analysis: {}",
                    if session.analysis().is_some() { "yes" } else { "no" }
                );
                continue;
            }
            Command::Event(event) => session.handle_event(event).await,
        }

        printed = drain_notices(&mut notices, &session, printed);
    }

    Ok(())
}

enum Command {
    Event(SessionEvent),
    ShowContext,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Command {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    match head {
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        "/pin" => Command::Event(SessionEvent::PinContextFile { path: rest.into() }),
        "/unpin" => Command::Event(SessionEvent::UnpinContextFile { path: rest.into() }),
        "/context" if rest == "clear" => Command::Event(SessionEvent::ClearContext),
        "/context" => Command::ShowContext,
        "/analyze" => Command::Event(SessionEvent::AnalyzeWorkspace),
        "/auto" => Command::Event(SessionEvent::SetAutoExecute {
            enabled: rest != "off",
        }),
        "/clear" => Command::Event(SessionEvent::ClearChat),
        _ => Command::Event(SessionEvent::UserMessage {
            text: line.to_string(),
        }),
    }
}

/// Print what the last event produced: new messages, action outcomes,
/// context changes
fn drain_notices(
    notices: &mut tokio::sync::broadcast::Receiver<SessionNotice>,
    session: &Session,
    mut printed: usize,
) -> usize {
    while let Ok(notice) = notices.try_recv() {
        match notice {
            SessionNotice::HistoryUpdate { .. } => {}
            SessionNotice::ContextUpdate { files, has_analysis, .. } => {
                tracing::debug!(
                    "context updated: {} files, analysis: {}",
                    files.len(),
                    has_analysis
                );
            }
            SessionNotice::Busy { .. } => {}
            SessionNotice::FileChange { kind, name, .. } => {
                println!("[file {:?}] {}", kind, name);
            }
        }
    }

    // History was cleared
    if session.history().len() < printed {
        printed = 0;
    }

    for message in &session.history()[printed..] {
        match message.role {
            Role::User => {}
            Role::Assistant | Role::System => {
                println!("{}", message.content);
                for action in &message.actions {
                    let status = match action.status {
                        ActionStatus::Pending => "pending",
                        ActionStatus::Success => "ok",
                        ActionStatus::Error => "error",
                    };
                    println!(
                        "  [{}] {:?} {}",
                        status,
                        action.kind,
                        action.result.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }

    session.history().len()
}
