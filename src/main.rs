//! Medika - terminal client for the Medika document-QA assistant
//!
//! The binary is the presentation shell: it renders the session store,
//! forwards submissions into the conversation engine, and drives the
//! out-of-core workflows (upload/ingest, sources, dashboard stats, theme)
//! against the backend.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod remote;

use crate::config::{prompts, Config};
use crate::conversation::Who;
use crate::core::{ChatStore, ConversationEngine, SessionManager, UiEvent};
use crate::remote::{AnswerService, BackendClient};

/// Chunking parameters passed straight through to the ingestion run.
const DEFAULT_CHUNK_SIZE: u32 = 1000;
const DEFAULT_OVERLAP: u32 = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medika=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let sessions = SessionManager::new(ChatStore::load(&config.data_dir));
    let api = Arc::new(BackendClient::new(config.api_url.clone()));
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(ConversationEngine::new(
        sessions.clone(),
        api.clone(),
        events_tx,
    ));

    tracing::info!(api_url = %config.api_url, "medika client starting");

    tokio::spawn(render_events(events_rx, sessions.clone()));

    render_transcript(&sessions);
    engine.refresh_stats().await;

    repl(engine, sessions, api).await;
    Ok(())
}

/// Read lines from stdin and dispatch them. Plain text is a submission;
/// `/`-prefixed lines are shell commands.
async fn repl(
    engine: Arc<ConversationEngine>,
    sessions: SessionManager,
    api: Arc<BackendClient>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        let command = line.split_whitespace().next().map(str::to_string);
        match command.as_deref() {
            Some("/quit") | Some("/exit") => break,
            Some("/help") => help(),
            Some("/new") => {
                let title = line.strip_prefix("/new").map(str::trim).filter(|t| !t.is_empty());
                let id = sessions.new_session(title);
                println!("started {}", id);
                render_transcript(&sessions);
            }
            Some("/list") => {
                for (id, title) in sessions.list_sessions() {
                    let marker = if id == sessions.active_id() { "*" } else { " " };
                    println!("{} {}  {}", marker, id, title);
                }
            }
            Some("/switch") => {
                let id = line.strip_prefix("/switch").map(str::trim).unwrap_or("");
                if sessions.set_active(id) {
                    render_transcript(&sessions);
                } else {
                    println!("no such session: {}", id);
                }
            }
            Some("/clear") => {
                sessions.clear_active();
                render_transcript(&sessions);
            }
            Some("/quick") => {
                let index = line
                    .strip_prefix("/quick")
                    .and_then(|rest| rest.trim().parse::<usize>().ok());
                match index {
                    Some(n) if n >= 1 && n <= prompts::QUICK_REPLIES.len() => {
                        let engine = engine.clone();
                        tokio::spawn(async move { engine.quick_reply(n - 1).await });
                    }
                    _ => {
                        for (i, reply) in prompts::QUICK_REPLIES.iter().enumerate() {
                            println!("{}. {}  ({})", i + 1, reply.label, reply.query);
                        }
                    }
                }
            }
            Some("/upload") => {
                let path = line.strip_prefix("/upload").map(str::trim).unwrap_or("");
                if path.is_empty() {
                    println!("usage: /upload <file>");
                } else {
                    upload(&api, &engine, Path::new(path)).await;
                }
            }
            Some("/sources") => show_sources(&api).await,
            Some("/stats") => show_stats(&api).await,
            Some("/theme") => {
                let theme = sessions.toggle_theme();
                println!("theme: {}", theme.as_str());
            }
            Some("/ping") => ping(&api).await,
            Some(cmd) if cmd.starts_with('/') => println!("unknown command: {}", cmd),
            _ => {
                // A submission. Spawned so several can be in flight at once.
                let engine = engine.clone();
                tokio::spawn(async move { engine.submit(&line).await });
            }
        }
        prompt();
    }
}

/// Print engine notifications as they arrive. Replies for a non-active
/// session are labelled with the session they were filed to.
async fn render_events(mut rx: mpsc::UnboundedReceiver<UiEvent>, sessions: SessionManager) {
    while let Some(event) = rx.recv().await {
        match event {
            UiEvent::Typing { session_id, .. } => {
                if session_id == sessions.active_id() {
                    println!("{} is typing...", prompts::PERSONA);
                }
            }
            UiEvent::MessageAppended {
                session_id,
                who: Who::Bot,
                content,
            } => {
                if session_id == sessions.active_id() {
                    println!("{}", content);
                } else {
                    println!("[{}] {}", session_id, content);
                }
            }
            UiEvent::MessageAppended { .. } | UiEvent::TypingDone { .. } => {}
            UiEvent::StatsRefreshed { queries_today } => {
                tracing::debug!(queries_today, "stats refreshed");
            }
        }
    }
}

/// Replay the active session to the terminal, showing the suggested
/// prompts at the top of a fresh transcript once per session.
fn render_transcript(sessions: &SessionManager) {
    let Some(session) = sessions.active_session() else {
        return;
    };
    println!("--- {} ({}) ---", session.title, session.id);

    if session.quick_replies_shown || session.messages.is_empty() {
        for (i, reply) in prompts::QUICK_REPLIES.iter().enumerate() {
            println!("  [{}] {}", i + 1, reply.label);
        }
        println!("  (use /quick <n>)");
        sessions.mark_quick_replies_shown(&session.id);
    }

    for message in &session.messages {
        match message.who {
            Who::User => println!("you: {}", message.content),
            Who::Bot => println!("{}", message.content),
        }
    }
}

async fn upload(api: &BackendClient, engine: &ConversationEngine, file: &Path) {
    println!("Uploading {}...", file.display());
    let outcome = async {
        let server_path = api.upload(file).await?;
        println!("Running ingestion...");
        api.run_ingestion(&server_path, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP)
            .await
    }
    .await;

    match outcome {
        Ok(()) => {
            println!("{} uploaded & ingestion started", file.display());
            engine.refresh_stats().await;
            show_sources(api).await;
        }
        Err(err) => {
            tracing::warn!(%err, "upload workflow failed");
            println!("Upload or ingestion failed.");
        }
    }
}

async fn show_sources(api: &BackendClient) {
    match api.sources().await {
        Ok(list) if list.is_empty() => println!("No sources indexed."),
        Ok(list) => {
            for source in list {
                println!("{}  ({} chunks)", source.name, source.chunks);
                if !source.summary.is_empty() {
                    println!("    {}", source.summary);
                }
            }
        }
        Err(err) => {
            tracing::warn!(%err, "sources listing failed");
            println!("Could not load sources.");
        }
    }
}

async fn show_stats(api: &BackendClient) {
    match api.stats().await {
        Ok(stats) => {
            println!("queries today: {}", stats.queries_today.unwrap_or(0));
            match stats.docs {
                Some(docs) => println!("documents: {}", docs),
                None => println!("documents: -"),
            }
        }
        Err(err) => {
            tracing::warn!(%err, "stats fetch failed");
            println!("Stats unavailable.");
        }
    }
}

async fn ping(api: &BackendClient) {
    match api.ping().await {
        Ok(status) => println!(
            "status: {}  vector_ready: {}  queries_today: {}",
            status.status, status.vector_ready, status.queries_today
        ),
        Err(err) => println!("backend unreachable: {}", err),
    }
}

fn help() {
    println!("/new [title]     start a new chat");
    println!("/list            list chats");
    println!("/switch <id>     switch chats");
    println!("/clear           clear the current transcript");
    println!("/quick [n]       show or send a suggested prompt");
    println!("/upload <file>   upload a document for ingestion");
    println!("/sources         list indexed documents");
    println!("/stats           dashboard counters");
    println!("/theme           toggle dark/light");
    println!("/ping            backend health");
    println!("/quit            exit");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
