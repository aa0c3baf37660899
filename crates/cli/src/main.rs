use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stockchat_core::chat::{ChatEvent, ChatSession};
use stockchat_core::client::HttpStockApi;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod terminal;

#[derive(Debug, Parser)]
#[command(name = "stockchat")]
struct Args {
    /// Backend base URL. Overrides STOCK_API_BASE.
    #[arg(long)]
    api_base: Option<String>,

    /// Rewrite an HTML transcript at this path whenever a request starts or finishes.
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Look these tickers up concurrently and exit. Without tickers an interactive
    /// prompt reads one ticker per line.
    tickers: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = stockchat_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(api_base) = args.api_base.clone() {
        settings = settings.with_api_base(api_base);
    }

    if let Err(err) = run(settings, args).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "stockchat failed");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: stockchat_core::config::Settings, args: Args) -> anyhow::Result<()> {
    let api = HttpStockApi::from_settings(&settings)?;
    tracing::info!(api_base = %api.base_url(), "stockchat starting");

    let session = ChatSession::new(Arc::new(api));
    let (stop_tx, stop_rx) = oneshot::channel();
    let view = tokio::spawn(render_loop(
        session.clone(),
        session.subscribe(),
        args.transcript.clone(),
        stop_rx,
    ));

    if args.tickers.is_empty() {
        print!("{}", terminal::banner());
        prompt(&session).await?;
    } else {
        let mut tasks = JoinSet::new();
        for ticker in args.tickers {
            let session = session.clone();
            tasks.spawn(async move { session.submit(&ticker).await });
        }
        while tasks.join_next().await.is_some() {}
    }

    let _ = stop_tx.send(());
    view.await.context("render task panicked")?
}

/// Reads tickers from stdin until EOF, `:quit` or Ctrl-C. Each line is its own request.
async fn prompt(session: &ChatSession) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = shutdown_signal() => {
                tracing::info!(pending = session.in_flight(), "interrupted; abandoning pending requests");
                return Ok(());
            }
        };
        let Some(line) = line else { break };
        if matches!(line.trim(), ":quit" | ":q") {
            break;
        }

        let session = session.clone();
        tasks.spawn(async move { session.submit(&line).await });
    }

    // Let in-flight lookups land before exiting.
    while tasks.join_next().await.is_some() {}
    Ok(())
}

async fn render_loop(
    session: ChatSession,
    mut events: broadcast::Receiver<ChatEvent>,
    transcript: Option<PathBuf>,
    mut stop: oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = &mut stop => break,
        };
        match event {
            Ok(event) => handle_event(&session, event, transcript.as_ref()).await?,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "render loop fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }

    // Drain whatever was published before the stop signal.
    while let Ok(event) = events.try_recv() {
        handle_event(&session, event, transcript.as_ref()).await?;
    }
    Ok(())
}

async fn handle_event(
    session: &ChatSession,
    event: ChatEvent,
    transcript: Option<&PathBuf>,
) -> anyhow::Result<()> {
    match event {
        ChatEvent::Appended { index } => {
            if let Some(message) = session.message(index).await {
                print!("{}", terminal::render_message(&message));
            }
        }
        ChatEvent::Started { request_id } => {
            tracing::debug!(%request_id, "request started");
            print!("{}", terminal::thinking(session.in_flight()));
            write_transcript(session, transcript).await?;
        }
        ChatEvent::Settled { request_id } => {
            tracing::debug!(%request_id, "request settled");
            if session.is_loading() {
                print!("{}", terminal::thinking(session.in_flight()));
            }
            write_transcript(session, transcript).await?;
        }
    }
    Ok(())
}

async fn write_transcript(session: &ChatSession, path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let html = stockchat_core::render::render_transcript(
        &session.messages().await,
        session.is_loading(),
    );
    tokio::fs::write(path, html)
        .await
        .with_context(|| format!("failed to write transcript to {}", path.display()))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockchat_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
