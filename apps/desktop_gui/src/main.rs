use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpChatClient, ReplyOrdering};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{ChatWidgetApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(about = "Movie recommendation chat widget")]
struct Args {
    /// Base URL of the chat backend; `/chat` is appended.
    #[arg(long)]
    server_url: Option<String>,
    /// `arrival` or `submission`.
    #[arg(long)]
    reply_ordering: Option<ReplyOrdering>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings().context("failed to load chat widget settings")?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(ordering) = args.reply_ordering {
        settings.reply_ordering = ordering;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let transport = HttpChatClient::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    tracing::info!(endpoint = %transport.endpoint(), "using chat endpoint");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(Arc::new(transport), cmd_rx, ui_tx);

    let startup = StartupConfig {
        server_url: settings.server_url,
        reply_ordering: settings.reply_ordering,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Movie Chat")
            .with_inner_size([960.0, 680.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Movie Chat",
        options,
        Box::new(move |_cc| Ok(Box::new(ChatWidgetApp::new(startup, cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow!("desktop gui exited with error: {err}"))
}
