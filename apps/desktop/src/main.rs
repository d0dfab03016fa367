use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ChatTransport, ChatWidgetController, HttpChatClient, InputKey, ReplyOrdering,
};
use serde_json::Value;
use shared::{domain::RequestSeq, error::ChatError};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{parse_input, print_new_entries, TerminalInput};

#[derive(Parser, Debug)]
#[command(about = "Terminal front end for the movie recommendation chat")]
struct Args {
    /// Base URL of the chat backend; `/chat` is appended.
    #[arg(long)]
    server_url: Option<String>,
    /// `arrival` or `submission`.
    #[arg(long)]
    reply_ordering: Option<ReplyOrdering>,
    /// Start with the chat already open.
    #[arg(long)]
    open: bool,
}

type Completion = (RequestSeq, Result<Value, ChatError>);

#[tokio::main]
async fn main() -> Result<()> {
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
        .with_writer(std::io::stderr)
        .init();

    let transport: Arc<dyn ChatTransport> = Arc::new(
        HttpChatClient::new(&settings.server_url)
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?,
    );

    let mut controller = ChatWidgetController::new(settings.reply_ordering);
    tracing::info!(session_id = %controller.session_id(), "chat session started");
    println!("Type /open to start chatting, /close to hide the chat, /quit to exit.");
    if args.open {
        controller.open_modal();
    }

    let end = run_session(
        &mut controller,
        BufReader::new(tokio::io::stdin()),
        transport,
    )
    .await?;
    tracing::debug!(?end, "chat session finished");

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// `/quit`; replies still in flight are abandoned.
    Quit,
    /// Input reached EOF after every outstanding reply was rendered.
    InputClosed,
}

async fn run_session<R>(
    controller: &mut ChatWidgetController,
    input: R,
    transport: Arc<dyn ChatTransport>,
) -> Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = input.lines();
    let mut printed = 0usize;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    TerminalInput::Open => controller.open_modal(),
                    TerminalInput::Close => controller.close_modal(),
                    TerminalInput::Quit => {
                        if controller.in_flight() > 0 {
                            tracing::info!(
                                in_flight = controller.in_flight(),
                                "quitting with replies outstanding"
                            );
                        }
                        return Ok(SessionEnd::Quit);
                    }
                    TerminalInput::Line(text) => {
                        let Some(outbound) = controller.submit_message(InputKey::Enter, &text) else {
                            tracing::debug!("input ignored: chat hidden or message empty");
                            continue;
                        };
                        let transport = Arc::clone(&transport);
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let outcome = transport.send_chat(&outbound.request).await;
                            let _ = done_tx.send((outbound.seq, outcome));
                        });
                    }
                }
            }
            Some((seq, outcome)) = done_rx.recv() => {
                controller.deliver_reply(seq, outcome);
            }
        }

        if controller.is_modal_open() {
            print_new_entries(controller.entries(), &mut printed);
        }
    }

    // Piped input: wait for outstanding replies before exiting.
    while controller.in_flight() > 0 {
        let Some((seq, outcome)) = done_rx.recv().await else {
            break;
        };
        controller.deliver_reply(seq, outcome);
    }
    if controller.is_modal_open() {
        print_new_entries(controller.entries(), &mut printed);
    }

    Ok(SessionEnd::InputClosed)
}
