//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::ChatTransport;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Spawns the backend worker thread. Each chat submission runs on its own
/// task, so overlapping submissions are in flight concurrently and their
/// replies reach the UI in completion order.
pub fn launch(
    transport: Arc<dyn ChatTransport>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        runtime.block_on(async move {
            let mut tasks = Vec::new();
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::SendChat(outbound) => {
                        let transport = Arc::clone(&transport);
                        let ui_tx = ui_tx.clone();
                        tasks.push(tokio::spawn(async move {
                            let outcome = transport.send_chat(&outbound.request).await;
                            let event = UiEvent::ReplyReceived {
                                seq: outbound.seq,
                                outcome,
                            };
                            if ui_tx.send(event).is_err() {
                                tracing::warn!(
                                    seq = outbound.seq.0,
                                    "ui event channel closed; dropping chat reply"
                                );
                            }
                        }));
                    }
                }
                tasks.retain(|task| !task.is_finished());
            }

            // Command queue closed: let in-flight exchanges finish.
            for task in tasks {
                let _ = task.await;
            }
            tracing::debug!("backend worker stopped");
        });
    })
}
