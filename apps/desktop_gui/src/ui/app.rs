use client_core::{ChatWidgetController, InputKey, LogEntry, LogLine, ReplyOrdering};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{domain::LogRole, error::ChatError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};

const TRANSCRIPT_MAX_HEIGHT: f32 = 360.0;
const USER_ENTRY_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2b, 0x5d, 0x9e);
const BOT_ENTRY_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2f, 0x33, 0x3a);

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub reply_ordering: ReplyOrdering,
}

pub struct ChatWidgetApp {
    controller: ChatWidgetController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    status: String,
    focus_input: bool,
}

impl ChatWidgetApp {
    pub fn new(
        startup: StartupConfig,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let controller = ChatWidgetController::new(startup.reply_ordering);
        tracing::info!(
            session_id = %controller.session_id(),
            server_url = %startup.server_url,
            "chat widget ready"
        );
        Self {
            controller,
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            status: "Starting backend worker...".to_string(),
            focus_input: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::BackendFailed(message) => {
                    tracing::error!("{message}");
                    self.status = message;
                }
                UiEvent::ReplyReceived { seq, outcome } => {
                    self.controller.deliver_reply(seq, outcome);
                }
            }
        }
    }

    fn session_label(&self) -> String {
        format!(
            "session {} | replies in {} order",
            self.controller.session_id(),
            self.controller.ordering()
        )
    }

    fn open_chat(&mut self) {
        self.controller.open_modal();
        self.focus_input = true;
    }

    /// Enter on the input field.
    fn submit_draft(&mut self) {
        let Some(outbound) = self.controller.on_key_press(InputKey::Enter) else {
            return;
        };
        let seq = outbound.seq;
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::SendChat(outbound),
            &mut self.status,
        )
        .is_err()
        {
            self.controller
                .deliver_reply(seq, Err(ChatError::transport(self.status.clone())));
        }
    }

    fn show_landing(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(self.session_label());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.heading("Find your next movie");
                ui.label(format!("Recommendations from {}", self.server_url));
                ui.add_space(16.0);
                let button = egui::Button::new(
                    egui::RichText::new("Get Recommendations").strong().size(16.0),
                )
                .min_size(egui::vec2(220.0, 40.0));
                if ui.add(button).clicked() {
                    self.open_chat();
                }
            });
        });
    }

    fn show_chat_modal(&mut self, ctx: &egui::Context) {
        if !self.controller.is_modal_open() {
            return;
        }

        let mut window_open = true;
        let mut close_clicked = false;
        egui::Window::new("Movie Chat")
            .open(&mut window_open)
            .collapsible(false)
            .resizable(true)
            .default_width(480.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                let scroll_to_bottom = self.controller.take_scroll_request();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .max_height(TRANSCRIPT_MAX_HEIGHT)
                    .show(ui, |ui| {
                        for entry in self.controller.entries() {
                            show_log_entry(ui, entry);
                        }
                        if scroll_to_bottom {
                            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                        }
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    let input = ui.add(
                        egui::TextEdit::singleline(self.controller.draft_mut())
                            .hint_text("Type a message and press Enter")
                            .desired_width(ui.available_width() - 64.0),
                    );
                    if self.focus_input {
                        input.request_focus();
                        self.focus_input = false;
                    }
                    if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        self.submit_draft();
                        input.request_focus();
                    }
                    if ui.button("Close").clicked() {
                        close_clicked = true;
                    }
                });

                if self.controller.in_flight() > 0 {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.small(format!("waiting on {} reply(s)", self.controller.in_flight()));
                    });
                }
            });

        if !window_open || close_clicked {
            self.controller.close_modal();
        }
    }
}

fn show_log_entry(ui: &mut egui::Ui, entry: &LogEntry) {
    let (fill, layout) = match entry.role() {
        LogRole::User => (
            USER_ENTRY_COLOR,
            egui::Layout::top_down(egui::Align::Max),
        ),
        LogRole::Bot => (BOT_ENTRY_COLOR, egui::Layout::top_down(egui::Align::Min)),
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::new()
            .fill(fill)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.set_max_width(360.0);
                for line in entry.lines() {
                    match line {
                        LogLine::Text(text) => {
                            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
                        }
                        LogLine::Link {
                            label,
                            href,
                            new_tab,
                        } => {
                            if ui.link(label).on_hover_text(href.as_str()).clicked() {
                                let url = if new_tab {
                                    egui::OpenUrl::new_tab(href)
                                } else {
                                    egui::OpenUrl::same_tab(href)
                                };
                                ui.ctx().open_url(url);
                            }
                        }
                    }
                    ui.add_space(4.0);
                }
            });
    });
    ui.add_space(6.0);
}

impl eframe::App for ChatWidgetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_landing(ctx);
        self.show_chat_modal(ctx);

        if self.controller.in_flight() > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::render::APOLOGY_TEXT;
    use crossbeam_channel::bounded;
    use serde_json::json;

    fn app_with_queue(capacity: usize) -> (ChatWidgetApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(capacity);
        let (ui_tx, ui_rx) = bounded(16);
        let app = ChatWidgetApp::new(
            StartupConfig {
                server_url: "http://127.0.0.1:5000".into(),
                reply_ordering: ReplyOrdering::Arrival,
            },
            cmd_tx,
            ui_rx,
        );
        (app, cmd_rx, ui_tx)
    }

    #[test]
    fn enter_queues_one_send_command_with_session_id() {
        let (mut app, cmd_rx, _ui_tx) = app_with_queue(4);
        app.open_chat();
        app.controller.draft_mut().push_str(" story ");

        app.submit_draft();

        let BackendCommand::SendChat(outbound) = cmd_rx.try_recv().expect("queued");
        assert_eq!(outbound.request.message, "story");
        assert_eq!(&outbound.request.user_id, app.controller.session_id());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn status_bar_shows_session_and_reply_ordering() {
        let (app, _cmd_rx, _ui_tx) = app_with_queue(4);
        let label = app.session_label();
        assert!(label.starts_with(&format!("session {}", app.controller.session_id())));
        assert!(label.ends_with("replies in arrival order"));
    }

    #[test]
    fn submit_while_closed_queues_nothing() {
        let (mut app, cmd_rx, _ui_tx) = app_with_queue(4);
        app.controller.draft_mut().push_str("story");

        app.submit_draft();

        assert!(cmd_rx.try_recv().is_err());
        assert!(app.controller.entries().is_empty());
    }

    #[test]
    fn reply_events_are_rendered_into_the_transcript() {
        let (mut app, cmd_rx, ui_tx) = app_with_queue(4);
        app.open_chat();
        app.controller.draft_mut().push_str("genre");
        app.submit_draft();
        let BackendCommand::SendChat(outbound) = cmd_rx.try_recv().expect("queued");

        ui_tx
            .try_send(UiEvent::ReplyReceived {
                seq: outbound.seq,
                outcome: Ok(json!({"response": "Awesome! What genre do you like?"})),
            })
            .expect("event");
        app.process_ui_events();

        let texts: Vec<String> = app
            .controller
            .entries()
            .iter()
            .map(LogEntry::plain_text)
            .collect();
        assert_eq!(texts, vec!["genre", "Awesome! What genre do you like?"]);
    }

    #[test]
    fn full_command_queue_renders_apology_instead_of_hanging() {
        let (mut app, _cmd_rx, _ui_tx) = app_with_queue(1);
        app.open_chat();
        app.controller.draft_mut().push_str("first");
        app.submit_draft();
        app.controller.draft_mut().push_str("second");
        app.submit_draft();

        assert_eq!(app.controller.in_flight(), 1);
        let last = app.controller.entries().last().expect("entry");
        assert_eq!(last.plain_text(), APOLOGY_TEXT);
        assert_eq!(app.status, "UI command queue is full; please retry");
    }
}
