use std::sync::mpsc::{Receiver, TryRecvError};

use crossterm::event::{Event, KeyEvent};
use picklist_app::{ChangeEvent, PersistResolution, PickingSession, ScanOutcome};
use picklist_core::config::PicklistConfig;
use picklist_core::record::PickingTask;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Color;
use ratatui::text::{Line, Text};
use ratatui::widgets::Row;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::UiExit;
use crate::keymap;
use crate::theme;
use crate::ui::modal::{ModalSpec, render_modal, render_notice_modal};
use crate::ui::task_table::{TableColumn, TaskTableRender, TaskTableState};
use crate::ui::text::{
    compact_hint, focus_line, key_hint_height, key_hint_paragraph, label_value_line, picked_label,
    wrapped_paragraph,
};
use crate::ui::worker::{LoadEvent, LoadingState, PersistEvent, StoreWorker, render_loading_modal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Scan,
    Table,
}

pub(crate) struct PickScreen {
    session: PickingSession,
    scan: Input,
    focus: Focus,
    table: TaskTableState,
    spinner: LoadingState,
    loader: Option<Receiver<LoadEvent>>,
    load_token: u64,
    pending: Vec<Receiver<PersistEvent>>,
    notice: Option<String>,
    status_line: Option<String>,
    store_path: String,
}

impl PickScreen {
    pub(crate) fn new(config: &PicklistConfig, worker: &dyn StoreWorker) -> Self {
        let mut screen = Self {
            session: PickingSession::new(config.sync.on_persist_failure),
            scan: Input::default(),
            focus: Focus::Scan,
            table: TaskTableState::default(),
            spinner: LoadingState::default(),
            loader: None,
            load_token: 0,
            pending: Vec::new(),
            notice: None,
            status_line: None,
            store_path: config.store.path.clone(),
        };
        screen.start_refresh(worker);
        screen
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent, worker: &dyn StoreWorker) -> Option<UiExit> {
        if self.notice.is_some() {
            if keymap::is_confirm(key) || keymap::is_back(key) {
                self.notice = None;
            }
            return None;
        }

        if self.session.selected_task().is_some() {
            self.on_key_detail(key, worker);
            self.refresh_status_line();
            return None;
        }

        let exit = match self.focus {
            Focus::Scan => self.on_key_scan(key),
            Focus::Table => self.on_key_table(key, worker),
        };
        self.refresh_status_line();
        exit
    }

    fn on_key_detail(&mut self, key: KeyEvent, worker: &dyn StoreWorker) {
        if keymap::is_back(key) {
            self.close_detail();
            return;
        }

        if keymap::is_mark(key) {
            let Some(barcode) = self
                .session
                .selected_task()
                .map(|task| task.barcode.clone())
            else {
                return;
            };

            // Toggle first, then close, so the scan field is focused again
            // the moment the local flip is visible.
            if let Some(update) = self.session.toggle(&barcode) {
                self.pending.push(worker.spawn_persist(update));
            }
            self.close_detail();
        }
    }

    fn on_key_scan(&mut self, key: KeyEvent) -> Option<UiExit> {
        if keymap::is_back(key) {
            return Some(UiExit::Completed);
        }

        if keymap::is_focus_switch(key) {
            self.focus = Focus::Table;
            return None;
        }

        if keymap::is_confirm(key) {
            self.submit_scan();
            return None;
        }

        let _ = self.scan.handle_event(&Event::Key(key));
        None
    }

    fn on_key_table(&mut self, key: KeyEvent, worker: &dyn StoreWorker) -> Option<UiExit> {
        if keymap::is_back(key) || keymap::is_quit(key) {
            return Some(UiExit::Completed);
        }

        if keymap::is_focus_switch(key) {
            self.focus = Focus::Scan;
            return None;
        }

        if keymap::is_up(key) {
            self.table.move_up();
            return None;
        }

        if keymap::is_down(key) {
            self.table.move_down(self.session.tasks().len());
            return None;
        }

        if keymap::is_toggle(key) {
            let barcode = self
                .table
                .cursor_task(self.session.tasks())
                .map(|task| task.barcode.clone());
            if let Some(barcode) = barcode
                && let Some(update) = self.session.toggle(&barcode)
            {
                self.pending.push(worker.spawn_persist(update));
            }
            return None;
        }

        if keymap::is_confirm(key) {
            let barcode = self
                .table
                .cursor_task(self.session.tasks())
                .map(|task| task.barcode.clone());
            if let Some(barcode) = barcode {
                self.session.select(&barcode);
            }
            return None;
        }

        if keymap::is_refresh(key) {
            self.start_refresh(worker);
        }

        None
    }

    fn submit_scan(&mut self) {
        let scanned = self.scan.value().trim().to_string();
        if scanned.is_empty() {
            return;
        }

        match self.session.resolve_scan(&scanned) {
            ScanOutcome::Selected { barcode } => {
                self.scan = Input::default();
                self.table.move_cursor_to(self.session.tasks(), &barcode);
            }
            ScanOutcome::NotFound => {
                self.notice = Some(format!("No task matches scan '{scanned}'."));
            }
        }
    }

    fn close_detail(&mut self) {
        self.session.clear_selection();
        self.focus = Focus::Scan;
    }

    fn start_refresh(&mut self, worker: &dyn StoreWorker) {
        if self.loader.is_some() {
            return;
        }

        self.load_token += 1;
        self.loader = Some(worker.spawn_load(self.load_token));
    }

    pub(crate) fn on_tick(&mut self) {
        self.spinner.next_frame();
        self.drain();
    }

    pub(crate) fn should_drain_after_input(&self) -> bool {
        self.loader.is_some() || !self.pending.is_empty()
    }

    pub(crate) fn drain(&mut self) {
        self.drain_loader();
        self.drain_pending();
        self.refresh_status_line();
    }

    fn drain_loader(&mut self) {
        let Some(receiver) = &self.loader else {
            return;
        };

        loop {
            match receiver.try_recv() {
                Ok(LoadEvent::Started) => {}
                Ok(LoadEvent::Done { token, result }) => {
                    if token == self.load_token {
                        match result {
                            Ok(tasks) => {
                                self.session.replace_tasks(tasks);
                                self.table.clamp(self.session.tasks().len());
                            }
                            Err(message) => {
                                self.notice = Some(format!(
                                    "Refresh failed, keeping the current list.\n\n{message}"
                                ));
                            }
                        }
                    }
                    self.loader = None;
                    return;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.loader = None;
                    return;
                }
            }
        }
    }

    fn drain_pending(&mut self) {
        let mut index = 0;
        while index < self.pending.len() {
            match self.pending[index].try_recv() {
                Ok(PersistEvent::Done { update, result }) => {
                    match self.session.apply_persist_outcome(&update, result) {
                        PersistResolution::Acknowledged => {}
                        PersistResolution::KeptOptimistic { barcode, message } => {
                            self.notice = Some(format!(
                                "Saving '{barcode}' failed, keeping the local mark.\n\n{message}"
                            ));
                        }
                        PersistResolution::Reverted { barcode, message } => {
                            self.notice = Some(format!(
                                "Saving '{barcode}' failed, the mark was rolled back.\n\n{message}"
                            ));
                        }
                    }
                    self.pending.remove(index);
                }
                Err(TryRecvError::Empty) => index += 1,
                Err(TryRecvError::Disconnected) => {
                    self.pending.remove(index);
                }
            }
        }
    }

    fn refresh_status_line(&mut self) {
        for event in self.session.take_events() {
            match event {
                ChangeEvent::Loaded { count } => {
                    self.status_line = Some(format!("Loaded {count} tasks."));
                }
                ChangeEvent::Toggled { barcode, done } => {
                    self.status_line =
                        Some(format!("Marked '{barcode}' as {}.", picked_label(done)));
                }
                ChangeEvent::Reverted { barcode, done } => {
                    self.status_line =
                        Some(format!("Rolled '{barcode}' back to {}.", picked_label(done)));
                }
                ChangeEvent::SelectionChanged { .. } => {}
            }
        }
    }

    pub(crate) fn render(&self, frame: &mut ratatui::Frame<'_>) {
        let area = frame.area();
        let key_text = self.key_text(area.width);
        let footer_text = match &self.status_line {
            Some(status) => format!("{status}\n{key_text}"),
            None => key_text.to_string(),
        };
        let footer_height = key_hint_height(area.width, &footer_text);
        let [header, scan_area, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(footer_height),
            ])
            .areas(area);

        let done = self
            .session
            .tasks()
            .iter()
            .filter(|task| task.done)
            .count();
        let total = self.session.tasks().len();
        let header_text = Text::from(vec![
            Line::from("picklist"),
            Line::from(self.store_path.clone()),
            Line::from(vec![ratatui::text::Span::styled(
                format!("{done} of {total} picked"),
                if done == total && total > 0 {
                    theme::picked_text()
                } else {
                    theme::secondary_text()
                },
            )]),
        ]);
        frame.render_widget(
            wrapped_paragraph(header_text).block(theme::chrome("Picking")),
            header,
        );

        self.render_scan(frame, scan_area);
        self.render_table(frame, body);

        let hints = key_hint_paragraph(footer_text).block(theme::key_block());
        frame.render_widget(hints, footer);

        if let Some(task) = self.session.selected_task() {
            render_detail_modal(frame, task);
        }

        if self.loader.is_some() {
            render_loading_modal(
                frame,
                "Loading picking list",
                "Fetching titles from the store...",
                "Esc: quit",
                &self.spinner,
            );
        }

        if let Some(message) = self.notice.as_deref() {
            render_notice_modal(frame, "Notice", message, 70, 40, "Enter/Esc: continue");
        }
    }

    fn key_text(&self, width: u16) -> &'static str {
        if self.session.selected_task().is_some() {
            return "d/Space: toggle picked    Esc: close";
        }

        match self.focus {
            Focus::Scan => compact_hint(
                width,
                "Type/scan: barcode    Enter: resolve    Tab: table focus    Esc: quit",
                "Scan barcode    Enter: resolve    Tab: table    Esc: quit",
                "Scan | Enter resolve | Tab table | Esc quit",
            ),
            Focus::Table => compact_hint(
                width,
                "Up/Down or j/k: move    Space: toggle    Enter: detail    r: refresh    Tab: scan focus    Esc/q: quit",
                "j/k: move    Space: toggle    Enter: detail    r: refresh    Esc/q: quit",
                "j/k | Space toggle | Enter detail | r refresh | q quit",
            ),
        }
    }

    fn render_scan(&self, frame: &mut ratatui::Frame<'_>, area: ratatui::layout::Rect) {
        let title = if self.focus == Focus::Scan {
            focus_line("Scan (suffix match)")
        } else {
            Line::from("Scan (Tab to focus)")
        };

        let width = area.width.saturating_sub(2) as usize;
        let scroll = self.scan.visual_scroll(width);
        let paragraph = wrapped_paragraph(self.scan.value())
            .scroll((0, scroll as u16))
            .block(theme::chrome(title));
        frame.render_widget(paragraph, area);

        let modal_open = self.notice.is_some() || self.session.selected_task().is_some();
        if self.focus != Focus::Scan || modal_open || width == 0 {
            return;
        }

        let visual = self.scan.visual_cursor();
        let relative = visual.saturating_sub(scroll).min(width.saturating_sub(1));
        frame.set_cursor_position((area.x + 1 + relative as u16, area.y + 1));
    }

    fn render_table(&self, frame: &mut ratatui::Frame<'_>, area: ratatui::layout::Rect) {
        let columns = [
            TableColumn {
                title: "Coordinate",
                width: Constraint::Length(12),
            },
            TableColumn {
                title: "Title",
                width: Constraint::Min(20),
            },
            TableColumn {
                title: "Barcode",
                width: Constraint::Length(16),
            },
            TableColumn {
                title: "Copies",
                width: Constraint::Length(7),
            },
            TableColumn {
                title: "Status",
                width: Constraint::Length(8),
            },
        ];

        let title = if self.focus == Focus::Table {
            focus_line("Tasks")
        } else {
            Line::from("Tasks (Tab to focus)")
        };

        self.table.render_table(
            frame,
            area,
            self.session.tasks(),
            TaskTableRender {
                title,
                empty_message: "No picking tasks.",
                columns: &columns,
                header_style: theme::table_header(Color::Yellow),
                highlight_style: theme::table_highlight(Color::Yellow),
            },
            task_row,
        );
    }
}

fn task_row(task: &PickingTask) -> Row<'static> {
    let row = Row::new(vec![
        task.coordinate.clone(),
        task.title.clone(),
        task.barcode.clone(),
        task.copies.to_string(),
        picked_label(task.done).to_string(),
    ]);

    if task.done {
        row.style(theme::picked_text())
    } else {
        row
    }
}

fn render_detail_modal(frame: &mut ratatui::Frame<'_>, task: &PickingTask) {
    let mut lines = vec![
        label_value_line("Barcode", task.barcode.clone()),
        label_value_line("Coordinate", task.coordinate.clone()),
        label_value_line("Copies", task.copies.to_string()),
        label_value_line("Status", picked_label(task.done)),
    ];
    if !task.cover_ref.is_empty() {
        lines.push(label_value_line("Cover", task.cover_ref.clone()));
    }

    render_modal(
        frame,
        ModalSpec {
            title: &task.title,
            title_style: Some(theme::focus_prompt()),
            body: Text::from(lines),
            key_hint: Some("d/Space: toggle picked    Esc: close"),
            width_pct: 70,
            height_pct: 50,
        },
    );
}
