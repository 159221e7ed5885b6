mod keymap;
mod pick_flow;
mod theme;
mod ui;

use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use picklist_core::config::PicklistConfig;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::pick_flow::PickScreen;
use crate::ui::worker::{StoreWorker, SystemStoreWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Completed,
    Canceled,
}

pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        let terminal = enter_with_ops(
            || enable_raw_mode().context("failed to enable raw mode"),
            || {
                let mut out = stdout();
                execute!(out, EnterAlternateScreen, Hide)
                    .context("failed to enter alternate screen")
            },
            || {
                let backend = CrosstermBackend::new(stdout());
                Terminal::new(backend).context("failed to create terminal backend")
            },
            || {
                let mut out = stdout();
                execute!(out, Show, LeaveAlternateScreen)
                    .context("failed to restore terminal screen during rollback")
            },
            || disable_raw_mode().context("failed to disable raw mode during rollback"),
        )?;
        Ok(Self { terminal })
    }

    pub(crate) fn draw<F>(&mut self, draw_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame<'_>),
    {
        self.terminal
            .draw(draw_fn)
            .context("failed to render terminal")?;
        Ok(())
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn enter_with_ops<T, EnableRawMode, EnterAltScreen, CreateTerminal, LeaveAltScreen, DisableRawMode>(
    mut enable_raw_mode_op: EnableRawMode,
    mut enter_alt_screen_op: EnterAltScreen,
    mut create_terminal_op: CreateTerminal,
    mut leave_alt_screen_op: LeaveAltScreen,
    mut disable_raw_mode_op: DisableRawMode,
) -> Result<T>
where
    EnableRawMode: FnMut() -> Result<()>,
    EnterAltScreen: FnMut() -> Result<()>,
    CreateTerminal: FnMut() -> Result<T>,
    LeaveAltScreen: FnMut() -> Result<()>,
    DisableRawMode: FnMut() -> Result<()>,
{
    enable_raw_mode_op()?;

    if let Err(error) = enter_alt_screen_op() {
        return Err(failure_with_rollback(
            error,
            false,
            &mut leave_alt_screen_op,
            &mut disable_raw_mode_op,
        ));
    }

    match create_terminal_op() {
        Ok(terminal) => Ok(terminal),
        Err(error) => Err(failure_with_rollback(
            error,
            true,
            &mut leave_alt_screen_op,
            &mut disable_raw_mode_op,
        )),
    }
}

fn failure_with_rollback<LeaveAltScreen, DisableRawMode>(
    setup_error: anyhow::Error,
    alt_screen_entered: bool,
    leave_alt_screen_op: &mut LeaveAltScreen,
    disable_raw_mode_op: &mut DisableRawMode,
) -> anyhow::Error
where
    LeaveAltScreen: FnMut() -> Result<()>,
    DisableRawMode: FnMut() -> Result<()>,
{
    let mut cleanup_failures = Vec::<String>::new();

    if alt_screen_entered && let Err(error) = leave_alt_screen_op() {
        cleanup_failures.push(format!(
            "failed to restore alternate screen during rollback: {error:#}"
        ));
    }

    if let Err(error) = disable_raw_mode_op() {
        cleanup_failures.push(format!(
            "failed to disable raw mode during rollback: {error:#}"
        ));
    }

    if cleanup_failures.is_empty() {
        setup_error
    } else {
        anyhow!(
            "{setup_error:#}\nterminal rollback cleanup failed: {}",
            cleanup_failures.join("\n")
        )
    }
}

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Runs the picking screen until the operator quits.
pub fn run(config: &PicklistConfig) -> Result<UiExit> {
    let worker = SystemStoreWorker::new(PathBuf::from(&config.store.path));
    run_with_worker(config, &worker)
}

fn run_with_worker(config: &PicklistConfig, worker: &dyn StoreWorker) -> Result<UiExit> {
    let mut session = TerminalSession::enter()?;
    let mut screen = PickScreen::new(config, worker);
    const TICK_RATE: Duration = Duration::from_millis(120);

    loop {
        session.draw(|frame| screen.render(frame))?;

        let has_event = event::poll(TICK_RATE).context("failed to poll terminal event")?;
        if !has_event {
            screen.on_tick();
            continue;
        }

        let event = event::read().context("failed to read terminal event")?;
        let key = match event {
            Event::Resize(_, _) => {
                session.autoresize()?;
                continue;
            }
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => key,
            _ => continue,
        };

        if is_ctrl_c(key) {
            return Ok(UiExit::Canceled);
        }

        if let Some(exit) = screen.on_key(key, worker) {
            return Ok(exit);
        }

        if screen.should_drain_after_input() {
            screen.drain();
        }
    }
}

pub(crate) fn centered_rect(
    percent_x: u16,
    percent_y: u16,
    area: ratatui::layout::Rect,
) -> ratatui::layout::Rect {
    let pct_x = percent_x.min(100);
    let pct_y = percent_y.min(100);

    let [_, vertical, _] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .areas(area);
    let [_, horizontal, _] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .areas(vertical);
    horizontal
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;

    use super::{centered_rect, enter_with_ops, is_ctrl_c};

    #[test]
    fn centered_rect_returns_middle_segment() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(80, 60, area);

        assert_eq!(centered.width, 80);
        assert_eq!(centered.height, 30);
        assert_eq!(centered.x, 10);
        assert_eq!(centered.y, 10);
    }

    #[test]
    fn centered_rect_clamps_percentages_over_100() {
        let area = Rect::new(3, 4, 40, 20);
        let centered = centered_rect(120, 150, area);

        assert_eq!(centered, area);
    }

    #[test]
    fn ctrl_c_requires_the_control_modifier() {
        assert!(is_ctrl_c(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_ctrl_c(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
    }

    #[test]
    fn enter_with_ops_rolls_back_raw_mode_when_alt_screen_step_fails() {
        let calls = RefCell::new(Vec::<&'static str>::new());

        let error = enter_with_ops(
            || {
                calls.borrow_mut().push("enable_raw_mode");
                Ok(())
            },
            || {
                calls.borrow_mut().push("enter_alt_screen");
                Err(anyhow!("enter alt failed"))
            },
            || {
                calls.borrow_mut().push("create_terminal");
                Ok(())
            },
            || {
                calls.borrow_mut().push("leave_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("disable_raw_mode");
                Ok(())
            },
        )
        .expect_err("enter should fail");

        assert_eq!(
            calls.into_inner(),
            vec!["enable_raw_mode", "enter_alt_screen", "disable_raw_mode"]
        );
        assert!(format!("{error:#}").contains("enter alt failed"));
    }

    #[test]
    fn enter_with_ops_rolls_back_alt_screen_then_raw_mode_when_terminal_creation_fails() {
        let calls = RefCell::new(Vec::<&'static str>::new());

        let error = enter_with_ops(
            || {
                calls.borrow_mut().push("enable_raw_mode");
                Ok(())
            },
            || {
                calls.borrow_mut().push("enter_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("create_terminal");
                Err::<(), _>(anyhow!("create terminal failed"))
            },
            || {
                calls.borrow_mut().push("leave_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("disable_raw_mode");
                Ok(())
            },
        )
        .expect_err("enter should fail");

        assert_eq!(
            calls.into_inner(),
            vec![
                "enable_raw_mode",
                "enter_alt_screen",
                "create_terminal",
                "leave_alt_screen",
                "disable_raw_mode",
            ]
        );
        assert!(format!("{error:#}").contains("create terminal failed"));
    }

    #[test]
    fn enter_with_ops_reports_cleanup_failures_alongside_the_setup_error() {
        let error = enter_with_ops(
            || Ok(()),
            || Ok(()),
            || Err::<(), _>(anyhow!("create terminal failed")),
            || Err(anyhow!("leave alt failed")),
            || Err(anyhow!("disable raw failed")),
        )
        .expect_err("enter should fail");

        let message = format!("{error:#}");
        assert!(message.contains("create terminal failed"));
        assert!(message.contains("leave alt failed"));
        assert!(message.contains("disable raw failed"));
    }

    #[test]
    fn enter_with_ops_success_runs_no_cleanup() {
        let calls = RefCell::new(Vec::<&'static str>::new());

        let value = enter_with_ops(
            || {
                calls.borrow_mut().push("enable_raw_mode");
                Ok(())
            },
            || {
                calls.borrow_mut().push("enter_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("create_terminal");
                Ok::<_, anyhow::Error>("terminal")
            },
            || {
                calls.borrow_mut().push("leave_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("disable_raw_mode");
                Ok(())
            },
        )
        .expect("enter should succeed");

        assert_eq!(value, "terminal");
        assert_eq!(
            calls.into_inner(),
            vec!["enable_raw_mode", "enter_alt_screen", "create_terminal"]
        );
    }
}
