use picklist_core::record::PickingTask;
use ratatui::Frame;
use ratatui::layout::{Constraint, Margin, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{
    Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table, TableState,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TableColumn {
    pub(crate) title: &'static str,
    pub(crate) width: Constraint,
}

#[derive(Debug, Clone)]
pub(crate) struct TaskTableRender<'a> {
    pub(crate) title: Line<'a>,
    pub(crate) empty_message: &'a str,
    pub(crate) columns: &'a [TableColumn],
    pub(crate) header_style: Style,
    pub(crate) highlight_style: Style,
}

/// Cursor over a task list the session owns. The table never copies the
/// tasks; callers pass the current slice into every render.
#[derive(Debug, Default)]
pub(crate) struct TaskTableState {
    cursor: usize,
}

impl TaskTableState {
    pub(crate) fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub(crate) fn cursor_task<'a>(&self, tasks: &'a [PickingTask]) -> Option<&'a PickingTask> {
        tasks.get(self.cursor)
    }

    pub(crate) fn move_cursor_to(&mut self, tasks: &[PickingTask], barcode: &str) {
        if let Some(index) = tasks.iter().position(|task| task.barcode == barcode) {
            self.cursor = index;
        }
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn render_table<F>(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        tasks: &[PickingTask],
        render: TaskTableRender<'_>,
        row_builder: F,
    ) where
        F: Fn(&PickingTask) -> Row<'static>,
    {
        if tasks.is_empty() {
            let empty = Paragraph::new(render.empty_message)
                .block(crate::theme::chrome(render.title.clone()));
            frame.render_widget(empty, area);
            return;
        }

        let header =
            Row::new(render.columns.iter().map(|column| column.title)).style(render.header_style);
        let rows = tasks.iter().map(&row_builder);
        let widths: Vec<Constraint> = render.columns.iter().map(|column| column.width).collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(crate::theme::chrome(render.title))
            .row_highlight_style(render.highlight_style)
            .highlight_symbol(">> ");

        let mut state = TableState::new();
        state.select(Some(self.cursor.min(tasks.len() - 1)));
        frame.render_stateful_widget(table, area, &mut state);

        let viewport = area.height.saturating_sub(3) as usize;
        let mut scrollbar_state = ScrollbarState::new(tasks.len())
            .position(self.cursor)
            .viewport_content_length(viewport);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}
