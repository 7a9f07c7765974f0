use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::clipboard::CopyState;
use crate::domain::{HELP_TEXT, TableConfig};
use crate::model::Model;
use crate::presentation::Placeholder;
use crate::wrapper::{CellView, GridView, TableView};

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2;

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let [table_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUSLINE_HEIGHT)])
                .areas(frame.area());

        match model.table().view() {
            TableView::Grid(grid) => self.draw_grid(model, grid, frame, table_area),
            TableView::Placeholder(placeholder) => {
                Self::draw_placeholder(placeholder, frame, table_area)
            }
        }
        Self::draw_statusline(model, frame, status_area);

        if model.show_help() {
            Self::draw_help(frame, table_area);
        }
    }

    fn draw_grid(&self, model: &Model, grid: &GridView, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            grid.columns
                .iter()
                .map(|c| Cell::from(c.label.clone()).bold()),
        );

        let widths = grid
            .columns
            .iter()
            .enumerate()
            .map(|(cidx, column)| {
                let widest = grid
                    .rows
                    .iter()
                    .filter_map(|r| r.cells.get(cidx))
                    .map(cell_width)
                    .max()
                    .unwrap_or(0);
                let width =
                    std::cmp::max(column.label.chars().count(), widest) + COLUMN_WIDTH_MARGIN;
                Constraint::Length(std::cmp::min(width, self.max_column_width) as u16)
            })
            .collect::<Vec<Constraint>>();

        let rows = grid
            .rows
            .iter()
            .map(|r| Row::new(r.cells.iter().map(render_cell)));

        // Row emphasis is the hover affordance; only rows with a handler get it.
        let hoverable = grid.rows.first().is_some_and(|r| r.affordance.hoverable);
        let mut table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(Line::from(grid.caption.as_str()).centered()))
            .cell_highlight_style(Style::new().reversed());
        if hoverable {
            table = table.row_highlight_style(Style::new().bold().fg(Color::Yellow));
        }

        let (row, column) = model.selection();
        let mut state = TableState::default()
            .with_selected(Some(row))
            .with_selected_column(Some(column));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_placeholder(placeholder: &Placeholder, frame: &mut Frame, area: Rect) {
        let style = if placeholder.has_error {
            Style::new().fg(Color::Red)
        } else {
            Style::new().italic()
        };
        let [center] = Layout::vertical([Constraint::Length(3)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Block::bordered(), area);
        frame.render_widget(
            Paragraph::new(placeholder.message.as_str())
                .style(style)
                .centered(),
            center,
        );
    }

    fn draw_statusline(model: &Model, frame: &mut Frame, area: Rect) {
        let table = model.table();
        let props = table.props();
        let nrows = table.grid().map(|g| g.rows.len()).unwrap_or(0);
        let (row, column) = model.selection();

        // Accessible name of the copy widget under the cursor, if any.
        let widget = table
            .grid()
            .and_then(|g| g.rows.get(row))
            .and_then(|r| r.cells.get(column))
            .and_then(|c| c.copy.as_ref())
            .map(|b| format!(" [{}]", b.label()))
            .unwrap_or_default();

        let mut spans = vec![
            Span::from(format!(" {} ", props.id)).bold().blue(),
        ];
        if let Some(class_name) = &props.class_name {
            spans.push(Span::from(format!("{class_name} ")).dim());
        }
        spans.push(Span::from(format!("{nrows} rows ")));
        spans.push(Span::from(widget).green());
        spans.push(Span::from(format!(" {}", model.status_message())).yellow());

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_help(frame: &mut Frame, area: Rect) {
        let width = HELP_TEXT.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
        let height = HELP_TEXT.lines().count() as u16 + 2;
        let [vertical] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(vertical);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(HELP_TEXT).block(Block::bordered().title(" Help ")),
            popup,
        );
    }
}

fn cell_width(cell: &CellView) -> usize {
    let indicator = if cell.copy.is_some() { 2 } else { 0 };
    cell.value.chars().count() + indicator
}

fn render_cell(cell: &CellView) -> Cell<'_> {
    match &cell.copy {
        None => Cell::from(cell.value.as_str()),
        Some(button) => {
            let state = button.state();
            let indicator = match state {
                CopyState::Idle => Span::from(state.indicator()).dim(),
                CopyState::Confirmed => Span::from(state.indicator()).green(),
            };
            Cell::from(Line::from(vec![
                Span::from(cell.value.as_str()),
                Span::from(" "),
                indicator,
            ]))
        }
    }
}
