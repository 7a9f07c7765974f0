//! The table component: owns the caller's input, rebuilds the view on every
//! render pass and routes pointer activations.

use std::sync::Arc;

use derive_setters::Setters;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::classifier::is_copyable_column;
use crate::clipboard::{ClipboardWriter, CopyButton};
use crate::fields::FieldDescriptor;
use crate::interaction::{
    PointerEvent, RowAffordance, RowHandler, RowInteractionController, row_id,
};
use crate::presentation::{Placeholder, Presentation};
use crate::table::{Column, RowRecord, TableModel};

/// Caller supplied input. `id` and `class_name` are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Setters)]
#[setters(prefix = "with_", into)]
pub struct TableProps {
    pub title: String,
    pub id: String,
    pub fields: Vec<FieldDescriptor>,
    #[setters(strip_option)]
    pub class_name: Option<String>,
}

#[derive(Debug)]
pub struct CellView {
    pub key: String,
    pub value: String,
    pub copy: Option<CopyButton>,
}

#[derive(Debug)]
pub struct RowView {
    pub id: String,
    pub record: RowRecord,
    pub affordance: RowAffordance,
    pub cells: Vec<CellView>,
}

#[derive(Debug)]
pub struct GridView {
    pub caption: String,
    pub columns: Vec<Column>,
    pub rows: Vec<RowView>,
}

#[derive(Debug)]
pub enum TableView {
    Placeholder(Placeholder),
    Grid(GridView),
}

/// What a pointer activation landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Row(usize),
    Copy { row: usize, column: usize },
}

pub struct TableWrapper {
    props: TableProps,
    controller: RowInteractionController,
    clipboard: Arc<dyn ClipboardWriter>,
    view: TableView,
}

impl TableWrapper {
    pub fn new(props: TableProps, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        let mut wrapper = Self {
            props,
            controller: RowInteractionController::default(),
            clipboard,
            view: TableView::Grid(GridView {
                caption: String::new(),
                columns: Vec::new(),
                rows: Vec::new(),
            }),
        };
        wrapper.render();
        wrapper
    }

    pub fn with_row_handler(mut self, handler: RowHandler) -> Self {
        self.set_row_handler(Some(handler));
        self
    }

    pub fn set_row_handler(&mut self, handler: Option<RowHandler>) {
        self.controller.set_handler(handler);
        self.render();
    }

    pub fn props(&self) -> &TableProps {
        &self.props
    }

    pub fn set_props(&mut self, props: TableProps) {
        self.props = props;
        self.render();
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    /// Rebuilds the view from the current props.
    ///
    /// The previous view, and with it every copy widget, is dropped.
    pub fn render(&mut self) -> &TableView {
        self.view = match Presentation::resolve(&self.props.title, &self.props.fields) {
            Presentation::NoContent(p) | Presentation::NoData(p) => {
                debug!("Render placeholder: {}", p.message);
                TableView::Placeholder(p)
            }
            Presentation::Table(model) => TableView::Grid(self.build_grid(model)),
        };
        &self.view
    }

    fn build_grid(&self, model: TableModel) -> GridView {
        let affordance = self.controller.affordance();
        let copyable = model
            .columns
            .iter()
            .map(|c| is_copyable_column(&c.key))
            .collect::<Vec<bool>>();

        let rows = model
            .rows
            .into_iter()
            .enumerate()
            .map(|(ridx, record)| {
                let cells = model
                    .columns
                    .iter()
                    .zip(copyable.iter())
                    .map(|(column, &is_copyable)| {
                        let value = record.get(&column.key).unwrap_or_default().to_string();
                        let copy = is_copyable
                            .then(|| CopyButton::new(value.clone(), self.clipboard.clone()));
                        CellView {
                            key: column.key.clone(),
                            value,
                            copy,
                        }
                    })
                    .collect::<Vec<CellView>>();
                RowView {
                    id: row_id(ridx),
                    record,
                    affordance,
                    cells,
                }
            })
            .collect::<Vec<RowView>>();

        debug!(
            "Render table \"{}\": {} columns, {} rows",
            self.props.title,
            model.columns.len(),
            rows.len()
        );
        GridView {
            caption: self.props.title.clone(),
            columns: model.columns,
            rows,
        }
    }

    pub fn grid(&self) -> Option<&GridView> {
        match &self.view {
            TableView::Grid(grid) => Some(grid),
            TableView::Placeholder(_) => None,
        }
    }

    /// Looks a row up by its identifier, e.g. `row-3`.
    pub fn row_by_id(&self, id: &str) -> Option<&RowView> {
        self.grid()?.rows.iter().find(|r| r.id == id)
    }

    pub fn copy_buttons(&self) -> impl Iterator<Item = &CopyButton> {
        self.grid()
            .into_iter()
            .flat_map(|g| g.rows.iter())
            .flat_map(|r| r.cells.iter())
            .filter_map(|c| c.copy.as_ref())
    }

    /// Dispatches one pointer activation.
    ///
    /// A click on a copy widget starts its clipboard write and is consumed
    /// there; a click on a row goes to the row handler. Returns the pending
    /// clipboard write, if one was started. Must be called within a tokio
    /// runtime when the target is a copy widget.
    pub fn click(&mut self, target: ClickTarget) -> Option<JoinHandle<()>> {
        let TableView::Grid(grid) = &self.view else {
            trace!("Click on placeholder ignored.");
            return None;
        };
        let mut event = PointerEvent::default();

        let (ridx, pending) = match target {
            ClickTarget::Row(ridx) => (ridx, None),
            ClickTarget::Copy { row, column } => {
                let button = grid
                    .rows
                    .get(row)
                    .and_then(|r| r.cells.get(column))
                    .and_then(|c| c.copy.as_ref());
                match button {
                    Some(button) => (row, Some(button.activate(&mut event))),
                    None => {
                        trace!("No copy widget at row {row}, column {column}.");
                        return None;
                    }
                }
            }
        };

        match grid.rows.get(ridx) {
            Some(row) => self.controller.activate(&row.record, &event),
            None => trace!("Click on unknown row {ridx} ignored."),
        }
        pending
    }
}
