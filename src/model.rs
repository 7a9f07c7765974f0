use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use tracing::{info, trace};

use crate::clipboard::ClipboardWriter;
use crate::domain::{Message, TableConfig, TableError};
use crate::table::RowRecord;
use crate::wrapper::{ClickTarget, TableProps, TableWrapper};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
}

pub struct Model {
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    table: TableWrapper,
    activations: Receiver<RowRecord>,
    curser_row: usize,
    curser_column: usize,
    width: usize,
    height: usize,
    status_message: String,
}

impl Model {
    /// Builds the model and registers a row handler that reports activated
    /// rows on the status line.
    pub fn init(
        config: &TableConfig,
        props: TableProps,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let table = TableWrapper::new(props, clipboard).with_row_handler(Box::new(
            move |row: &RowRecord| {
                // The receiver lives as long as the model.
                let _ = tx.send(row.clone());
            },
        ));

        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            table,
            activations: rx,
            curser_row: 0,
            curser_column: 0,
            width: 0,
            height: 0,
            status_message: String::new(),
        };
        model.set_status_message("Started fieldtable!");
        model
    }

    pub fn table(&self) -> &TableWrapper {
        &self.table
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.curser_row, self.curser_column)
    }

    pub fn show_help(&self) -> bool {
        self.modus == Modus::POPUP
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn shape(&self) -> (usize, usize) {
        self.table
            .grid()
            .map(|g| (g.rows.len(), g.columns.len()))
            .unwrap_or((0, 0))
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TableError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_selection(-1, 0),
                    Message::MoveDown => self.move_selection(1, 0),
                    Message::MoveLeft => self.move_selection(0, -1),
                    Message::MoveRight => self.move_selection(0, 1),
                    Message::MoveBeginning => self.curser_row = 0,
                    Message::MoveEnd => self.curser_row = self.shape().0.saturating_sub(1),
                    Message::ActivateRow => {
                        self.table.click(ClickTarget::Row(self.curser_row));
                    }
                    Message::CopyCell => self.copy_cell(),
                    Message::Rerender => self.rerender(),
                    Message::Resize(width, height) => self.resize(width, height),
                    Message::Help => self.modus = Modus::POPUP,
                    Message::Exit => {}
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.resize(width, height),
                    Message::Help | Message::Exit => self.modus = Modus::TABLE,
                    _ => (),
                },
            }
        }

        self.collect_activations()
    }

    fn collect_activations(&mut self) -> Result<(), TableError> {
        while let Ok(row) = self.activations.try_recv() {
            let json = serde_json::to_string(&row)?;
            info!("Row activated: {json}");
            self.set_status_message(format!("Activated row-{}: {json}", self.curser_row));
        }
        Ok(())
    }

    fn move_selection(&mut self, drow: isize, dcolumn: isize) {
        let (nrows, ncolumns) = self.shape();
        self.curser_row = self
            .curser_row
            .saturating_add_signed(drow)
            .min(nrows.saturating_sub(1));
        self.curser_column = self
            .curser_column
            .saturating_add_signed(dcolumn)
            .min(ncolumns.saturating_sub(1));
    }

    fn copy_cell(&mut self) {
        let target = ClickTarget::Copy {
            row: self.curser_row,
            column: self.curser_column,
        };
        // The write runs detached; its outcome shows up on the widget.
        match self.table.click(target) {
            Some(_pending) => self.set_status_message("Copying ..."),
            None => self.set_status_message("Column is not copyable."),
        }
    }

    fn rerender(&mut self) {
        self.table.render();
        self.move_selection(0, 0);
        self.set_status_message("Re-rendered table.");
    }

    fn resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.width, width, self.height, height
        );
        self.width = width;
        self.height = height;
    }
}
