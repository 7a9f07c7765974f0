use std::fmt;

use tracing::trace;

use crate::table::RowRecord;

/// Callback invoked with the activated row.
pub type RowHandler = Box<dyn FnMut(&RowRecord) + Send>;

/// A discrete pointer activation travelling from the innermost target
/// (a copy widget) out to its row.
#[derive(Debug, Default, Clone)]
pub struct PointerEvent {
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Presentational hints for a row. They never change dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowAffordance {
    pub pointer_cursor: bool,
    pub hoverable: bool,
}

/// Stable identifier of the row at `idx`.
pub fn row_id(idx: usize) -> String {
    format!("row-{idx}")
}

/// Hands activated rows to the registered handler.
#[derive(Default)]
pub struct RowInteractionController {
    handler: Option<RowHandler>,
}

impl RowInteractionController {
    pub fn new(handler: Option<RowHandler>) -> Self {
        Self { handler }
    }

    pub fn set_handler(&mut self, handler: Option<RowHandler>) {
        self.handler = handler;
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn affordance(&self) -> RowAffordance {
        RowAffordance {
            pointer_cursor: self.has_handler(),
            hoverable: self.has_handler(),
        }
    }

    /// Delivers `row` to the handler, once, unless the event was consumed on
    /// its way up or no handler is registered.
    ///
    /// A panic inside the handler is not caught.
    pub fn activate(&mut self, row: &RowRecord, event: &PointerEvent) {
        if event.propagation_stopped() {
            trace!("Row activation suppressed, event was consumed.");
            return;
        }
        match self.handler.as_mut() {
            Some(handler) => handler(row),
            None => trace!("Row activated without a handler."),
        }
    }
}

impl fmt::Debug for RowInteractionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowInteractionController")
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
