//! Turns column-oriented field data into a row-oriented table with row
//! activation and copyable cells.
//!
//! [`wrapper::TableWrapper`] is the entry point: give it a title, an id and a
//! list of [`fields::FieldDescriptor`]s, register a row handler, and route
//! pointer activations through [`wrapper::TableWrapper::click`].

pub mod classifier;
pub mod clipboard;
pub mod controller;
pub mod domain;
pub mod fields;
pub mod interaction;
pub mod loader;
pub mod model;
pub mod presentation;
pub mod table;
pub mod ui;
pub mod wrapper;

pub use domain::TableError;
pub use fields::{FieldDescriptor, FieldValue};
pub use table::{RowRecord, TableModel};
pub use wrapper::{ClickTarget, TableProps, TableWrapper};
