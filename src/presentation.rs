use crate::domain::{NO_CONTENT_MESSAGE, NO_DATA_MESSAGE};
use crate::fields::FieldDescriptor;
use crate::table::TableModel;

/// What the rendering surface should show instead of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub has_error: bool,
    pub message: String,
}

impl Placeholder {
    fn info(message: &str) -> Self {
        Self {
            has_error: false,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Neither a title nor any fields were supplied.
    NoContent(Placeholder),
    /// Something was supplied but it resolved to zero rows.
    NoData(Placeholder),
    Table(TableModel),
}

impl Presentation {
    /// Picks the presentation path for one render pass.
    ///
    /// "Nothing supplied" and "supplied but empty" stay separate outcomes.
    pub fn resolve(title: &str, fields: &[FieldDescriptor]) -> Self {
        if title.trim().is_empty() && fields.is_empty() {
            return Presentation::NoContent(Placeholder::info(NO_CONTENT_MESSAGE));
        }

        let model = TableModel::from_fields(fields);
        if model.rows.is_empty() {
            Presentation::NoData(Placeholder::info(NO_DATA_MESSAGE))
        } else {
            Presentation::Table(model)
        }
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Presentation::NoContent(p) | Presentation::NoData(p) => Some(p),
            Presentation::Table(_) => None,
        }
    }
}
