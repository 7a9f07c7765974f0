use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tracing::trace;

use crate::fields::FieldDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: String,
    pub label: String,
}

/// A flattened row keyed by column label. Values are already display strings.
///
/// Entries keep column order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    entries: Vec<(String, String)>,
}

impl RowRecord {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = RowRecord::default();
        for (k, v) in pairs {
            record.insert(k.into(), v.into());
        }
        record
    }

    // A repeated key overwrites the value but keeps its first position.
    fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Row oriented view of a set of fields. Rebuilt on every render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    pub columns: Vec<Column>,
    pub rows: Vec<RowRecord>,
}

impl TableModel {
    /// Transposes column-oriented fields into rows.
    ///
    /// The row count is the length of the longest field; shorter fields
    /// contribute empty strings past their own end. The input is never
    /// modified.
    pub fn from_fields(fields: &[FieldDescriptor]) -> Self {
        if fields.is_empty() {
            return TableModel::default();
        }

        let nrows = fields.iter().map(|f| f.data.len()).max().unwrap_or(0);

        let columns = fields
            .iter()
            .map(|f| Column {
                key: f.name.clone(),
                label: f.name.clone(),
            })
            .collect::<Vec<Column>>();

        let rows = (0..nrows)
            .map(|ridx| {
                let mut record = RowRecord::default();
                for field in fields {
                    record.insert(field.name.clone(), field.display_at(ridx));
                }
                record
            })
            .collect::<Vec<RowRecord>>();

        trace!("Transformed {} fields into {} rows", columns.len(), rows.len());
        TableModel { columns, rows }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }
}
