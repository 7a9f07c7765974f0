//! Column-oriented input data.
//!
//! A [`FieldDescriptor`] is one named column of raw values. Columns are
//! independent of each other and may have different lengths.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A named column of values as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Display label and row key.
    pub name: String,
    /// Where the data came from. Carried along, never interpreted.
    #[serde(default)]
    pub data_path: String,
    #[serde(default)]
    pub data: Vec<FieldValue>,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        data_path: impl Into<String>,
        data: impl IntoIterator<Item = FieldValue>,
    ) -> Self {
        Self {
            name: name.into(),
            data_path: data_path.into(),
            data: data.into_iter().collect(),
        }
    }

    /// Normalized display string for row `idx`. Indices past the end of this
    /// field are treated like `null`.
    pub fn display_at(&self, idx: usize) -> String {
        self.data
            .get(idx)
            .map(FieldValue::to_display)
            .unwrap_or_default()
    }
}

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<ScalarValue>),
}

/// Element of a list-valued cell. Strings and numbers are expected; booleans
/// and nulls are tolerated so odd input still normalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl FieldValue {
    pub fn to_display(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => canonical_number(n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(ScalarValue::to_display)
                .collect::<Vec<String>>()
                .join(", "),
        }
    }
}

impl ScalarValue {
    pub fn to_display(&self) -> String {
        match self {
            ScalarValue::Null => String::new(),
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Number(n) => canonical_number(n),
            ScalarValue::Text(s) => s.clone(),
        }
    }
}

/// Shortest round-trip text of a number. Integers print as written; floats
/// use plain decimal notation for magnitudes in `[1e-6, 1e21)` and exponent
/// notation (`1e-7`, `1e+21`) outside of it, dropping any trailing `.0`.
pub fn canonical_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => float_text(f),
        _ => n.to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f == 0.0 {
        // also catches -0.0
        return "0".to_string();
    }
    if !f.is_finite() {
        return f.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e-7".
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // position of the decimal point relative to the first digit
    let point = exp + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(-point as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{first}e{sign}{}", exp.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exp.abs())
        }
    };

    if f.is_sign_negative() {
        format!("-{body}")
    } else {
        body
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Null)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Number(n.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_keep_their_textual_form() {
        let values: Vec<FieldValue> =
            serde_json::from_value(json!([1995, 81, 8.3, 373554033, 95.5, -4])).unwrap();
        let shown: Vec<String> = values.iter().map(FieldValue::to_display).collect();
        assert_eq!(shown, vec!["1995", "81", "8.3", "373554033", "95.5", "-4"]);
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        let values: Vec<FieldValue> = serde_json::from_str(
            "[1e-7, 1e21, 123456789012345678901234, 0.1, 2.5e-3, 0.000001, 1e20, -1.5e-9]",
        )
        .unwrap();
        let shown: Vec<String> = values.iter().map(FieldValue::to_display).collect();
        assert_eq!(
            shown,
            vec![
                "1e-7",
                "1e+21",
                "1.2345678901234568e+23",
                "0.1",
                "0.0025",
                "0.000001",
                "100000000000000000000",
                "-1.5e-9",
            ]
        );
    }

    #[test]
    fn large_integers_stay_exact() {
        let v: FieldValue = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(v.to_display(), "18446744073709551615");
        assert_eq!(FieldValue::from(i64::MIN).to_display(), "-9223372036854775808");
    }

    #[test]
    fn whole_floats_drop_fraction() {
        assert_eq!(FieldValue::from(1995.0).to_display(), "1995");
        assert_eq!(FieldValue::from(-0.0).to_display(), "0");
        assert_eq!(FieldValue::from(f64::NAN), FieldValue::Null);
    }

    #[test]
    fn booleans_and_null() {
        assert_eq!(FieldValue::from(true).to_display(), "true");
        assert_eq!(FieldValue::from(false).to_display(), "false");
        assert_eq!(FieldValue::Null.to_display(), "");
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
    }

    #[test]
    fn lists_are_joined() {
        let v: FieldValue = serde_json::from_value(json!(["USA", "Canada", 3])).unwrap();
        assert_eq!(v.to_display(), "USA, Canada, 3");
        let empty: FieldValue = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty.to_display(), "");
        let odd: FieldValue = serde_json::from_value(json!([null, "a", false])).unwrap();
        assert_eq!(odd.to_display(), ", a, false");
    }

    #[test]
    fn descriptor_from_json() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "name": "Countries",
            "data_path": "movie.countries[size:1]",
            "data": [["USA"], null, "x"]
        }))
        .unwrap();
        assert_eq!(field.name, "Countries");
        assert_eq!(field.data_path, "movie.countries[size:1]");
        assert_eq!(
            field.data,
            vec![
                FieldValue::List(vec![ScalarValue::from("USA")]),
                FieldValue::Null,
                FieldValue::from("x"),
            ]
        );
        assert_eq!(field.display_at(0), "USA");
        assert_eq!(field.display_at(1), "");
        assert_eq!(field.display_at(7), "");
    }

    #[test]
    fn data_path_is_optional() {
        let field: FieldDescriptor =
            serde_json::from_value(json!({"name": "Item", "data": ["A"]})).unwrap();
        assert_eq!(field.data_path, "");
        assert_eq!(field.data.len(), 1);
    }
}
