//! Cell value types

use std::fmt;

use crate::error::{Error, Result};
use crate::path::{CellPath, PATH_DELIMITER, PATH_LIST_DELIMITER};

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Scalar number (integers are stored as f64)
    Number(f64),

    /// Yearly series, aligned with the model's time axis
    Array(Vec<f64>),

    /// Label, file name or reference expression
    Text(String),
}

impl Value {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Parse a raw cell literal.
    ///
    /// Commas are thousands separators and are removed (unless the literal ends
    /// in `}`). A trailing `%` divides by 100, applied recursively, unless the
    /// literal is a `;` separated list. Anything that is not a number stays text.
    pub fn parse_literal(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Text(String::new());
        }

        let cleaned = if raw.ends_with('}') {
            raw.to_string()
        } else {
            raw.replace(',', "")
        };

        if let Some(stripped) = cleaned.strip_suffix('%') {
            if !stripped.contains(PATH_LIST_DELIMITER) && !stripped.is_empty() {
                return match Value::parse_literal(stripped) {
                    Value::Number(n) => Value::Number(n / 100.0),
                    _ => Value::Text(cleaned),
                };
            }
        }

        if let Ok(n) = cleaned.parse::<i64>() {
            return Value::Number(n as f64);
        }
        match cleaned.parse::<f64>() {
            Ok(n) if !is_special_float(&cleaned) => Value::Number(n),
            _ => Value::Text(cleaned),
        }
    }

    /// Check if the value is a number or an array
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Array(_))
    }

    /// Check if the value is text that may contain cell references
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Text(s) if s.contains(PATH_DELIMITER))
    }

    /// Check if the value is a plain label (text without references)
    pub fn is_label(&self) -> bool {
        matches!(self, Value::Text(s) if !s.contains(PATH_DELIMITER))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as an array
    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Try to get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Require a number, reporting `path` on failure
    pub fn expect_number(&self, path: &CellPath) -> Result<f64> {
        self.as_number().ok_or_else(|| Error::InvalidValueType {
            path: path.to_string(),
            expected: "number",
            actual: self.type_name(),
        })
    }

    /// Expand to a series of `len` years.
    ///
    /// Numbers are broadcast, arrays must already have length `len`.
    pub fn to_series(&self, len: usize, path: &CellPath) -> Result<Vec<f64>> {
        match self {
            Value::Number(n) => Ok(vec![*n; len]),
            Value::Array(values) if values.len() == len => Ok(values.clone()),
            Value::Array(values) => Err(Error::LengthMismatch {
                left: values.len(),
                right: len,
            }),
            Value::Text(_) => Err(Error::InvalidValueType {
                path: path.to_string(),
                expected: "number or array",
                actual: self.type_name(),
            }),
        }
    }

    /// Multiply two numeric values (scalar broadcast, arrays element-wise)
    pub fn mul(&self, other: &Value) -> Result<Value> {
        combine(self, other, |a, b| a * b)
    }

    /// Add two numeric values (scalar broadcast, arrays element-wise)
    pub fn add(&self, other: &Value) -> Result<Value> {
        combine(self, other, |a, b| a + b)
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Array(_) => "array",
            Value::Text(_) => "text",
        }
    }
}

/// `inf`/`nan` spellings parse as f64 but are labels in input files
fn is_special_float(s: &str) -> bool {
    let lower = s.trim_start_matches(['+', '-']).to_ascii_lowercase();
    matches!(lower.as_str(), "inf" | "infinity" | "nan")
}

fn combine(left: &Value, right: &Value, op: impl Fn(f64, f64) -> f64) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b))),
        (Value::Number(a), Value::Array(b)) => {
            Ok(Value::Array(b.iter().map(|x| op(*a, *x)).collect()))
        }
        (Value::Array(a), Value::Number(b)) => {
            Ok(Value::Array(a.iter().map(|x| op(*x, *b)).collect()))
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Err(Error::LengthMismatch {
                    left: a.len(),
                    right: b.len(),
                });
            }
            Ok(Value::Array(
                a.iter().zip(b.iter()).map(|(x, y)| op(*x, *y)).collect(),
            ))
        }
        (Value::Text(_), _) | (_, Value::Text(_)) => Err(Error::InvalidValueType {
            path: "arithmetic operand".to_string(),
            expected: "number or array",
            actual: "text",
        }),
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Array(values)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal_numbers() {
        assert_eq!(Value::parse_literal("42"), Value::Number(42.0));
        assert_eq!(Value::parse_literal("1,234"), Value::Number(1234.0));
        assert_eq!(Value::parse_literal("1,234.5"), Value::Number(1234.5));
        assert_eq!(Value::parse_literal("-0.25"), Value::Number(-0.25));
    }

    #[test]
    fn test_parse_literal_percent() {
        assert_eq!(Value::parse_literal("12%"), Value::Number(0.12));
        assert_eq!(Value::parse_literal("100%"), Value::Number(1.0));
        // "%%" divides twice
        assert_eq!(Value::parse_literal("50%%"), Value::Number(0.005));
    }

    #[test]
    fn test_parse_literal_text() {
        assert_eq!(Value::parse_literal("MACRS"), Value::text("MACRS"));
        assert_eq!(
            Value::parse_literal("A > B > C"),
            Value::text("A > B > C")
        );
        assert_eq!(Value::parse_literal("5%; 10%"), Value::text("5%; 10%"));
        assert_eq!(Value::parse_literal("inf"), Value::text("inf"));
        assert_eq!(Value::parse_literal("{1,2}"), Value::text("{1,2}"));
    }

    #[test]
    fn test_reference_detection() {
        assert!(Value::text("A > B > C").is_reference());
        assert!(!Value::text("None").is_reference());
        assert!(Value::text("None").is_label());
        assert!(!Value::Number(1.0).is_reference());
    }

    #[test]
    fn test_arithmetic() {
        let a = Value::Number(2.0);
        let b = Value::Array(vec![1.0, 2.0, 3.0]);
        assert_eq!(a.mul(&b).unwrap(), Value::Array(vec![2.0, 4.0, 6.0]));
        assert_eq!(b.add(&b).unwrap(), Value::Array(vec![2.0, 4.0, 6.0]));
        assert_eq!(a.add(&a).unwrap(), Value::Number(4.0));

        let short = Value::Array(vec![1.0]);
        assert!(matches!(
            b.mul(&short),
            Err(Error::LengthMismatch { left: 3, right: 1 })
        ));
        assert!(a.mul(&Value::text("x")).is_err());
    }

    #[test]
    fn test_to_series() {
        let path = CellPath::new("A", "B", "C");
        assert_eq!(
            Value::Number(1.5).to_series(3, &path).unwrap(),
            vec![1.5, 1.5, 1.5]
        );
        assert!(Value::Array(vec![1.0]).to_series(3, &path).is_err());
        assert!(Value::text("x").to_series(3, &path).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Array(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
    }
}
