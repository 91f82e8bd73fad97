//! Named column types and their value formatters

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Column types column definitions can refer to by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Short day/month/year date with time
    DateFormatter,
    /// Falls back to "N/A" for empty values
    MaybeEmptyFormatter,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::DateFormatter => "dateFormatter",
            ColumnType::MaybeEmptyFormatter => "maybeEmptyFormatter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dateFormatter" => Some(ColumnType::DateFormatter),
            "maybeEmptyFormatter" => Some(ColumnType::MaybeEmptyFormatter),
            _ => None,
        }
    }

    /// Format a cell value for display
    pub fn format(&self, value: &Value) -> String {
        match self {
            ColumnType::DateFormatter => {
                if is_empty(value) {
                    return String::new();
                }
                parse_datetime(value)
                    .map(|dt| dt.format("%d/%m/%Y, %H:%M").to_string())
                    .unwrap_or_default()
            }
            ColumnType::MaybeEmptyFormatter => {
                if is_empty(value) {
                    return "N/A".to_string();
                }
                match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            }
        }
    }
}

/// The column types registered on every grid
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTypes {
    types: Vec<ColumnType>,
}

impl Default for ColumnTypes {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColumnTypes {
    pub fn standard() -> Self {
        Self {
            types: vec![ColumnType::DateFormatter, ColumnType::MaybeEmptyFormatter],
        }
    }

    pub fn get(&self, name: &str) -> Option<ColumnType> {
        ColumnType::from_name(name).filter(|t| self.types.contains(t))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.iter().map(|t| t.name())
    }

    /// Column type a column definition asks for, if any.
    ///
    /// `type` may be a single name or a list; the first registered name wins.
    pub fn for_column(&self, column_def: &Value) -> Option<ColumnType> {
        match column_def.get("type")? {
            Value::String(name) => self.get(name),
            Value::Array(names) => names
                .iter()
                .filter_map(|n| n.as_str())
                .find_map(|n| self.get(n)),
            _ => None,
        }
    }

    /// Display text of a cell in the given column
    pub fn format_cell(&self, column_def: &Value, value: &Value) -> String {
        match self.for_column(column_def) {
            Some(column_type) => column_type.format(value),
            None => match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        // Milliseconds since the epoch, shown in UTC
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_local());
            }
            for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_formatting() {
        let t = ColumnType::DateFormatter;
        assert_eq!(t.format(&json!("2024-03-05T14:07:00Z")), "05/03/2024, 14:07");
        assert_eq!(t.format(&json!("2024-03-05T14:07:09.123")), "05/03/2024, 14:07");
        assert_eq!(t.format(&json!("2024-12-31")), "31/12/2024, 00:00");
        assert_eq!(t.format(&json!(0)), "");
        assert_eq!(t.format(&json!(1_700_000_000_000_i64)), "14/11/2023, 22:13");
    }

    #[test]
    fn test_date_ignores_host_time_zone() {
        let t = ColumnType::DateFormatter;
        // Offsets are kept as sent rather than shifted to the machine's zone
        assert_eq!(t.format(&json!("2024-03-05T14:07:00+02:00")), "05/03/2024, 14:07");
        assert_eq!(t.format(&json!(1_709_647_620_000_i64)), "05/03/2024, 14:07");
    }

    #[test]
    fn test_date_empty_and_invalid() {
        let t = ColumnType::DateFormatter;
        assert_eq!(t.format(&json!(null)), "");
        assert_eq!(t.format(&json!("")), "");
        assert_eq!(t.format(&json!("not a date")), "");
    }

    #[test]
    fn test_maybe_empty() {
        let t = ColumnType::MaybeEmptyFormatter;
        assert_eq!(t.format(&json!(null)), "N/A");
        assert_eq!(t.format(&json!("")), "N/A");
        assert_eq!(t.format(&json!(0)), "N/A");
        assert_eq!(t.format(&json!("Acme")), "Acme");
        assert_eq!(t.format(&json!(42)), "42");
    }

    #[test]
    fn test_column_lookup() {
        let types = ColumnTypes::standard();
        assert_eq!(
            types.for_column(&json!({"field": "inserted_at", "type": "dateFormatter"})),
            Some(ColumnType::DateFormatter)
        );
        assert_eq!(
            types.for_column(&json!({"type": ["numericColumn", "maybeEmptyFormatter"]})),
            Some(ColumnType::MaybeEmptyFormatter)
        );
        assert_eq!(types.for_column(&json!({"field": "name"})), None);
        assert_eq!(types.format_cell(&json!({"field": "name"}), &json!("Bo")), "Bo");
        assert_eq!(
            types.names().collect::<Vec<_>>(),
            vec!["dateFormatter", "maybeEmptyFormatter"]
        );
    }
}
