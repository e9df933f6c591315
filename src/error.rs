use std::fmt;

use crate::model::Dimension;

/// Failures while connecting to or reading from the warehouse.
///
/// All of these are fatal: the dashboard has no degraded mode without data.
#[derive(Debug)]
pub enum DataSourceError {
    /// The store could not be opened.
    Connect {
        path: String,
        source: duckdb::Error,
    },
    /// The fact query failed to prepare or execute.
    Query { source: duckdb::Error },
    /// A returned row could not be decoded into a fact row.
    InvalidRow { row: usize, reason: String },
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { path, source } => {
                write!(f, "cannot open sales warehouse '{path}': {source}")
            }
            Self::Query { source } => write!(f, "sales query failed: {source}"),
            Self::InvalidRow { row, reason } => {
                write!(f, "sales query returned an invalid row {row}: {reason}")
            }
        }
    }
}

impl std::error::Error for DataSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect { source, .. } | Self::Query { source } => Some(source),
            Self::InvalidRow { .. } => None,
        }
    }
}

impl From<duckdb::Error> for DataSourceError {
    fn from(source: duckdb::Error) -> Self {
        Self::Query { source }
    }
}

/// A selection-changed event that could not be applied.
///
/// Recoverable: the filter state is left exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// The event payload was malformed.
    InvalidEvent { reason: String },
    /// A selected value is not among the dimension's options.
    UnknownValue {
        dimension: Dimension,
        value: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEvent { reason } => write!(f, "invalid selection event: {reason}"),
            Self::UnknownValue {
                dimension,
                value,
                available,
                suggestion,
            } => {
                write!(
                    f,
                    "unknown {dimension} '{value}'. Available: [{}]",
                    available.join(", ")
                )?;
                if let Some(s) = suggestion {
                    write!(f, ". Did you mean '{s}'?")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Startup configuration could not be read.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: String,
        source: std::io::Error,
    },
    Parse {
        path: String,
        source: yaml_serde::Error,
    },
    /// Neither the config file nor the environment named a warehouse file.
    NoWarehouse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read config '{path}': {source}"),
            Self::Parse { path, source } => write!(f, "invalid config '{path}': {source}"),
            Self::NoWarehouse => write!(
                f,
                "no warehouse configured (set {} or store.path in {})",
                crate::config::DB_ENV,
                crate::config::CONFIG_ENV
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::NoWarehouse => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_value_message_includes_suggestion() {
        let err = SelectionError::UnknownValue {
            dimension: Dimension::Country,
            value: "Germny".to_string(),
            available: vec!["Germany".to_string(), "France".to_string()],
            suggestion: Some("Germany".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("unknown country 'Germny'"), "unexpected: {msg}");
        assert!(msg.contains("[Germany, France]"), "unexpected: {msg}");
        assert!(msg.ends_with("Did you mean 'Germany'?"), "unexpected: {msg}");
    }

    #[test]
    fn unknown_value_message_without_suggestion() {
        let err = SelectionError::UnknownValue {
            dimension: Dimension::Year,
            value: "1999".to_string(),
            available: vec!["2012".to_string()],
            suggestion: None,
        };
        assert!(!err.to_string().contains("Did you mean"));
    }

    #[test]
    fn invalid_row_is_not_chained() {
        let err = DataSourceError::InvalidRow {
            row: 3,
            reason: "unknown month 'Smarch'".to_string(),
        };
        assert!(std::error::Error::source(&err).is_none());
        assert!(err.to_string().contains("row 3"));
    }
}
