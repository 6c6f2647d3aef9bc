//! Accumulated mapping-validation diagnostics. Validation never fails
//! mid-traversal; records pile up here and the caller decides, once the
//! whole pass is over, whether anything worse than a warning happened.

use crate::metadata::CellLabel;
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

#[cfg(test)]
mod test;

/// Dual rendering contract for every user-facing diagnostic.
pub trait UserError {
    fn code(&self) -> u32;
    fn user_message(&self) -> Option<String>;
    fn technical_message(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewGenErrorCode {
    #[error("no default value available for a required slot")]
    NoDefaultValue,
    #[error("two fragments map different constants onto the same member")]
    AmbiguousMultiConstantMapping,
    #[error("mapping fragments define overlapping partitions")]
    OverlappingFragments,
    #[error("extent has no mapping fragment")]
    MissingExtentMapping,
}

impl ViewGenErrorCode {
    pub fn number(&self) -> u32 {
        match self {
            ViewGenErrorCode::NoDefaultValue => 2042,
            ViewGenErrorCode::AmbiguousMultiConstantMapping => 2011,
            ViewGenErrorCode::OverlappingFragments => 2012,
            ViewGenErrorCode::MissingExtentMapping => 2062,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub code: ViewGenErrorCode,
    pub severity: Severity,
    pub debug_message: String,
    pub user_message: String,
    pub sources: Vec<CellLabel>,
}

impl Record {
    pub fn error<S: Into<String>>(
        code: ViewGenErrorCode,
        user_message: S,
        sources: Vec<CellLabel>,
    ) -> Self {
        let user_message = user_message.into();
        Record {
            debug_message: format!("{code:?}: {user_message}"),
            code,
            severity: Severity::Error,
            user_message,
            sources,
        }
    }

    pub fn warning<S: Into<String>>(
        code: ViewGenErrorCode,
        user_message: S,
        sources: Vec<CellLabel>,
    ) -> Self {
        let user_message = user_message.into();
        Record {
            debug_message: format!("{code:?}: {user_message}"),
            code,
            severity: Severity::Warning,
            user_message,
            sources,
        }
    }
}

impl UserError for Record {
    fn code(&self) -> u32 {
        self.code.number()
    }

    fn user_message(&self) -> Option<String> {
        if self.sources.is_empty() {
            Some(self.user_message.clone())
        } else {
            Some(format!(
                "{} [{}]",
                self.user_message,
                self.sources.iter().map(|s| s.to_string()).join("; ")
            ))
        }
    }

    fn technical_message(&self) -> String {
        self.debug_message.clone()
    }
}

/// Append-only, ordered, never pruned. Created per view-generation
/// attempt and merged across sub-computations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
    records: Vec<Record>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn merge(&mut self, other: ErrorLog) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether anything worse than a warning was recorded.
    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|r| r.severity == Severity::Error)
    }
}

impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "error {}: {}",
                record.code.number(),
                record.user_message().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}
