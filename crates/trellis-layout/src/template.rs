//! Declarative grid descriptions.

use crate::definition::TrackDefinition;
use crate::error::GridError;
use crate::length::GridLength;
use crate::options::GridOptions;
use serde::{Deserialize, Serialize};

/// Column and row definitions plus options, loadable from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTemplate {
    /// Column definitions
    pub columns: Vec<TrackDefinition>,
    /// Row definitions
    pub rows: Vec<TrackDefinition>,
    /// Layout options
    pub options: GridOptions,
}

impl GridTemplate {
    /// Create a new empty grid template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a template with the given columns and one implicit row.
    #[must_use]
    pub fn columns(columns: impl IntoIterator<Item = impl Into<TrackDefinition>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create a template from comma-separated lengths, e.g. `"Auto, *, 2*"`.
    pub fn parse(columns: &str, rows: &str) -> Result<Self, GridError> {
        Ok(Self {
            columns: parse_lengths(columns)?,
            rows: parse_lengths(rows)?,
            ..Self::default()
        })
    }

    /// Set row definitions.
    #[must_use]
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = impl Into<TrackDefinition>>) -> Self {
        self.rows = rows.into_iter().map(Into::into).collect();
        self
    }

    /// Set the options.
    #[must_use]
    pub const fn with_options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the number of columns laid out.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len().max(1)
    }

    /// Get the number of rows laid out.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len().max(1)
    }

    /// Check every definition.
    pub fn validate(&self) -> Result<(), GridError> {
        self.columns
            .iter()
            .chain(&self.rows)
            .try_for_each(TrackDefinition::validate)
    }
}

fn parse_lengths(list: &str) -> Result<Vec<TrackDefinition>, GridError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<GridLength>().map(TrackDefinition::new))
        .collect()
}
