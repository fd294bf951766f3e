//! In-memory table as loaded, before selection.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered table of raw observations. No uniqueness guarantee.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect()
    }

    /// Null count for every column, in column order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect()
    }

    /// Shape, column names, and the `top_n` columns with the most nulls.
    pub fn overview(&self, top_n: usize) -> DatasetOverview {
        let mut missing = self.null_counts();
        // stable: ties keep column order
        missing.sort_by(|a, b| b.1.cmp(&a.1));
        missing.truncate(top_n);

        DatasetOverview {
            rows: self.height(),
            columns: self.width(),
            column_names: self.column_names(),
            top_missing: missing,
        }
    }
}

/// Exploration summary printed after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub top_missing: Vec<(String, usize)>,
}
