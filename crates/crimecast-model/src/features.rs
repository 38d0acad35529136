//! One-hot feature assembly.
//!
//! The vector has one slot per trained column. Month and neighborhood are
//! one-hot flags found by column name; the last three slots always hold
//! longitude, latitude and hour, in that order.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use crimecast_core::Submission;
use tracing::debug;

use crate::{ColumnList, ModelError};

/// Number of trailing numeric slots (longitude, latitude, hour).
pub const NUMERIC_SLOTS: usize = 3;

/// Places form values into the trained column layout.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    columns: ColumnList,
    schema: SchemaRef,
}

impl FeatureEncoder {
    pub fn new(columns: ColumnList) -> Result<Self, ModelError> {
        if columns.len() < NUMERIC_SLOTS {
            return Err(ModelError::Artifact(format!(
                "column list has {} entries, need at least {NUMERIC_SLOTS} for the numeric fields",
                columns.len()
            )));
        }
        let fields: Vec<Field> = columns
            .names()
            .iter()
            .map(|name| Field::new(name, DataType::Float64, false))
            .collect();
        Ok(Self {
            columns,
            schema: Arc::new(Schema::new(fields)),
        })
    }

    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    /// Vector length; equals the column-list length.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Build the feature vector for one submission.
    ///
    /// A category with no matching column leaves every flag for that field
    /// at zero, which is how a dropped reference level is represented.
    pub fn encode(&self, submission: &Submission) -> Vec<f64> {
        let mut features = vec![0.0f64; self.width()];

        for category in [submission.month.as_str(), submission.neighborhood.as_str()] {
            match self.columns.position(category) {
                Some(idx) => features[idx] = 1.0,
                None => debug!(category, "no one-hot column for category"),
            }
        }

        let n = features.len();
        features[n - 3] = submission.longitude;
        features[n - 2] = submission.latitude;
        features[n - 1] = f64::from(submission.hour.get());
        features
    }

    /// Wrap feature rows as a RecordBatch named by the column list.
    pub fn to_record_batch(&self, rows: &[Vec<f64>]) -> Result<RecordBatch, ModelError> {
        if let Some(bad) = rows.iter().find(|r| r.len() != self.width()) {
            return Err(ModelError::Artifact(format!(
                "feature row has {} values, expected {}",
                bad.len(),
                self.width()
            )));
        }

        let arrays: Vec<ArrayRef> = (0..self.width())
            .map(|col| {
                let values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
                Arc::new(Float64Array::from(values)) as ArrayRef
            })
            .collect();

        Ok(RecordBatch::try_new(Arc::clone(&self.schema), arrays)?)
    }
}
