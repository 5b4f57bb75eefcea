//! Distribution summaries and correlations of the five gap figures.

use crate::{
    stats,
    tables::{GapField, StoreGap},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub field: GapField,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    pub fields: Vec<GapField>,
    /// Row-major, `values[i][j]` = corr(fields[i], fields[j]).
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: GapField, b: GapField) -> Option<f64> {
        let i = self.fields.iter().position(|f| *f == a)?;
        let j = self.fields.iter().position(|f| *f == b)?;
        self.values[i][j]
    }
}

fn column(gaps: &[StoreGap], field: GapField) -> Vec<f64> {
    gaps.iter().map(|g| g.value(field)).collect()
}

pub fn field_summaries(gaps: &[StoreGap]) -> Vec<FieldSummary> {
    GapField::ALL
        .iter()
        .map(|&field| {
            let v = column(gaps, field);
            FieldSummary {
                field,
                count: v.len(),
                mean: stats::round2(stats::mean(&v)),
                std: stats::sample_std(&v).map(stats::round2),
                min: stats::quantile(&v, 0.0),
                p25: stats::quantile(&v, 0.25),
                median: stats::median(&v),
                p75: stats::quantile(&v, 0.75),
                max: stats::quantile(&v, 1.0),
            }
        })
        .collect()
}

pub fn correlations(gaps: &[StoreGap]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = GapField::ALL.iter().map(|&f| column(gaps, f)).collect();
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| stats::pearson(a, b)).collect())
        .collect();
    CorrelationMatrix {
        fields: GapField::ALL.to_vec(),
        values,
    }
}
