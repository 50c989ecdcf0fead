//! Turn user records into fixed-length feature vectors.
//!
//! Layout of a row of width `|vocab| + 2`:
//!
//! ```text
//! [ trait_0 .. trait_{n-1} | lat * geo_weight | lon * geo_weight ]
//! ```
//!
//! Values stay in raw weighted space; nothing is rescaled here.

use crate::features::vocabulary::TraitVocabulary;
use crate::types::{UserId, UserRecord};
use ndarray::{Array1, Array2, ArrayView1};

/// Number of trailing geo columns.
pub const GEO_DIMS: usize = 2;

/// Encode one record against the vocabulary.
pub fn vectorize(user: &UserRecord, vocab: &TraitVocabulary, geo_weight: f64) -> Array1<f64> {
    let mut row = vec![0.0; vocab.len() + GEO_DIMS];
    write_row(user, vocab, geo_weight, &mut row);
    Array1::from_vec(row)
}

fn write_row(user: &UserRecord, vocab: &TraitVocabulary, geo_weight: f64, row: &mut [f64]) {
    for (name, &weight) in &user.traits {
        if let Some(col) = vocab.index_of(name) {
            row[col] = weight;
        }
    }

    let n = vocab.len();
    row[n] = user.lat.unwrap_or(0.0) * geo_weight;
    row[n + 1] = user.lon.unwrap_or(0.0) * geo_weight;
}

/// Row-aligned feature matrix, one row per input record in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
    user_ids: Vec<UserId>,
}

impl FeatureMatrix {
    pub fn build(users: &[UserRecord], vocab: &TraitVocabulary, geo_weight: f64) -> Self {
        let width = vocab.len() + GEO_DIMS;
        let mut data = Array2::zeros((users.len(), width));
        for (user, mut row) in users.iter().zip(data.rows_mut()) {
            // Freshly allocated rows are contiguous.
            if let Some(slice) = row.as_slice_mut() {
                write_row(user, vocab, geo_weight, slice);
            }
        }
        Self {
            data,
            user_ids: users.iter().map(|u| u.id).collect(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }
}
