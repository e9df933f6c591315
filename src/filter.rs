use std::collections::HashSet;

use tracing::debug;

use crate::error::SelectionError;
use crate::model::{Dataset, Dimension, DimensionValue};

/// Suggest the closest matching label from `available` using Levenshtein distance.
///
/// Returns `Some(label)` (with original casing) if the best match has an edit
/// distance of 3 or fewer characters. Both sides are lowercased for comparison.
pub(crate) fn suggest_closest(label: &str, available: &[String]) -> Option<String> {
    let query = label.to_ascii_lowercase();
    let mut best: Option<(usize, &str)> = None;
    for candidate in available {
        let dist = strsim::levenshtein(&query, &candidate.to_ascii_lowercase());
        if dist <= 3 && best.map_or(true, |(best_dist, _)| dist < best_dist) {
            best = Some((dist, candidate));
        }
    }
    best.map(|(_, s)| s.to_string())
}

/// Options and user selection for a single dimension.
#[derive(Debug, Clone, Default)]
struct Axis {
    /// Distinct values in first-seen order, as offered by the selector.
    options: Vec<DimensionValue>,
    all: HashSet<DimensionValue>,
    selected: HashSet<DimensionValue>,
}

/// The current selection along the four filter dimensions.
///
/// An empty selection means "no restriction", never "select nothing";
/// [`FilterState::effective_selection`] is the only place that rule lives.
#[derive(Debug, Clone)]
pub struct FilterState {
    axes: [Axis; 4],
}

impl FilterState {
    /// Build the selector options from `dataset`, with nothing selected.
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        let axes = Dimension::ALL.map(|d| {
            let options = dataset.distinct(d);
            Axis {
                all: options.iter().cloned().collect(),
                options,
                selected: HashSet::new(),
            }
        });
        Self { axes }
    }

    fn axis(&self, dimension: Dimension) -> &Axis {
        &self.axes[dimension.index()]
    }

    /// Every distinct value of `dimension`, in first-seen order.
    #[must_use]
    pub fn options(&self, dimension: Dimension) -> &[DimensionValue] {
        &self.axis(dimension).options
    }

    /// The raw user selection; empty when the user has not narrowed `dimension`.
    #[must_use]
    pub fn selected(&self, dimension: Dimension) -> &HashSet<DimensionValue> {
        &self.axis(dimension).selected
    }

    /// The set a row's value must belong to: the user selection when it is
    /// non-empty, otherwise every known value of `dimension`.
    #[must_use]
    pub fn effective_selection(&self, dimension: Dimension) -> &HashSet<DimensionValue> {
        let axis = self.axis(dimension);
        if axis.selected.is_empty() {
            &axis.all
        } else {
            &axis.selected
        }
    }

    /// Replace the selection on `dimension`.
    ///
    /// Every value must be one of the dimension's options; on error nothing
    /// changes. An empty `values` clears the selection.
    pub fn select(
        &mut self,
        dimension: Dimension,
        values: impl IntoIterator<Item = DimensionValue>,
    ) -> Result<(), SelectionError> {
        let axis = self.axis(dimension);
        let mut selected = HashSet::new();
        for value in values {
            if !axis.all.contains(&value) {
                let available: Vec<String> = axis.options.iter().map(DimensionValue::label).collect();
                let label = value.label();
                let suggestion = suggest_closest(&label, &available);
                return Err(SelectionError::UnknownValue {
                    dimension,
                    value: label,
                    available,
                    suggestion,
                });
            }
            selected.insert(value);
        }
        debug!(%dimension, selected = selected.len(), "selection changed");
        self.axes[dimension.index()].selected = selected;
        Ok(())
    }

    pub fn clear(&mut self, dimension: Dimension) {
        self.axes[dimension.index()].selected.clear();
    }

    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.selected.clear();
        }
    }

    /// Whether `row_value` passes the predicate on `dimension`.
    #[must_use]
    pub fn admits(&self, dimension: Dimension, row_value: &DimensionValue) -> bool {
        self.effective_selection(dimension).contains(row_value)
    }
}
