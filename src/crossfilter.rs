//! Cross-filtering: a selection on one dimension narrows every chart except
//! the chart that groups by that same dimension.

use crate::filter::FilterState;
use crate::model::{Dataset, Dimension, FactRow};

/// Rows of a [`Dataset`] that pass a set of dimension predicates.
///
/// Holds indices into the dataset rather than copies, in dataset order.
#[derive(Debug, Clone)]
pub struct DerivedView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
    excluded: Option<Dimension>,
}

impl<'a> DerivedView<'a> {
    /// The dimension whose predicate was dropped, if any.
    #[must_use]
    pub fn excluded(&self) -> Option<Dimension> {
        self.excluded
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions of the admitted rows inside the source dataset.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a FactRow> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&i| &rows[i])
    }
}

/// Apply every dimension predicate of `state` except the one on `exclude`.
///
/// `exclude = None` applies all four predicates.
#[must_use]
pub fn filter_view<'a>(
    dataset: &'a Dataset,
    state: &FilterState,
    exclude: Option<Dimension>,
) -> DerivedView<'a> {
    let active: Vec<Dimension> = Dimension::ALL
        .into_iter()
        .filter(|&d| Some(d) != exclude)
        .collect();
    let indices = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| active.iter().all(|&d| state.admits(d, &row.value(d))))
        .map(|(i, _)| i)
        .collect();
    DerivedView {
        dataset,
        indices,
        excluded: exclude,
    }
}

/// Every view one recomputation pass needs.
///
/// Year is not charted, so there is no year-excluded view here.
#[derive(Debug, Clone)]
pub struct DerivedViews<'a> {
    /// All four predicates: KPIs and the month chart.
    pub main: DerivedView<'a>,
    pub by_country: DerivedView<'a>,
    pub by_gender: DerivedView<'a>,
    pub by_category: DerivedView<'a>,
}

impl<'a> DerivedViews<'a> {
    /// The view a chart grouped by `dimension` should aggregate over.
    #[must_use]
    pub fn view_for(&self, dimension: Dimension) -> Option<&DerivedView<'a>> {
        match dimension {
            Dimension::Year => None,
            Dimension::Country => Some(&self.by_country),
            Dimension::Gender => Some(&self.by_gender),
            Dimension::Category => Some(&self.by_category),
        }
    }
}

#[must_use]
pub fn derive<'a>(dataset: &'a Dataset, state: &FilterState) -> DerivedViews<'a> {
    DerivedViews {
        main: filter_view(dataset, state, None),
        by_country: filter_view(dataset, state, Some(Dimension::Country)),
        by_gender: filter_view(dataset, state, Some(Dimension::Gender)),
        by_category: filter_view(dataset, state, Some(Dimension::Category)),
    }
}
