use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::crossfilter::DerivedView;
use crate::model::{Dimension, DimensionValue, FactRow, Month};

/// A numeric column of the fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    SalesAmount,
    OrderQuantity,
    TotalProductCost,
}

impl Measure {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Measure::SalesAmount => "SalesAmount",
            Measure::OrderQuantity => "OrderQuantity",
            Measure::TotalProductCost => "TotalProductCost",
        }
    }

    #[must_use]
    pub fn of(self, row: &FactRow) -> f64 {
        match self {
            Measure::SalesAmount => row.sales_amount,
            Measure::OrderQuantity => f64::from(row.order_quantity),
            Measure::TotalProductCost => row.total_product_cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggOp {
    Sum,
    Mean,
    Count,
}

/// What rows are grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Dimension(Dimension),
    /// Calendar month; groups come out January→December.
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Value(DimensionValue),
    Month(Month),
}

impl GroupKey {
    fn of(group_by: GroupBy, row: &FactRow) -> GroupKey {
        match group_by {
            GroupBy::Dimension(d) => GroupKey::Value(row.value(d)),
            GroupBy::Month => GroupKey::Month(row.month),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            GroupKey::Value(v) => v.label(),
            GroupKey::Month(m) => m.name().to_string(),
        }
    }
}

/// One group of an [`AggregationResult`]; `values` is parallel to the
/// result's measures.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: GroupKey,
    pub rows: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    measures: Vec<Measure>,
    op: AggOp,
    groups: Vec<Group>,
}

impl AggregationResult {
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn op(&self) -> AggOp {
        self.op
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Ordered `(label, value)` pairs for `measure`, or `None` if it was not
    /// aggregated.
    #[must_use]
    pub fn series(&self, measure: Measure) -> Option<Vec<(String, f64)>> {
        let slot = self.measures.iter().position(|&m| m == measure)?;
        Some(
            self.groups
                .iter()
                .map(|g| (g.key.label(), g.values[slot]))
                .collect(),
        )
    }

    /// Sum of `measure` across every group (0 when absent or empty).
    #[must_use]
    pub fn total(&self, measure: Measure) -> f64 {
        self.series(measure)
            .map(|s| s.iter().map(|(_, v)| v).sum())
            .unwrap_or(0.0)
    }
}

/// Group the rows of `view` and reduce each measure with `op`.
///
/// Groups keep first-seen order, except month groupings which are sorted
/// chronologically. An empty view yields an empty result.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(
    view: &DerivedView<'_>,
    group_by: GroupBy,
    measures: &[Measure],
    op: AggOp,
) -> AggregationResult {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in view.rows() {
        let key = GroupKey::of(group_by, row);
        let slot = *slots.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                rows: 0,
                values: vec![0.0; measures.len()],
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.rows += 1;
        for (acc, measure) in group.values.iter_mut().zip(measures) {
            *acc += measure.of(row);
        }
    }

    for group in &mut groups {
        match op {
            AggOp::Sum => {}
            AggOp::Mean => {
                let n = group.rows as f64;
                for v in &mut group.values {
                    *v /= n;
                }
            }
            AggOp::Count => {
                let n = group.rows as f64;
                group.values.iter_mut().for_each(|v| *v = n);
            }
        }
    }

    if group_by == GroupBy::Month {
        groups.sort_by_key(|g| match g.key {
            GroupKey::Month(m) => m,
            GroupKey::Value(_) => Month::January,
        });
    }

    AggregationResult {
        measures: measures.to_vec(),
        op,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossfilter::filter_view;
    use crate::filter::FilterState;
    use crate::model::tests::row;
    use crate::model::{Dataset, Gender};

    fn dataset() -> Dataset {
        let mut rows = vec![
            row(2012, "US", Gender::Male, "Bikes"),
            row(2012, "CA", Gender::Female, "Bikes"),
            row(2013, "US", Gender::Male, "Accessories"),
            row(2013, "DE", Gender::Female, "Clothing"),
        ];
        rows[0].month = Month::November;
        rows[1].month = Month::April;
        rows[2].month = Month::November;
        rows[3].month = Month::January;
        for (i, r) in rows.iter_mut().enumerate() {
            let scale = f64::from(u32::try_from(i).unwrap() + 1);
            r.sales_amount = 10.0 * scale;
            r.total_product_cost = 4.0 * scale;
            r.order_quantity = u32::try_from(i).unwrap() + 1;
        }
        Dataset::new(rows)
    }

    #[test]
    fn sums_by_country_in_first_seen_order() {
        let ds = dataset();
        let state = FilterState::new(&ds);
        let view = filter_view(&ds, &state, None);
        let result = aggregate(
            &view,
            GroupBy::Dimension(Dimension::Country),
            &[Measure::SalesAmount, Measure::TotalProductCost],
            AggOp::Sum,
        );
        assert_eq!(
            result.series(Measure::SalesAmount).unwrap(),
            vec![
                ("US".to_string(), 40.0),
                ("CA".to_string(), 20.0),
                ("DE".to_string(), 40.0)
            ]
        );
        assert_eq!(
            result.series(Measure::TotalProductCost).unwrap(),
            vec![
                ("US".to_string(), 16.0),
                ("CA".to_string(), 8.0),
                ("DE".to_string(), 16.0)
            ]
        );
        assert!(result.series(Measure::OrderQuantity).is_none());
    }

    #[test]
    fn month_groups_are_chronological() {
        let ds = dataset();
        let state = FilterState::new(&ds);
        let view = filter_view(&ds, &state, None);
        let result = aggregate(&view, GroupBy::Month, &[Measure::OrderQuantity], AggOp::Sum);
        let labels: Vec<String> = result.groups().iter().map(|g| g.key.label()).collect();
        assert_eq!(labels, vec!["January", "April", "November"]);
        assert_eq!(
            result.series(Measure::OrderQuantity).unwrap(),
            vec![
                ("January".to_string(), 4.0),
                ("April".to_string(), 2.0),
                ("November".to_string(), 4.0)
            ]
        );
    }

    #[test]
    fn mean_and_count() {
        let ds = dataset();
        let state = FilterState::new(&ds);
        let view = filter_view(&ds, &state, None);
        let mean = aggregate(
            &view,
            GroupBy::Dimension(Dimension::Gender),
            &[Measure::SalesAmount],
            AggOp::Mean,
        );
        assert_eq!(
            mean.series(Measure::SalesAmount).unwrap(),
            vec![("Male".to_string(), 20.0), ("Female".to_string(), 30.0)]
        );
        let count = aggregate(
            &view,
            GroupBy::Dimension(Dimension::Category),
            &[Measure::SalesAmount],
            AggOp::Count,
        );
        assert_eq!(count.op(), AggOp::Count);
        assert_eq!(
            count.series(Measure::SalesAmount).unwrap(),
            vec![
                ("Bikes".to_string(), 2.0),
                ("Accessories".to_string(), 1.0),
                ("Clothing".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn empty_view_gives_empty_result() {
        let ds = dataset();
        let mut state = FilterState::new(&ds);
        state
            .select(Dimension::Country, [DimensionValue::Text("DE".to_string())])
            .unwrap();
        state
            .select(Dimension::Gender, [DimensionValue::Gender(Gender::Male)])
            .unwrap();
        let view = filter_view(&ds, &state, None);
        let result = aggregate(&view, GroupBy::Month, &[Measure::SalesAmount], AggOp::Mean);
        assert!(result.is_empty());
        assert_eq!(result.series(Measure::SalesAmount), Some(Vec::new()));
        assert!(result.total(Measure::SalesAmount).abs() < f64::EPSILON);
    }

    #[test]
    fn totals_match_view_sum() {
        let ds = dataset();
        let state = FilterState::new(&ds);
        let view = filter_view(&ds, &state, Some(Dimension::Country));
        let result = aggregate(
            &view,
            GroupBy::Dimension(Dimension::Year),
            &[Measure::SalesAmount],
            AggOp::Sum,
        );
        let direct: f64 = view.rows().map(|r| r.sales_amount).sum();
        assert!((result.total(Measure::SalesAmount) - direct).abs() < 1e-9);
    }
}
