//! Chart and tile descriptors, independent of any charting library.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{aggregate, AggOp, GroupBy, Measure};
use crate::crossfilter::{DerivedView, DerivedViews};
use crate::filter::FilterState;
use crate::model::Dimension;

/// Scalar summaries of the fully filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub count: usize,
    pub total_sales: f64,
    /// `None` when the view is empty.
    pub average_sales: Option<f64>,
    /// Most frequent known category; ties go to the smallest label.
    pub top_category: Option<String>,
}

impl Kpis {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(view: &DerivedView<'_>) -> Self {
        let count = view.len();
        let total_sales: f64 = view.rows().map(|r| r.sales_amount).sum();
        let average_sales = (count > 0).then(|| total_sales / count as f64);

        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for category in view.rows().filter_map(|r| r.category.as_deref()) {
            *frequency.entry(category).or_default() += 1;
        }
        let top_category = frequency
            .into_iter()
            .max_by(|(a, na), (b, nb)| na.cmp(nb).then_with(|| b.cmp(a)))
            .map(|(c, _)| c.to_string());

        Self {
            count,
            total_sales,
            average_sales,
            top_category,
        }
    }

    #[must_use]
    pub fn tiles(&self) -> Vec<Tile> {
        let average = self.average_sales.unwrap_or(0.0);
        let top = self.top_category.clone().unwrap_or_default();
        vec![
            Tile {
                label: "Total Sales",
                value: TileValue::Count(self.count),
                display: group_thousands(&self.count.to_string()),
            },
            Tile {
                label: "Total Sales Amount",
                value: TileValue::Amount(self.total_sales),
                display: format_currency(self.total_sales),
            },
            Tile {
                label: "Average Sales Amount",
                value: TileValue::Amount(average),
                display: format_currency(average),
            },
            Tile {
                label: "Top Category",
                display: top.clone(),
                value: TileValue::Text(top),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TileValue {
    Count(usize),
    Amount(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub label: &'static str,
    pub value: TileValue,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    GroupedBar,
    HorizontalBar,
    Pie,
    /// A pie with a hole; `hole` is the inner radius as a fraction.
    Donut { hole: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<Point>,
}

impl Series {
    fn new(measure: Measure, pairs: Vec<(String, f64)>) -> Self {
        Self {
            name: measure.name(),
            points: pairs
                .into_iter()
                .map(|(label, value)| Point { label, value })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub palette: &'static [&'static str],
    pub series: Vec<Series>,
}

impl Chart {
    /// True when no series has a point, i.e. the chart renders empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// A multi-select input: every option plus what the user picked.
///
/// Values use the JSON form that selection events decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector {
    pub dimension: Dimension,
    pub options: Vec<serde_json::Value>,
    pub selected: Vec<serde_json::Value>,
}

impl Selector {
    fn new(state: &FilterState, dimension: Dimension) -> Self {
        let selected = state.selected(dimension);
        Self {
            dimension,
            options: state
                .options(dimension)
                .iter()
                .map(crate::model::DimensionValue::to_json)
                .collect(),
            // option order, not hash order
            selected: state
                .options(dimension)
                .iter()
                .filter(|v| selected.contains(*v))
                .map(crate::model::DimensionValue::to_json)
                .collect(),
        }
    }
}

/// One complete render payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub selectors: Vec<Selector>,
    pub kpis: Kpis,
    pub tiles: Vec<Tile>,
    pub charts: Vec<Chart>,
}

fn summed(view: &DerivedView<'_>, group_by: GroupBy, measures: &[Measure]) -> Vec<Series> {
    let result = aggregate(view, group_by, measures, AggOp::Sum);
    measures
        .iter()
        .map(|&m| Series::new(m, result.series(m).unwrap_or_default()))
        .collect()
}

#[must_use]
pub fn country_chart(view: &DerivedView<'_>) -> Chart {
    Chart {
        id: "sales_vs_cost_by_country",
        title: "TOTAL SALES AMOUNT vs TOTAL COST BY COUNTRY",
        kind: ChartKind::GroupedBar,
        palette: &["#FFD184", "#E2AA00"],
        series: summed(
            view,
            GroupBy::Dimension(Dimension::Country),
            &[Measure::SalesAmount, Measure::TotalProductCost],
        ),
    }
}

/// Order quantity per month, listed December first as the horizontal bars
/// are drawn bottom-up.
#[must_use]
pub fn month_chart(view: &DerivedView<'_>) -> Chart {
    let mut series = summed(view, GroupBy::Month, &[Measure::OrderQuantity]);
    for s in &mut series {
        s.points.reverse();
    }
    Chart {
        id: "quantity_by_month",
        title: "TOTAL OF SALES BY MONTH",
        kind: ChartKind::HorizontalBar,
        palette: &["#4472C4"],
        series,
    }
}

#[must_use]
pub fn category_chart(view: &DerivedView<'_>) -> Chart {
    Chart {
        id: "quantity_by_category",
        title: "SALES BY CATEGORY",
        kind: ChartKind::Pie,
        palette: &["#4472C4", "#5B9BD5", "#A5A5A5"],
        series: summed(
            view,
            GroupBy::Dimension(Dimension::Category),
            &[Measure::OrderQuantity],
        ),
    }
}

#[must_use]
pub fn gender_chart(view: &DerivedView<'_>) -> Chart {
    Chart {
        id: "quantity_by_gender",
        title: "SALES BY GENDER",
        kind: ChartKind::Donut { hole: 0.45 },
        palette: &["#FFD184", "#E2AA00"],
        series: summed(
            view,
            GroupBy::Dimension(Dimension::Gender),
            &[Measure::OrderQuantity],
        ),
    }
}

#[must_use]
pub fn frame(views: &DerivedViews<'_>, state: &FilterState) -> Frame {
    let kpis = Kpis::compute(&views.main);
    Frame {
        selectors: Dimension::ALL
            .into_iter()
            .map(|d| Selector::new(state, d))
            .collect(),
        tiles: kpis.tiles(),
        kpis,
        charts: vec![
            country_chart(&views.by_country),
            month_chart(&views.main),
            category_chart(&views.by_category),
            gender_chart(&views.by_gender),
        ],
    }
}

/// Insert `,` between digit triads: `"1234567"` → `"1,234,567"`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `US $ 1,234.50`, with a leading `-` for negative amounts.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("US $ {sign}{}.{cents}", group_thousands(whole))
}
