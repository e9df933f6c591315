use std::fmt;

use serde::{Deserialize, Serialize};

/// Calendar month, ordered chronologically (`January < … < December`).
///
/// Ordering comes from declaration order, never from the month name, so
/// grouping by month never falls back to lexical order ("April" < "January").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Parse an English month name or its three-letter abbreviation,
    /// ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Month> {
        let raw = raw.trim();
        Month::ALL.into_iter().find(|m| {
            m.name().eq_ignore_ascii_case(raw)
                || (raw.len() == 3 && m.name()[..3].eq_ignore_ascii_case(raw))
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Customer gender as stored on `DimCustomer` (`M` / `F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Gender {
    Male,
    Female,
    /// No customer matched, or the stored code was not recognised.
    Unknown,
}

impl Gender {
    /// Lenient decoding: anything that is not a known code is `Unknown`.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Gender {
        Self::parse(code.unwrap_or_default()).unwrap_or(Gender::Unknown)
    }

    /// Strict decoding of `M`, `Male`, `F`, `Female`, `Unknown` (any case).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Gender> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("m") || raw.eq_ignore_ascii_case("male") {
            Some(Gender::Male)
        } else if raw.eq_ignore_ascii_case("f") || raw.eq_ignore_ascii_case("female") {
            Some(Gender::Female)
        } else if raw.eq_ignore_ascii_case("unknown") {
            Some(Gender::Unknown)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

/// The four axes a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Dimension {
    Year,
    Country,
    Gender,
    Category,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Year,
        Dimension::Country,
        Dimension::Gender,
        Dimension::Category,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Country => "country",
            Dimension::Gender => "gender",
            Dimension::Category => "category",
        }
    }

    /// Position inside [`Dimension::ALL`]; used to index per-dimension arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Dimension::Year => 0,
            Dimension::Country => 1,
            Dimension::Gender => 2,
            Dimension::Category => 3,
        }
    }

    /// Decode a selector value sent by the UI.
    ///
    /// `null` is the unknown sentinel on every dimension except year, which
    /// always resolves from the fact table.
    pub fn decode_value(self, raw: &serde_json::Value) -> Result<DimensionValue, String> {
        use serde_json::Value;
        match (self, raw) {
            (Dimension::Year, Value::Number(n)) => n
                .as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .map(DimensionValue::Year)
                .ok_or_else(|| format!("year {n} is not a valid year")),
            (Dimension::Year, Value::String(s)) => s
                .trim()
                .parse::<i32>()
                .map(DimensionValue::Year)
                .map_err(|_| format!("year '{s}' is not a number")),
            (Dimension::Gender, Value::String(s)) => Gender::parse(s)
                .map(DimensionValue::Gender)
                .ok_or_else(|| format!("gender '{s}' is not one of Male, Female, Unknown")),
            (Dimension::Gender, Value::Null) => Ok(DimensionValue::Gender(Gender::Unknown)),
            (Dimension::Country | Dimension::Category, Value::String(s)) => {
                Ok(DimensionValue::Text(s.clone()))
            }
            (Dimension::Country | Dimension::Category, Value::Null) => Ok(DimensionValue::Unknown),
            (dimension, other) => Err(format!("{other} is not a valid {dimension} value")),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value a fact row carries along one [`Dimension`].
///
/// `Unknown` is the sentinel for dimension links the left joins could not
/// resolve; it is a regular, selectable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionValue {
    Year(i32),
    Gender(Gender),
    Text(String),
    Unknown,
}

impl DimensionValue {
    fn from_text(text: Option<&str>) -> DimensionValue {
        match text {
            Some(t) => DimensionValue::Text(t.to_string()),
            None => DimensionValue::Unknown,
        }
    }

    /// Human-readable label, as shown on selector options and chart axes.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            DimensionValue::Year(y) => y.to_string(),
            DimensionValue::Gender(g) => g.label().to_string(),
            DimensionValue::Text(t) => t.clone(),
            // parenthesized so it never collides with a stored "Unknown" name
            DimensionValue::Unknown => "(Unknown)".to_string(),
        }
    }

    /// JSON form used on the UI boundary; [`Dimension::decode_value`] reverses it.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DimensionValue::Year(y) => serde_json::Value::from(*y),
            DimensionValue::Gender(g) => serde_json::Value::from(g.label()),
            DimensionValue::Text(t) => serde_json::Value::from(t.as_str()),
            DimensionValue::Unknown => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One internet sales order line, denormalized with its dimension attributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct FactRow {
    pub order_number: String,
    pub year: i32,
    pub month: Month,
    pub sales_amount: f64,
    pub order_quantity: u32,
    pub total_product_cost: f64,
    pub customer: Option<String>,
    pub gender: Gender,
    pub country: Option<String>,
    pub category: Option<String>,
}

impl FactRow {
    /// The row's value along `dimension`, with missing links mapped to
    /// [`DimensionValue::Unknown`].
    #[must_use]
    pub fn value(&self, dimension: Dimension) -> DimensionValue {
        match dimension {
            Dimension::Year => DimensionValue::Year(self.year),
            Dimension::Country => DimensionValue::from_text(self.country.as_deref()),
            Dimension::Gender => DimensionValue::Gender(self.gender),
            Dimension::Category => DimensionValue::from_text(self.category.as_deref()),
        }
    }
}

/// The loaded fact table. Immutable once constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<FactRow>,
}

impl Dataset {
    #[must_use]
    pub fn new(rows: Vec<FactRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[FactRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct values observed along `dimension`, in first-seen order.
    #[must_use]
    pub fn distinct(&self, dimension: Dimension) -> Vec<DimensionValue> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .map(|row| row.value(dimension))
            .filter(|v| seen.insert(v.clone()))
            .collect()
    }
}
