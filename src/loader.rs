use std::time::Instant;

use duckdb::{AccessMode, Config, Connection};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::DataSourceError;
use crate::model::{Dataset, FactRow, Gender, Month};

/// The one query the dashboard ever runs.
///
/// Every dimension is LEFT JOINed so fact lines with dangling keys are kept,
/// with NULL dimension columns.
pub const SALES_QUERY: &str = "\
SELECT
    fis.SalesOrderNumber,
    CAST(year(fis.OrderDate) AS INTEGER) AS \"Year\",
    monthname(fis.OrderDate) AS \"Month\",
    CAST(fis.SalesAmount AS DOUBLE) AS SalesAmount,
    CAST(fis.OrderQuantity AS BIGINT) AS OrderQuantity,
    CAST(fis.TotalProductCost AS DOUBLE) AS TotalProductCost,
    dc.FirstName || ' ' || dc.LastName AS Customer,
    dc.Gender,
    dst.SalesTerritoryCountry,
    dpc.EnglishProductCategoryName
FROM FactInternetSales fis
LEFT JOIN DimSalesTerritory dst
    ON fis.SalesTerritoryKey = dst.SalesTerritoryKey
LEFT JOIN DimCustomer dc
    ON fis.CustomerKey = dc.CustomerKey
LEFT JOIN DimProduct dp
    ON fis.ProductKey = dp.ProductKey
LEFT JOIN DimProductSubcategory dps
    ON dp.ProductSubcategoryKey = dps.ProductSubcategoryKey
LEFT JOIN DimProductCategory dpc
    ON dps.ProductCategoryKey = dpc.ProductCategoryKey
ORDER BY fis.SalesOrderNumber, fis.SalesOrderLineNumber";

/// Open the warehouse described by `store`.
///
/// `read_only` is honoured for file-backed stores only; `DuckDB` refuses
/// read-only in-memory databases.
pub fn connect(store: &StoreConfig) -> Result<Connection, DataSourceError> {
    let connect_err = |source: duckdb::Error| DataSourceError::Connect {
        path: store.path.clone(),
        source,
    };
    if store.path == ":memory:" {
        return Connection::open_in_memory().map_err(connect_err);
    }
    let mode = if store.read_only {
        AccessMode::ReadOnly
    } else {
        AccessMode::ReadWrite
    };
    let config = Config::default().access_mode(mode).map_err(connect_err)?;
    Connection::open_with_flags(&store.path, config).map_err(connect_err)
}

/// A result row exactly as the driver hands it back, before validation.
struct RawRow {
    order_number: String,
    year: i32,
    month: String,
    sales_amount: f64,
    order_quantity: i64,
    total_product_cost: f64,
    customer: Option<String>,
    gender: Option<String>,
    country: Option<String>,
    category: Option<String>,
}

impl RawRow {
    fn into_fact(self, index: usize) -> Result<FactRow, DataSourceError> {
        let invalid = |reason: String| DataSourceError::InvalidRow { row: index, reason };
        let month =
            Month::parse(&self.month).ok_or_else(|| invalid(format!("unknown month '{}'", self.month)))?;
        let order_quantity = u32::try_from(self.order_quantity).map_err(|_| {
            invalid(format!(
                "order quantity {} out of range for order '{}'",
                self.order_quantity, self.order_number
            ))
        })?;
        Ok(FactRow {
            order_number: self.order_number,
            year: self.year,
            month,
            sales_amount: self.sales_amount,
            order_quantity,
            total_product_cost: self.total_product_cost,
            customer: self.customer,
            gender: Gender::from_code(self.gender.as_deref()),
            country: self.country,
            category: self.category,
        })
    }
}

/// Run [`SALES_QUERY`] and materialize the whole result as a [`Dataset`].
///
/// Either every row decodes or the load fails; there is no partial dataset.
pub fn load(con: &Connection) -> Result<Dataset, DataSourceError> {
    let started = Instant::now();
    debug!(sql = SALES_QUERY, "running sales query");

    let mut stmt = con.prepare(SALES_QUERY)?;
    let raw = stmt
        .query_map([], |row| {
            Ok(RawRow {
                order_number: row.get(0)?,
                year: row.get(1)?,
                month: row.get(2)?,
                sales_amount: row.get(3)?,
                order_quantity: row.get(4)?,
                total_product_cost: row.get(5)?,
                customer: row.get(6)?,
                gender: row.get(7)?,
                country: row.get(8)?,
                category: row.get(9)?,
            })
        })?
        .collect::<duckdb::Result<Vec<RawRow>>>()?;

    let rows = raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_fact(i))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        rows = rows.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "loaded sales dataset"
    );
    Ok(Dataset::new(rows))
}
