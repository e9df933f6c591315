use duckdb::Connection;
use sales_dashboard::config::DashboardConfig;
use sales_dashboard::dashboard::Dashboard;
use sales_dashboard::loader::{connect, load};

/// Three sales lines: two 2012 US Bikes orders and one 2013 Canadian
/// Accessories order, plus one line whose territory and product are unknown.
const WAREHOUSE: &str = "
    CREATE TABLE DimSalesTerritory (SalesTerritoryKey INTEGER, SalesTerritoryCountry VARCHAR);
    CREATE TABLE DimCustomer (CustomerKey INTEGER, FirstName VARCHAR, LastName VARCHAR, Gender VARCHAR);
    CREATE TABLE DimProductCategory (ProductCategoryKey INTEGER, EnglishProductCategoryName VARCHAR);
    CREATE TABLE DimProductSubcategory (ProductSubcategoryKey INTEGER, ProductCategoryKey INTEGER);
    CREATE TABLE DimProduct (ProductKey INTEGER, ProductSubcategoryKey INTEGER);
    CREATE TABLE FactInternetSales (
        SalesOrderNumber VARCHAR,
        SalesOrderLineNumber TINYINT,
        OrderDate DATE,
        ProductKey INTEGER,
        CustomerKey INTEGER,
        SalesTerritoryKey INTEGER,
        OrderQuantity SMALLINT,
        SalesAmount DECIMAL(19, 4),
        TotalProductCost DECIMAL(19, 4)
    );
    INSERT INTO DimSalesTerritory VALUES (1, 'US'), (2, 'CA');
    INSERT INTO DimCustomer VALUES (1, 'Ann', 'Lee', 'F'), (2, 'Bob', 'Ray', 'M');
    INSERT INTO DimProductCategory VALUES (1, 'Bikes'), (2, 'Accessories');
    INSERT INTO DimProductSubcategory VALUES (10, 1), (20, 2);
    INSERT INTO DimProduct VALUES (100, 10), (200, 20);
    INSERT INTO FactInternetSales VALUES
        ('SO1', 1, DATE '2012-07-01', 100, 2, 1, 1, 100, 60),
        ('SO2', 1, DATE '2012-02-11', 100, 1, 1, 2, 50, 30),
        ('SO3', 1, DATE '2013-09-30', 200, 2, 2, 3, 20, 8);
";

fn dashboard() -> Dashboard {
    let con = Connection::open_in_memory().expect("in-memory DuckDB");
    con.execute_batch(WAREHOUSE).expect("seed warehouse");
    Dashboard::new(load(&con).expect("load sales"))
}

#[test]
fn initial_frame_covers_every_row() {
    let dash = dashboard();
    let frame = dash.frame();
    assert_eq!(frame.kpis.count, 3);
    assert!((frame.kpis.total_sales - 170.0).abs() < 1e-9);
    assert_eq!(frame.kpis.top_category.as_deref(), Some("Bikes"));
    assert_eq!(frame.tiles[1].display, "US $ 170.00");

    let months: Vec<&str> = frame.charts[1].series[0]
        .points
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(months, vec!["September", "July", "February"]);
}

#[test]
fn year_2012_scenario() {
    let mut dash = dashboard();
    let frame = dash
        .apply_json(r#"{"dimension": "year", "values": [2012]}"#)
        .unwrap();

    assert_eq!(frame.kpis.count, 2);
    assert!((frame.kpis.total_sales - 150.0).abs() < 1e-9);
    assert_eq!(frame.kpis.average_sales, Some(75.0));
    assert_eq!(frame.tiles[2].display, "US $ 75.00");

    // the country chart keeps the year filter
    let sales = &frame.charts[0].series[0];
    assert_eq!(sales.points.len(), 1);
    assert_eq!(sales.points[0].label, "US");
    assert!((sales.points[0].value - 150.0).abs() < 1e-9);
}

#[test]
fn country_selection_does_not_collapse_country_chart() {
    let mut dash = dashboard();
    let frame = dash
        .apply_json(r#"{"dimension": "country", "values": ["CA"]}"#)
        .unwrap();

    assert_eq!(frame.kpis.count, 1);
    let labels: Vec<&str> = frame.charts[0].series[0]
        .points
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(labels, vec!["US", "CA"]);

    // the gender donut follows the country filter
    let gender = &frame.charts[3].series[0];
    assert_eq!(gender.points.len(), 1);
    assert_eq!(gender.points[0].label, "Male");
    assert!((gender.points[0].value - 3.0).abs() < 1e-9);
}

#[test]
fn unknown_value_is_reported_and_session_continues() {
    let mut dash = dashboard();
    let err = dash
        .apply_json(r#"{"dimension": "category", "values": ["Bkes"]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("Did you mean 'Bikes'?"), "{err}");
    assert_eq!(dash.frame().kpis.count, 3);
}

#[test]
fn file_backed_store_opens_read_only() {
    let path = std::env::temp_dir().join(format!(
        "sales_dashboard_scenario_{}.duckdb",
        std::process::id()
    ));
    if path.exists() {
        std::fs::remove_file(&path).expect("clear stale warehouse");
    }
    {
        let con = Connection::open(&path).expect("create file-backed DB");
        con.execute_batch(WAREHOUSE).expect("seed warehouse");
    }

    let config = DashboardConfig::default()
        .with_overrides(|_| Some(path.display().to_string()));
    assert!(config.store.read_only);
    let con = connect(&config.store).expect("open read-only");
    assert_eq!(load(&con).expect("load").len(), 3);
    assert!(con
        .execute_batch("DELETE FROM FactInternetSales")
        .is_err());

    drop(con);
    std::fs::remove_file(&path).expect("remove temp warehouse");
}
