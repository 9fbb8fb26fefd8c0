//! Sample run of every access pattern.

use std::fmt;

use northwind_core::storage::{CatalogRepository, Result};

pub const SAMPLE_EMPLOYEE_ID: u32 = 2;
pub const SAMPLE_PRODUCT_ID: u32 = 2;
pub const SAMPLE_RECENT_ORDERS: i32 = 25;
pub const SAMPLE_SHIPPER_NAME: &str = "United Package";
pub const SAMPLE_CONTACT_NAME: &str = "Maria Anders";
pub const SAMPLE_ORDER_ID: u32 = 10260;
pub const SAMPLE_COUNTRY: &str = "Germany";

/// One access pattern and what it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLine {
    pub label: &'static str,
    pub parameter: String,
    pub results: Vec<String>,
}

impl fmt::Display for QueryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: ", self.label, self.parameter)?;
        if self.results.is_empty() {
            f.write_str("no results")
        } else {
            f.write_str(&self.results.join(", "))
        }
    }
}

/// Results of [`run_sample_queries`], in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryReport {
    pub lines: Vec<QueryLine>,
}

impl QueryReport {
    fn push(&mut self, label: &'static str, parameter: impl ToString, results: Vec<String>) {
        self.lines.push(QueryLine {
            label,
            parameter: parameter.to_string(),
            results,
        });
    }

    pub fn get(&self, label: &str) -> Option<&QueryLine> {
        self.lines.iter().find(|line| line.label == label)
    }
}

/// Runs the nine access patterns with fixed sample parameters.
///
/// A missing employee yields an empty line; any query failure aborts.
pub async fn run_sample_queries(repository: &dyn CatalogRepository) -> Result<QueryReport> {
    let mut report = QueryReport::default();

    let employee = repository.get_employee(SAMPLE_EMPLOYEE_ID).await?;
    report.push(
        "employee",
        SAMPLE_EMPLOYEE_ID,
        employee
            .into_iter()
            .map(|e| format!("{} {} {}", e.employee_id, e.first_name, e.last_name))
            .collect(),
    );

    let reports = repository
        .list_employee_direct_reports(SAMPLE_EMPLOYEE_ID)
        .await?;
    report.push(
        "direct reports",
        SAMPLE_EMPLOYEE_ID,
        reports
            .iter()
            .map(|e| format!("'{} {}'", e.first_name, e.last_name))
            .collect(),
    );

    let products = repository.list_discontinued_products().await?;
    report.push(
        "discontinued products",
        "",
        products
            .iter()
            .map(|p| format!("'{}'", p.product_name))
            .collect(),
    );

    let lines = repository.list_orders_of_product(SAMPLE_PRODUCT_ID).await?;
    report.push(
        "orders of product",
        SAMPLE_PRODUCT_ID,
        lines.iter().map(|l| l.order_id.to_string()).collect(),
    );

    let orders = repository.list_recent_orders(SAMPLE_RECENT_ORDERS).await?;
    report.push(
        "recent orders",
        SAMPLE_RECENT_ORDERS,
        orders.iter().map(|o| o.order_id.to_string()).collect(),
    );

    let shippers = repository.list_shippers_by_name(SAMPLE_SHIPPER_NAME).await?;
    report.push(
        "shippers by name",
        SAMPLE_SHIPPER_NAME,
        shippers.iter().map(|s| s.shipper_id.to_string()).collect(),
    );

    let customers = repository
        .list_customers_by_contact_name(SAMPLE_CONTACT_NAME)
        .await?;
    report.push(
        "customers by contact name",
        SAMPLE_CONTACT_NAME,
        customers.iter().map(|c| c.customer_id.clone()).collect(),
    );

    let lines = repository.list_products_in_order(SAMPLE_ORDER_ID).await?;
    report.push(
        "products in order",
        SAMPLE_ORDER_ID,
        lines.iter().map(|l| l.product_id.to_string()).collect(),
    );

    let suppliers = repository.list_suppliers_by_country(SAMPLE_COUNTRY).await?;
    report.push(
        "suppliers by country",
        SAMPLE_COUNTRY,
        suppliers
            .iter()
            .map(|s| format!("'{}'", s.company_name))
            .collect(),
    );

    Ok(report)
}
