use async_trait::async_trait;

use crate::catalog::{
    Category, Customer, Employee, Order, OrderDetail, Product, Shipper, Supplier,
};

use super::Result;

/// Typed access to the catalog stored in the single table.
///
/// Writes are unconditional upserts: storing the same entity twice leaves a
/// single row. Reads run exactly one query and return the first page only;
/// an empty result is `Ok`, never an error.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn store_category(&self, category: &Category) -> Result<()>;

    async fn store_customer(&self, customer: &Customer) -> Result<()>;

    async fn store_employee(&self, employee: &Employee) -> Result<()>;

    async fn store_order(&self, order: &Order) -> Result<()>;

    async fn store_order_detail(&self, order_detail: &OrderDetail) -> Result<()>;

    async fn store_product(&self, product: &Product) -> Result<()>;

    async fn store_shipper(&self, shipper: &Shipper) -> Result<()>;

    async fn store_supplier(&self, supplier: &Supplier) -> Result<()>;

    /// Gets an employee by ID.
    async fn get_employee(&self, employee_id: u32) -> Result<Option<Employee>>;

    /// Lists the employees whose `reports_to` is `manager_id`.
    async fn list_employee_direct_reports(&self, manager_id: u32) -> Result<Vec<Employee>>;

    /// Lists products flagged as discontinued.
    async fn list_discontinued_products(&self) -> Result<Vec<Product>>;

    /// Lists the order lines that reference a product.
    async fn list_orders_of_product(&self, product_id: u32) -> Result<Vec<OrderDetail>>;

    /// Lists up to `limit` orders in index order.
    ///
    /// The index orders orders by customer ID, not by date, so despite the
    /// name the result is not the most recent orders.
    async fn list_recent_orders(&self, limit: i32) -> Result<Vec<Order>>;

    /// Lists shippers with the given company name.
    async fn list_shippers_by_name(&self, name: &str) -> Result<Vec<Shipper>>;

    /// Lists customers with the given contact name.
    async fn list_customers_by_contact_name(&self, contact_name: &str) -> Result<Vec<Customer>>;

    /// Lists the order lines of an order.
    async fn list_products_in_order(&self, order_id: u32) -> Result<Vec<OrderDetail>>;

    /// Lists suppliers located in `country`.
    async fn list_suppliers_by_country(&self, country: &str) -> Result<Vec<Supplier>>;
}
