//! Single-table repository.
//!
//! Implements [`CatalogRepository`] on top of any [`TableBackend`]. Every
//! write is one unconditional put; every read is one query whose first
//! page is decoded into catalog types.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use northwind_core::catalog::{
    Category, Customer, Employee, Entity, Order, OrderDetail, Product, Shipper, Supplier,
};
use northwind_core::keys::{
    self, KeyedEntity, DATA_ATTRIBUTE, DISCONTINUED_DATA, ORDER_DETAIL_SK_PREFIX, ORDER_SK,
    PK_ATTRIBUTE, PRODUCT_SK, SK_ATTRIBUTE, SUPPLIER_SK,
};
use northwind_core::storage::{BackendError, CatalogRepository, KeyQuery, Result, StoreError};

use super::conversions::ItemCodec;
use crate::backend::{Item, TableBackend};
use crate::observer::{Event, Observer};

/// Builds the full stored row of an entity: its attributes plus the
/// `pk`, `sk` and `data` key attributes.
///
/// An empty `data` value is rejected: the row could never be found through
/// `gsi_1`.
pub fn entity_item<T>(entity: &T) -> std::result::Result<Item, BackendError>
where
    T: KeyedEntity + ItemCodec,
{
    let keys = entity.keys();
    let mut item = entity.to_item();

    item.insert(PK_ATTRIBUTE.to_string(), AttributeValue::S(keys.pk));
    item.insert(SK_ATTRIBUTE.to_string(), AttributeValue::S(keys.sk));
    if let Some(data) = keys.data.to_attribute() {
        if data.is_empty() {
            return Err(BackendError::InvalidRequest(format!(
                "Index key attribute '{DATA_ATTRIBUTE}' may not be an empty string"
            )));
        }
        item.insert(DATA_ATTRIBUTE.to_string(), AttributeValue::S(data));
    }

    Ok(item)
}

/// Repository over the single Northwind table.
pub struct SingleTableRepository {
    backend: Arc<dyn TableBackend>,
    table_name: String,
    observer: Arc<dyn Observer>,
}

impl SingleTableRepository {
    pub fn new(
        backend: Arc<dyn TableBackend>,
        table_name: impl Into<String>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
            observer,
        }
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn store<T>(&self, entity: &T) -> Result<()>
    where
        T: Entity + KeyedEntity + ItemCodec + Sync,
    {
        let write_error = |source: BackendError| StoreError::Write {
            kind: T::KIND,
            id: entity.id(),
            table: self.table_name.clone(),
            source,
        };

        let item = entity_item(entity).map_err(write_error)?;
        self.backend
            .put_item(&self.table_name, item)
            .await
            .map_err(write_error)
    }

    async fn query_as<T>(&self, operation: &'static str, query: KeyQuery) -> Result<Vec<T>>
    where
        T: Entity + ItemCodec,
    {
        let items = self
            .backend
            .query(&self.table_name, &query)
            .await
            .map_err(|source| StoreError::Query {
                operation,
                table: self.table_name.clone(),
                source,
            })?;

        self.observer.event(&Event::QueryCompleted {
            table: &self.table_name,
            operation,
            items: items.len(),
        });

        items
            .iter()
            .map(|item| {
                T::from_item(item).map_err(|source| StoreError::Decode {
                    kind: T::KIND,
                    table: self.table_name.clone(),
                    source,
                })
            })
            .collect()
    }
}

// ============================================================================
// CatalogRepository implementation
// ============================================================================

#[async_trait]
impl CatalogRepository for SingleTableRepository {
    async fn store_category(&self, category: &Category) -> Result<()> {
        self.store(category).await
    }

    async fn store_customer(&self, customer: &Customer) -> Result<()> {
        self.store(customer).await
    }

    async fn store_employee(&self, employee: &Employee) -> Result<()> {
        self.store(employee).await
    }

    async fn store_order(&self, order: &Order) -> Result<()> {
        self.store(order).await
    }

    async fn store_order_detail(&self, order_detail: &OrderDetail) -> Result<()> {
        self.store(order_detail).await
    }

    async fn store_product(&self, product: &Product) -> Result<()> {
        self.store(product).await
    }

    async fn store_shipper(&self, shipper: &Shipper) -> Result<()> {
        self.store(shipper).await
    }

    async fn store_supplier(&self, supplier: &Supplier) -> Result<()> {
        self.store(supplier).await
    }

    async fn get_employee(&self, employee_id: u32) -> Result<Option<Employee>> {
        let employees = self
            .query_as(
                "get_employee",
                KeyQuery::primary(keys::employee_pk(employee_id)),
            )
            .await?;

        Ok(employees.into_iter().next())
    }

    async fn list_employee_direct_reports(&self, manager_id: u32) -> Result<Vec<Employee>> {
        self.query_as(
            "list_employee_direct_reports",
            KeyQuery::secondary(keys::employee_manager_sk(manager_id)),
        )
        .await
    }

    async fn list_discontinued_products(&self) -> Result<Vec<Product>> {
        self.query_as(
            "list_discontinued_products",
            KeyQuery::secondary(PRODUCT_SK).range_equals(DISCONTINUED_DATA),
        )
        .await
    }

    async fn list_orders_of_product(&self, product_id: u32) -> Result<Vec<OrderDetail>> {
        self.query_as(
            "list_orders_of_product",
            KeyQuery::secondary(keys::order_detail_sk(product_id)),
        )
        .await
    }

    async fn list_recent_orders(&self, limit: i32) -> Result<Vec<Order>> {
        self.query_as(
            "list_recent_orders",
            KeyQuery::secondary(ORDER_SK).with_limit(limit),
        )
        .await
    }

    async fn list_shippers_by_name(&self, name: &str) -> Result<Vec<Shipper>> {
        self.query_as(
            "list_shippers_by_name",
            KeyQuery::secondary(keys::shipper_sk(name)),
        )
        .await
    }

    async fn list_customers_by_contact_name(&self, contact_name: &str) -> Result<Vec<Customer>> {
        self.query_as(
            "list_customers_by_contact_name",
            KeyQuery::secondary(keys::customer_sk(contact_name)),
        )
        .await
    }

    async fn list_products_in_order(&self, order_id: u32) -> Result<Vec<OrderDetail>> {
        self.query_as(
            "list_products_in_order",
            KeyQuery::primary(keys::order_pk(order_id)).range_begins_with(ORDER_DETAIL_SK_PREFIX),
        )
        .await
    }

    async fn list_suppliers_by_country(&self, country: &str) -> Result<Vec<Supplier>> {
        self.query_as(
            "list_suppliers_by_country",
            KeyQuery::secondary(SUPPLIER_SK)
                .range_begins_with(keys::location_country_prefix(country)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use northwind_core::catalog::EntityKind;
    use northwind_core::storage::{BackendError, FieldError};

    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::observer::recording::RecordingObserver;
    use crate::table::northwind_table_config;

    const TABLE: &str = "northwind";

    fn setup() -> (InMemoryBackend, SingleTableRepository) {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        let repo = SingleTableRepository::new(
            Arc::new(backend.clone()),
            TABLE,
            Arc::new(RecordingObserver::default()),
        );
        (backend, repo)
    }

    fn employee(id: u32, reports_to: &str, hire_date: &str) -> Employee {
        Employee {
            employee_id: id,
            first_name: format!("Employee {id}"),
            hire_date: hire_date.to_string(),
            reports_to: reports_to.to_string(),
            ..Default::default()
        }
    }

    fn product(id: u32, discontinued: &str) -> Product {
        Product {
            product_id: id,
            product_name: format!("Product {id}"),
            supplier_id: 1,
            category_id: 1,
            discontinued: discontinued.to_string(),
            ..Default::default()
        }
    }

    fn order(id: u32, customer_id: &str) -> Order {
        Order {
            order_id: id,
            customer_id: customer_id.to_string(),
            employee_id: 4,
            ..Default::default()
        }
    }

    fn line(order_id: u32, product_id: u32) -> OrderDetail {
        OrderDetail {
            order_id,
            product_id,
            unit_price: "14".to_string(),
            quantity: "12".to_string(),
            discount: "0".to_string(),
        }
    }

    fn supplier(id: u32, country: &str) -> Supplier {
        Supplier {
            supplier_id: id,
            company_name: format!("Supplier {id}"),
            city: "Berlin".to_string(),
            country: country.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_entity_item_merges_keys() {
        let item = entity_item(&product(5, "1")).unwrap();

        assert_eq!(item.get("pk"), Some(&AttributeValue::S("products#5".to_string())));
        assert_eq!(item.get("sk"), Some(&AttributeValue::S("PRODUCT".to_string())));
        assert_eq!(item.get("data"), Some(&AttributeValue::S("1".to_string())));

        let item = entity_item(&product(6, "0")).unwrap();
        assert!(!item.contains_key("data"));
    }

    #[tokio::test]
    async fn test_category_scenario() {
        let (backend, repo) = setup();
        let category = Category {
            category_id: 1,
            category_name: "Beverages".to_string(),
            description: "Soft drinks, coffees, teas, beers, and ales".to_string(),
            picture: String::new(),
        };

        repo.store_category(&category).await.unwrap();

        assert_eq!(repo.get_employee(1).await.unwrap(), None);
        assert!(repo.list_discontinued_products().await.unwrap().is_empty());
        assert!(repo.list_recent_orders(25).await.unwrap().is_empty());
        assert!(repo.list_suppliers_by_country("Germany").await.unwrap().is_empty());

        let items = backend
            .query(TABLE, &KeyQuery::primary("categories#1"))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(Category::from_item(&items[0]).unwrap(), category);
    }

    #[tokio::test]
    async fn test_store_twice_keeps_one_row() {
        let (backend, repo) = setup();
        let mut shipper = Shipper {
            shipper_id: 2,
            company_name: "United Package".to_string(),
            phone: "(503) 555-3199".to_string(),
        };

        repo.store_shipper(&shipper).await.unwrap();
        shipper.phone = "(503) 555-0000".to_string();
        repo.store_shipper(&shipper).await.unwrap();

        assert_eq!(backend.item_count(TABLE).await, 1);
        let shippers = repo.list_shippers_by_name("United Package").await.unwrap();
        assert_eq!(shippers, vec![shipper]);
    }

    #[tokio::test]
    async fn test_get_employee_roundtrip() {
        let (_, repo) = setup();
        let manager = employee(2, "", "1992-08-14");

        repo.store_employee(&manager).await.unwrap();

        assert_eq!(repo.get_employee(2).await.unwrap(), Some(manager));
        assert_eq!(repo.get_employee(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_employee_direct_reports() {
        let (_, repo) = setup();
        for e in [
            employee(2, "", "1992-08-14"),
            employee(1, "2", "1992-05-01"),
            employee(3, "2", "1992-04-01"),
            employee(5, "2", "1993-10-17"),
            employee(6, "5", "1993-10-17"),
        ] {
            repo.store_employee(&e).await.unwrap();
        }

        let reports = repo.list_employee_direct_reports(2).await.unwrap();
        let ids: Vec<u32> = reports.iter().map(|e| e.employee_id).collect();
        assert_eq!(ids, vec![3, 1, 5]);

        let reports = repo.list_employee_direct_reports(5).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].employee_id, 6);

        assert!(repo.list_employee_direct_reports(9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_discontinued_products() {
        let (_, repo) = setup();
        for p in [product(1, "0"), product(9, "1"), product(5, "1"), product(7, "")] {
            repo.store_product(&p).await.unwrap();
        }

        let products = repo.list_discontinued_products().await.unwrap();
        let ids: Vec<u32> = products.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![5, 9]);
        assert!(products.iter().all(Product::is_discontinued));
    }

    #[tokio::test]
    async fn test_order_queries() {
        let (_, repo) = setup();
        for o in [order(10248, "VINET"), order(10249, "TOMSP"), order(10250, "HANAR")] {
            repo.store_order(&o).await.unwrap();
        }
        for l in [line(10248, 11), line(10249, 11), line(10249, 42), line(10250, 41)] {
            repo.store_order_detail(&l).await.unwrap();
        }

        let lines = repo.list_orders_of_product(11).await.unwrap();
        let order_ids: Vec<u32> = lines.iter().map(|l| l.order_id).collect();
        assert_eq!(order_ids, vec![10248, 10249]);

        let recent = repo.list_recent_orders(2).await.unwrap();
        let customers: Vec<&str> = recent.iter().map(|o| o.customer_id.as_str()).collect();
        assert_eq!(customers, vec!["HANAR", "TOMSP"]);

        let in_order = repo.list_products_in_order(10249).await.unwrap();
        assert_eq!(in_order, vec![line(10249, 11), line(10249, 42)]);

        assert!(repo.list_products_in_order(10260).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_customers_by_contact_name() {
        let (_, repo) = setup();
        let customer = Customer {
            customer_id: "ALFKI".to_string(),
            company_name: "Alfreds Futterkiste".to_string(),
            contact_name: "Maria Anders".to_string(),
            address: "Obere Str. 57".to_string(),
            city: "Berlin".to_string(),
            country: "Germany".to_string(),
            ..Default::default()
        };
        repo.store_customer(&customer).await.unwrap();

        let customers = repo
            .list_customers_by_contact_name("Maria Anders")
            .await
            .unwrap();
        assert_eq!(customers, vec![customer]);
        assert!(repo
            .list_customers_by_contact_name("Ana Trujillo")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_suppliers_by_country() {
        let (_, repo) = setup();
        for s in [
            supplier(11, "Germany"),
            supplier(1, "UK"),
            supplier(12, "Germany"),
            supplier(30, "Germany East"),
        ] {
            repo.store_supplier(&s).await.unwrap();
        }

        let suppliers = repo.list_suppliers_by_country("Germany").await.unwrap();
        let ids: Vec<u32> = suppliers.iter().map(|s| s.supplier_id).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_write_error() {
        let (backend, repo) = setup();
        backend.reject_partition("categories#1").await;

        let category = Category {
            category_id: 1,
            category_name: "Beverages".to_string(),
            description: "Soft drinks".to_string(),
            ..Default::default()
        };
        let err = repo.store_category(&category).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::Write {
                kind: EntityKind::Category,
                id: "1".to_string(),
                table: TABLE.to_string(),
                source: BackendError::InternalServer,
            }
        );
    }

    #[tokio::test]
    async fn test_store_rejects_empty_index_value() {
        let (backend, repo) = setup();

        let err = repo
            .store_employee(&employee(7, "2", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Write {
                kind: EntityKind::Employee,
                ref id,
                source: BackendError::InvalidRequest(_),
                ..
            } if id == "7"
        ));

        let shipper = Shipper {
            shipper_id: 3,
            company_name: "Federal Shipping".to_string(),
            phone: String::new(),
        };
        let err = repo.store_shipper(&shipper).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Write {
                kind: EntityKind::Shipper,
                source: BackendError::InvalidRequest(_),
                ..
            }
        ));

        assert_eq!(backend.item_count(TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_recent_orders_rejects_non_positive_limit() {
        let (_, repo) = setup();
        repo.store_order(&order(10248, "VINET")).await.unwrap();

        for limit in [0, -1] {
            let err = repo.list_recent_orders(limit).await.unwrap_err();
            assert!(matches!(
                err,
                StoreError::Query {
                    operation: "list_recent_orders",
                    source: BackendError::InvalidRequest(_),
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_query_error_on_missing_table() {
        let repo = SingleTableRepository::new(
            Arc::new(InMemoryBackend::new()),
            TABLE,
            Arc::new(RecordingObserver::default()),
        );

        match repo.list_discontinued_products().await {
            Err(StoreError::Query {
                operation, table, ..
            }) => {
                assert_eq!(operation, "list_discontinued_products");
                assert_eq!(table, TABLE);
            }
            other => panic!("expected query error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_error() {
        let (backend, repo) = setup();
        let item = Item::from([
            ("pk".to_string(), AttributeValue::S("products#1".to_string())),
            ("sk".to_string(), AttributeValue::S("PRODUCT".to_string())),
            ("data".to_string(), AttributeValue::S("1".to_string())),
        ]);
        backend.put_item(TABLE, item).await.unwrap();

        let err = repo.list_discontinued_products().await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Decode {
                kind: EntityKind::Product,
                table: TABLE.to_string(),
                source: FieldError::Missing("productID"),
            }
        );
    }

    #[tokio::test]
    async fn test_queries_are_reported() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        let observer = Arc::new(RecordingObserver::default());
        let repo = SingleTableRepository::new(Arc::new(backend), TABLE, observer.clone());

        repo.list_recent_orders(25).await.unwrap();
        repo.get_employee(2).await.unwrap();

        assert_eq!(observer.count("query_completed"), 2);
    }
}
