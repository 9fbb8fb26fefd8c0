//! CSV bulk loader.
//!
//! Reads the eight Northwind CSV files and stores every row through a
//! [`CatalogRepository`]. All files are parsed before the first write, so
//! a missing file or a malformed header leaves the table untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use northwind_core::catalog::{
    Category, Customer, Employee, Entity, EntityKind, Order, OrderDetail, Product, Shipper,
    Supplier,
};
use northwind_core::storage::{CatalogRepository, StoreError};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::observer::{Event, Observer};

/// Errors that abort a load before anything is written.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: csv::Error },
    #[error("{} is missing columns: {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

/// A catalog entity that can be read from its CSV file and stored.
#[async_trait]
pub trait CsvRecord: DeserializeOwned + Entity + Send + Sync {
    const FILE_NAME: &'static str;
    const COLUMNS: &'static [&'static str];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError>;
}

#[async_trait]
impl CsvRecord for Category {
    const FILE_NAME: &'static str = "categories.csv";
    const COLUMNS: &'static [&'static str] =
        &["categoryID", "categoryName", "description", "picture"];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_category(self).await
    }
}

#[async_trait]
impl CsvRecord for Customer {
    const FILE_NAME: &'static str = "customers.csv";
    const COLUMNS: &'static [&'static str] = &[
        "customerID",
        "companyName",
        "contactName",
        "contactTitle",
        "address",
        "city",
        "region",
        "postalCode",
        "country",
        "phone",
        "fax",
    ];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_customer(self).await
    }
}

#[async_trait]
impl CsvRecord for Employee {
    const FILE_NAME: &'static str = "employees.csv";
    const COLUMNS: &'static [&'static str] = &[
        "employeeID",
        "lastName",
        "firstName",
        "title",
        "titleOfCourtesy",
        "birthDate",
        "hireDate",
        "address",
        "city",
        "region",
        "postalCode",
        "country",
        "homePhone",
        "extension",
        "photo",
        "notes",
        "reportsTo",
        "photoPath",
    ];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_employee(self).await
    }
}

#[async_trait]
impl CsvRecord for OrderDetail {
    const FILE_NAME: &'static str = "order_details.csv";
    const COLUMNS: &'static [&'static str] =
        &["orderID", "productID", "unitPrice", "quantity", "discount"];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_order_detail(self).await
    }
}

#[async_trait]
impl CsvRecord for Order {
    const FILE_NAME: &'static str = "orders.csv";
    const COLUMNS: &'static [&'static str] = &[
        "orderID",
        "customerID",
        "employeeID",
        "orderDate",
        "requiredDate",
        "shippedDate",
        "shipVia",
        "freight",
        "shipName",
        "shipAddress",
        "shipCity",
        "shipRegion",
        "shipPostalCode",
        "shipCountry",
    ];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_order(self).await
    }
}

#[async_trait]
impl CsvRecord for Product {
    const FILE_NAME: &'static str = "products.csv";
    const COLUMNS: &'static [&'static str] = &[
        "productID",
        "productName",
        "supplierID",
        "categoryID",
        "quantityPerUnit",
        "unitPrice",
        "unitsInStock",
        "unitsOnOrder",
        "reorderLevel",
        "discontinued",
    ];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_product(self).await
    }
}

#[async_trait]
impl CsvRecord for Shipper {
    const FILE_NAME: &'static str = "shippers.csv";
    const COLUMNS: &'static [&'static str] = &["shipperID", "companyName", "phone"];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_shipper(self).await
    }
}

#[async_trait]
impl CsvRecord for Supplier {
    const FILE_NAME: &'static str = "suppliers.csv";
    const COLUMNS: &'static [&'static str] = &[
        "supplierID",
        "companyName",
        "contactName",
        "contactTitle",
        "address",
        "city",
        "region",
        "postalCode",
        "country",
        "phone",
        "fax",
        "homePage",
    ];

    async fn store(&self, repository: &dyn CatalogRepository) -> Result<(), StoreError> {
        repository.store_supplier(self).await
    }
}

/// Load outcome for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: EntityKind,
    pub stored: usize,
    /// Rows whose store call failed.
    pub failed: usize,
    /// Rows that could not be parsed.
    pub skipped: usize,
}

/// Load outcome, one entry per kind in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub kinds: Vec<KindSummary>,
}

impl LoadSummary {
    pub fn get(&self, kind: EntityKind) -> Option<&KindSummary> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    pub fn stored(&self) -> usize {
        self.kinds.iter().map(|k| k.stored).sum()
    }

    pub fn failed(&self) -> usize {
        self.kinds.iter().map(|k| k.failed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.kinds.iter().map(|k| k.skipped).sum()
    }
}

/// Parsed rows of one file.
struct Parsed<T> {
    records: Vec<T>,
    skipped: usize,
}

/// Every file's rows, read up front.
struct CatalogData {
    categories: Parsed<Category>,
    customers: Parsed<Customer>,
    employees: Parsed<Employee>,
    order_details: Parsed<OrderDetail>,
    orders: Parsed<Order>,
    products: Parsed<Product>,
    shippers: Parsed<Shipper>,
    suppliers: Parsed<Supplier>,
}

/// Loads the Northwind CSV files into the table.
pub struct BulkLoader {
    repository: Arc<dyn CatalogRepository>,
    observer: Arc<dyn Observer>,
}

impl BulkLoader {
    pub fn new(repository: Arc<dyn CatalogRepository>, observer: Arc<dyn Observer>) -> Self {
        Self {
            repository,
            observer,
        }
    }

    /// Loads every file in `directory`.
    ///
    /// Unparseable rows and failed store calls are reported and counted;
    /// only file-level problems return an error.
    pub async fn load(&self, directory: &Path) -> Result<LoadSummary, LoadError> {
        self.observer.event(&Event::LoadStarted {
            directory: &directory.display().to_string(),
        });

        let data = CatalogData {
            categories: self.read(directory)?,
            customers: self.read(directory)?,
            employees: self.read(directory)?,
            order_details: self.read(directory)?,
            orders: self.read(directory)?,
            products: self.read(directory)?,
            shippers: self.read(directory)?,
            suppliers: self.read(directory)?,
        };

        let summary = LoadSummary {
            kinds: vec![
                self.store_all(data.categories).await,
                self.store_all(data.customers).await,
                self.store_all(data.employees).await,
                self.store_all(data.order_details).await,
                self.store_all(data.orders).await,
                self.store_all(data.products).await,
                self.store_all(data.shippers).await,
                self.store_all(data.suppliers).await,
            ],
        };

        self.observer.event(&Event::LoadFinished {
            stored: summary.stored(),
            failed: summary.failed(),
            skipped: summary.skipped(),
        });

        Ok(summary)
    }

    fn read<T: CsvRecord>(&self, directory: &Path) -> Result<Parsed<T>, LoadError> {
        let path = directory.join(T::FILE_NAME);
        let read_error = |source| LoadError::Read {
            path: path.clone(),
            source,
        };

        let mut reader = csv::Reader::from_path(&path).map_err(read_error)?;

        let headers = reader.headers().map_err(read_error)?;
        let missing: Vec<String> = T::COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|header| header == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                path,
                columns: missing,
            });
        }

        let mut parsed = Parsed {
            records: Vec::new(),
            skipped: 0,
        };
        for result in reader.deserialize::<T>() {
            match result {
                Ok(record) => parsed.records.push(record),
                Err(err) => {
                    parsed.skipped += 1;
                    let line = err
                        .position()
                        .map_or_else(|| "unknown".to_string(), |p| p.line().to_string());
                    self.observer.event(&Event::RecordSkipped {
                        kind: T::KIND,
                        field: "line",
                        value: line,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(parsed)
    }

    async fn store_all<T: CsvRecord>(&self, parsed: Parsed<T>) -> KindSummary {
        let mut summary = KindSummary {
            kind: T::KIND,
            stored: 0,
            failed: 0,
            skipped: parsed.skipped,
        };

        for record in &parsed.records {
            match record.store(self.repository.as_ref()).await {
                Ok(()) => summary.stored += 1,
                Err(err) => {
                    summary.failed += 1;
                    self.observer.event(&Event::RecordSkipped {
                        kind: T::KIND,
                        field: T::LABEL_FIELD,
                        value: record.label(),
                        error: err.to_string(),
                    });
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::observer::recording::RecordingObserver;
    use crate::storage::SingleTableRepository;
    use crate::table::northwind_table_config;

    const TABLE: &str = "northwind";

    struct Fixture {
        directory: PathBuf,
        backend: InMemoryBackend,
        repository: Arc<SingleTableRepository>,
        observer: Arc<RecordingObserver>,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let directory = std::env::temp_dir().join(format!(
                "northwind-loader-{}-{}",
                name,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&directory);
            fs::create_dir_all(&directory).unwrap();

            let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
            let repository = Arc::new(SingleTableRepository::new(
                Arc::new(backend.clone()),
                TABLE,
                Arc::new(RecordingObserver::default()),
            ));

            Self {
                directory,
                backend,
                repository,
                observer: Arc::new(RecordingObserver::default()),
            }
        }

        fn write<T: CsvRecord>(&self, rows: &[&str]) {
            let mut contents = T::COLUMNS.join(",");
            for row in rows {
                contents.push('\n');
                contents.push_str(row);
            }
            contents.push('\n');
            fs::write(self.directory.join(T::FILE_NAME), contents).unwrap();
        }

        fn write_all(&self) {
            self.write::<Category>(&[
                "1,Beverages,\"Soft drinks, coffees, teas\",",
                "2,Condiments,Sauces,",
            ]);
            self.write::<Customer>(&[
                "ALFKI,Alfreds Futterkiste,Maria Anders,Sales Representative,Obere Str. 57,Berlin,,12209,Germany,030-0074321,030-0076545",
            ]);
            self.write::<Employee>(&[
                "2,Fuller,Andrew,Vice President,Dr.,1952-02-19,1992-08-14,908 W. Capital Way,Tacoma,WA,98401,USA,(206) 555-9482,3457,,,,",
                "1,Davolio,Nancy,Sales Representative,Ms.,1948-12-08,1992-05-01,507 - 20th Ave. E.,Seattle,WA,98122,USA,(206) 555-9857,5467,,,2,",
            ]);
            self.write::<OrderDetail>(&["10260,41,7.7,16,0.25", "10260,57,15.6,50,0"]);
            self.write::<Order>(&[
                "10260,OTTIK,4,1996-07-19,1996-08-16,1996-07-29,1,55.09,Ottilies Käseladen,Mehrheimerstr. 369,Köln,,50739,Germany",
            ]);
            self.write::<Product>(&[
                "1,Chai,1,1,10 boxes x 20 bags,18,39,0,10,0",
                "5,Chef Anton's Gumbo Mix,2,2,36 boxes,21.35,0,0,0,1",
            ]);
            self.write::<Shipper>(&["2,United Package,(503) 555-3199"]);
            self.write::<Supplier>(&[
                "11,Heli Süßwaren GmbH & Co. KG,Petra Winkler,Sales Manager,Tiergartenstraße 5,Berlin,,10785,Germany,(010) 9984510,,",
            ]);
        }

        fn loader(&self) -> BulkLoader {
            BulkLoader::new(self.repository.clone(), self.observer.clone())
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.directory);
        }
    }

    #[tokio::test]
    async fn test_load_all_files() {
        let fixture = Fixture::new("all");
        fixture.write_all();

        let summary = fixture.loader().load(&fixture.directory).await.unwrap();

        assert_eq!(summary.stored(), 12);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.skipped(), 0);
        let kinds: Vec<EntityKind> = summary.kinds.iter().map(|k| k.kind).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
        assert_eq!(summary.get(EntityKind::Employee).unwrap().stored, 2);
        assert_eq!(fixture.backend.item_count(TABLE).await, 12);

        let repo = &fixture.repository;
        let reports = repo.list_employee_direct_reports(2).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].first_name, "Nancy");

        let discontinued = repo.list_discontinued_products().await.unwrap();
        assert_eq!(discontinued.len(), 1);
        assert_eq!(discontinued[0].product_name, "Chef Anton's Gumbo Mix");

        let lines = repo.list_products_in_order(10260).await.unwrap();
        assert_eq!(lines.len(), 2);

        let suppliers = repo.list_suppliers_by_country("Germany").await.unwrap();
        assert_eq!(suppliers[0].company_name, "Heli Süßwaren GmbH & Co. KG");

        assert_eq!(
            fixture.observer.names(),
            vec!["load_started", "load_finished"]
        );
    }

    #[tokio::test]
    async fn test_missing_file_aborts_before_writing() {
        let fixture = Fixture::new("missing");
        fixture.write_all();
        fs::remove_file(fixture.directory.join("suppliers.csv")).unwrap();

        let err = fixture.loader().load(&fixture.directory).await.unwrap_err();

        assert!(
            matches!(err, LoadError::Read { ref path, .. } if path.ends_with("suppliers.csv"))
        );
        assert_eq!(fixture.backend.item_count(TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_missing_column_aborts() {
        let fixture = Fixture::new("header");
        fixture.write_all();
        fs::write(
            fixture.directory.join("shippers.csv"),
            "shipperID,companyName\n1,Speedy Express\n",
        )
        .unwrap();

        let err = fixture.loader().load(&fixture.directory).await.unwrap_err();

        match err {
            LoadError::MissingColumns { columns, .. } => assert_eq!(columns, vec!["phone"]),
            other => panic!("expected missing columns, got {other:?}"),
        }
        assert_eq!(fixture.backend.item_count(TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_bad_row_is_skipped() {
        let fixture = Fixture::new("bad-row");
        fixture.write_all();
        fixture.write::<Shipper>(&[
            "one,Speedy Express,(503) 555-9831",
            "2,United Package,(503) 555-3199",
        ]);

        let summary = fixture.loader().load(&fixture.directory).await.unwrap();

        let shippers = summary.get(EntityKind::Shipper).unwrap();
        assert_eq!(shippers.stored, 1);
        assert_eq!(shippers.skipped, 1);
        assert_eq!(fixture.observer.count("record_skipped"), 1);
        assert!(fixture.observer.rendered()[1].contains("line"));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_and_load_continues() {
        let fixture = Fixture::new("store-failure");
        fixture.write_all();
        fixture.backend.reject_partition("categories#1").await;

        let summary = fixture.loader().load(&fixture.directory).await.unwrap();

        let categories = summary.get(EntityKind::Category).unwrap();
        assert_eq!(categories.stored, 1);
        assert_eq!(categories.failed, 1);
        assert_eq!(summary.stored(), 11);
        assert_eq!(fixture.backend.item_count(TABLE).await, 11);

        let skipped = fixture
            .observer
            .rendered()
            .into_iter()
            .find(|event| event.contains("RecordSkipped"))
            .unwrap();
        assert!(skipped.contains("category_name"));
        assert!(skipped.contains("Beverages"));
    }
}
