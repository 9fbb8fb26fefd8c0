//! Key encoding for the single-table layout.
//!
//! Every entity is stored as one row keyed by `pk` (hash) and `sk` (range).
//! The only secondary index, `gsi_1`, uses `sk` as its hash key and the
//! overloaded `data` attribute as its range key, so the choice of `sk` and
//! `data` per entity decides which access patterns the index can answer.
//!
//! All functions are pure and infallible. Readers rebuild the same literals
//! or prefixes through the query-side helpers at the bottom of each section.

use crate::catalog::{
    Category, Customer, Employee, Order, OrderDetail, Product, Shipper, Supplier,
};

// ============================================================================
// Table schema
// ============================================================================

pub const PK_ATTRIBUTE: &str = "pk";
pub const SK_ATTRIBUTE: &str = "sk";
pub const DATA_ATTRIBUTE: &str = "data";

/// Name of the global secondary index (hash `sk`, range `data`).
pub const GSI_NAME: &str = "gsi_1";

// ============================================================================
// Key prefixes and literals
// ============================================================================

pub const CATEGORY_PREFIX: &str = "categories";
pub const CUSTOMER_PREFIX: &str = "customers";
pub const EMPLOYEE_PREFIX: &str = "employees";
pub const PRODUCT_PREFIX: &str = "products";
pub const SHIPPER_PREFIX: &str = "shippers";
pub const SUPPLIER_PREFIX: &str = "suppliers";

pub const ORDER_SK: &str = "ORDER";
pub const PRODUCT_SK: &str = "PRODUCT";
pub const SUPPLIER_SK: &str = "SUPPLIER";

/// `data` value of a discontinued product.
pub const DISCONTINUED_DATA: &str = "1";

/// Sort key prefix shared by the order lines stored under an order's `pk`.
pub const ORDER_DETAIL_SK_PREFIX: &str = "product";

// ============================================================================
// Encoded keys
// ============================================================================

/// Postal location flattened into `country#region#city#address`.
///
/// The most selective component comes last so that `begins_with` on a
/// leading subset narrows the result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub country: String,
    pub region: String,
    pub city: String,
    pub address: String,
}

impl Location {
    pub fn encode(&self) -> String {
        format!(
            "{}#{}#{}#{}",
            self.country, self.region, self.city, self.address
        )
    }
}

/// The `data` attribute, whose meaning depends on the entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyData {
    /// Category description.
    Description(String),
    /// Customer or supplier location.
    Location(Location),
    /// Employee hire date. Only used for ordering, never for equality.
    HireDate(String),
    /// Customer that placed an order.
    CustomerId(String),
    /// Unit price of an order line.
    UnitPrice(String),
    /// Product discontinued flag; active products carry no `data` at all.
    Discontinued(bool),
    /// Shipper phone number.
    Phone(String),
}

impl KeyData {
    /// Returns the wire value, or `None` for an active product.
    ///
    /// Only the discontinued flag is sparse: an active product carries no
    /// `data` and stays out of `gsi_1`. Every other kind always yields a
    /// value, which may be empty when the source field is empty.
    pub fn to_attribute(&self) -> Option<String> {
        let value = match self {
            KeyData::Description(s)
            | KeyData::HireDate(s)
            | KeyData::CustomerId(s)
            | KeyData::UnitPrice(s)
            | KeyData::Phone(s) => s.clone(),
            KeyData::Location(location) => location.encode(),
            KeyData::Discontinued(true) => DISCONTINUED_DATA.to_string(),
            KeyData::Discontinued(false) => return None,
        };

        Some(value)
    }
}

/// The `(pk, sk, data)` triple of a stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKeys {
    pub pk: String,
    pub sk: String,
    pub data: KeyData,
}

/// Entities that know their own row keys.
pub trait KeyedEntity {
    fn keys(&self) -> EntityKeys;
}

// ============================================================================
// Category keys
// ============================================================================

/// Pattern: `categories#<category_id>`
pub fn category_pk(category_id: u32) -> String {
    format!("{CATEGORY_PREFIX}#{category_id}")
}

/// Pattern: `categories#<category_name>`
pub fn category_sk(category_name: &str) -> String {
    format!("{CATEGORY_PREFIX}#{category_name}")
}

impl KeyedEntity for Category {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: category_pk(self.category_id),
            sk: category_sk(&self.category_name),
            data: KeyData::Description(self.description.clone()),
        }
    }
}

// ============================================================================
// Customer keys
// ============================================================================

/// Pattern: `customers#<customer_id>`
pub fn customer_pk(customer_id: &str) -> String {
    format!("{CUSTOMER_PREFIX}#{customer_id}")
}

/// The contact name itself, so `gsi_1` groups customers by contact.
pub fn customer_sk(contact_name: &str) -> String {
    contact_name.to_string()
}

impl KeyedEntity for Customer {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: customer_pk(&self.customer_id),
            sk: customer_sk(&self.contact_name),
            data: KeyData::Location(Location {
                country: self.country.clone(),
                region: self.region.clone(),
                city: self.city.clone(),
                address: self.address.clone(),
            }),
        }
    }
}

// ============================================================================
// Employee keys
// ============================================================================

/// Pattern: `employees#<employee_id>`
pub fn employee_pk(employee_id: u32) -> String {
    format!("{EMPLOYEE_PREFIX}#{employee_id}")
}

/// Pattern: `employees#<reports_to>`
///
/// Every employee row lives under its manager's `sk`, which turns `gsi_1`
/// into a "direct reports" lookup.
pub fn employee_sk(reports_to: &str) -> String {
    format!("{EMPLOYEE_PREFIX}#{reports_to}")
}

/// The `sk` shared by all direct reports of `manager_id`.
pub fn employee_manager_sk(manager_id: u32) -> String {
    employee_sk(&manager_id.to_string())
}

impl KeyedEntity for Employee {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: employee_pk(self.employee_id),
            sk: employee_sk(&self.reports_to),
            data: KeyData::HireDate(self.hire_date.clone()),
        }
    }
}

// ============================================================================
// Order and order line keys
// ============================================================================

/// Pattern: `<order_id>`
///
/// An order and its lines share one partition.
pub fn order_pk(order_id: u32) -> String {
    order_id.to_string()
}

/// Pattern: `products#<product_id>`
pub fn order_detail_sk(product_id: u32) -> String {
    format!("{PRODUCT_PREFIX}#{product_id}")
}

impl KeyedEntity for Order {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: order_pk(self.order_id),
            sk: ORDER_SK.to_string(),
            data: KeyData::CustomerId(self.customer_id.clone()),
        }
    }
}

impl KeyedEntity for OrderDetail {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: order_pk(self.order_id),
            sk: order_detail_sk(self.product_id),
            data: KeyData::UnitPrice(self.unit_price.clone()),
        }
    }
}

// ============================================================================
// Product keys
// ============================================================================

/// Pattern: `products#<product_id>`
pub fn product_pk(product_id: u32) -> String {
    format!("{PRODUCT_PREFIX}#{product_id}")
}

impl KeyedEntity for Product {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: product_pk(self.product_id),
            sk: PRODUCT_SK.to_string(),
            data: KeyData::Discontinued(self.is_discontinued()),
        }
    }
}

// ============================================================================
// Shipper keys
// ============================================================================

/// Pattern: `shippers#<shipper_id>`
pub fn shipper_pk(shipper_id: u32) -> String {
    format!("{SHIPPER_PREFIX}#{shipper_id}")
}

/// The company name itself.
pub fn shipper_sk(company_name: &str) -> String {
    company_name.to_string()
}

impl KeyedEntity for Shipper {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: shipper_pk(self.shipper_id),
            sk: shipper_sk(&self.company_name),
            data: KeyData::Phone(self.phone.clone()),
        }
    }
}

// ============================================================================
// Supplier keys
// ============================================================================

/// Pattern: `suppliers#<supplier_id>`
pub fn supplier_pk(supplier_id: u32) -> String {
    format!("{SUPPLIER_PREFIX}#{supplier_id}")
}

impl KeyedEntity for Supplier {
    fn keys(&self) -> EntityKeys {
        EntityKeys {
            pk: supplier_pk(self.supplier_id),
            sk: SUPPLIER_SK.to_string(),
            data: KeyData::Location(Location {
                country: self.country.clone(),
                region: self.region.clone(),
                city: self.city.clone(),
                address: self.address.clone(),
            }),
        }
    }
}

/// Pattern: `<country>#`
///
/// The trailing separator stops `Germany` from matching a country that
/// merely starts with the same letters.
pub fn location_country_prefix(country: &str) -> String {
    format!("{country}#")
}
