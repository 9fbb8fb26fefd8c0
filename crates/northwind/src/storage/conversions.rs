//! DynamoDB attribute conversions.
//!
//! Pure conversions between [`Item`] maps and catalog types. Key attributes
//! are not written here; the repository merges them in from the key
//! encoder.

use aws_sdk_dynamodb::types::AttributeValue;
use northwind_core::catalog::{
    Category, Customer, Employee, Order, OrderDetail, Product, Shipper, Supplier,
};
use northwind_core::storage::FieldError;

use crate::backend::Item;

/// Conversion between a catalog entity and its stored attributes.
pub trait ItemCodec: Sized {
    fn to_item(&self) -> Item;
    fn from_item(item: &Item) -> Result<Self, FieldError>;
}

// ============================================================================
// Attribute helpers
// ============================================================================

/// Stores a string attribute. Empty strings are left out.
fn put_string(item: &mut Item, name: &str, value: &str) {
    if !value.is_empty() {
        item.insert(name.to_string(), AttributeValue::S(value.to_string()));
    }
}

fn put_number(item: &mut Item, name: &str, value: u32) {
    item.insert(name.to_string(), AttributeValue::N(value.to_string()));
}

/// Reads a string attribute. Absent attributes read back as empty.
fn get_string(item: &Item, name: &'static str) -> Result<String, FieldError> {
    match item.get(name) {
        None => Ok(String::new()),
        Some(value) => value.as_s().cloned().map_err(|_| FieldError::Invalid {
            field: name,
            expected: "string",
        }),
    }
}

/// Reads a required numeric identifier.
fn get_u32(item: &Item, name: &'static str) -> Result<u32, FieldError> {
    let raw = item
        .get(name)
        .ok_or(FieldError::Missing(name))?
        .as_n()
        .map_err(|_| FieldError::Invalid {
            field: name,
            expected: "number",
        })?;

    raw.parse().map_err(|_| FieldError::InvalidNumber {
        field: name,
        value: raw.clone(),
    })
}

// ============================================================================
// Category
// ============================================================================

impl ItemCodec for Category {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "categoryID", self.category_id);
        put_string(&mut item, "categoryName", &self.category_name);
        put_string(&mut item, "description", &self.description);
        put_string(&mut item, "picture", &self.picture);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Category {
            category_id: get_u32(item, "categoryID")?,
            category_name: get_string(item, "categoryName")?,
            description: get_string(item, "description")?,
            picture: get_string(item, "picture")?,
        })
    }
}

// ============================================================================
// Customer
// ============================================================================

impl ItemCodec for Customer {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_string(&mut item, "customerID", &self.customer_id);
        put_string(&mut item, "companyName", &self.company_name);
        put_string(&mut item, "contactName", &self.contact_name);
        put_string(&mut item, "contactTitle", &self.contact_title);
        put_string(&mut item, "address", &self.address);
        put_string(&mut item, "city", &self.city);
        put_string(&mut item, "region", &self.region);
        put_string(&mut item, "postalCode", &self.postal_code);
        put_string(&mut item, "country", &self.country);
        put_string(&mut item, "phone", &self.phone);
        put_string(&mut item, "fax", &self.fax);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Customer {
            customer_id: get_string(item, "customerID")?,
            company_name: get_string(item, "companyName")?,
            contact_name: get_string(item, "contactName")?,
            contact_title: get_string(item, "contactTitle")?,
            address: get_string(item, "address")?,
            city: get_string(item, "city")?,
            region: get_string(item, "region")?,
            postal_code: get_string(item, "postalCode")?,
            country: get_string(item, "country")?,
            phone: get_string(item, "phone")?,
            fax: get_string(item, "fax")?,
        })
    }
}

// ============================================================================
// Employee
// ============================================================================

impl ItemCodec for Employee {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "employeeID", self.employee_id);
        put_string(&mut item, "lastName", &self.last_name);
        put_string(&mut item, "firstName", &self.first_name);
        put_string(&mut item, "title", &self.title);
        put_string(&mut item, "titleOfCourtesy", &self.title_of_courtesy);
        put_string(&mut item, "birthDate", &self.birth_date);
        put_string(&mut item, "hireDate", &self.hire_date);
        put_string(&mut item, "address", &self.address);
        put_string(&mut item, "city", &self.city);
        put_string(&mut item, "region", &self.region);
        put_string(&mut item, "postalCode", &self.postal_code);
        put_string(&mut item, "country", &self.country);
        put_string(&mut item, "homePhone", &self.home_phone);
        put_string(&mut item, "extension", &self.extension);
        put_string(&mut item, "photo", &self.photo);
        put_string(&mut item, "notes", &self.notes);
        put_string(&mut item, "reportsTo", &self.reports_to);
        put_string(&mut item, "photoPath", &self.photo_path);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Employee {
            employee_id: get_u32(item, "employeeID")?,
            last_name: get_string(item, "lastName")?,
            first_name: get_string(item, "firstName")?,
            title: get_string(item, "title")?,
            title_of_courtesy: get_string(item, "titleOfCourtesy")?,
            birth_date: get_string(item, "birthDate")?,
            hire_date: get_string(item, "hireDate")?,
            address: get_string(item, "address")?,
            city: get_string(item, "city")?,
            region: get_string(item, "region")?,
            postal_code: get_string(item, "postalCode")?,
            country: get_string(item, "country")?,
            home_phone: get_string(item, "homePhone")?,
            extension: get_string(item, "extension")?,
            photo: get_string(item, "photo")?,
            notes: get_string(item, "notes")?,
            reports_to: get_string(item, "reportsTo")?,
            photo_path: get_string(item, "photoPath")?,
        })
    }
}

// ============================================================================
// Order and OrderDetail
// ============================================================================

impl ItemCodec for Order {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "orderID", self.order_id);
        put_string(&mut item, "customerID", &self.customer_id);
        put_number(&mut item, "employeeID", self.employee_id);
        put_string(&mut item, "orderDate", &self.order_date);
        put_string(&mut item, "requiredDate", &self.required_date);
        put_string(&mut item, "shippedDate", &self.shipped_date);
        put_string(&mut item, "shipVia", &self.ship_via);
        put_string(&mut item, "freight", &self.freight);
        put_string(&mut item, "shipName", &self.ship_name);
        put_string(&mut item, "shipAddress", &self.ship_address);
        put_string(&mut item, "shipCity", &self.ship_city);
        put_string(&mut item, "shipRegion", &self.ship_region);
        put_string(&mut item, "shipPostalCode", &self.ship_postal_code);
        put_string(&mut item, "shipCountry", &self.ship_country);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Order {
            order_id: get_u32(item, "orderID")?,
            customer_id: get_string(item, "customerID")?,
            employee_id: get_u32(item, "employeeID")?,
            order_date: get_string(item, "orderDate")?,
            required_date: get_string(item, "requiredDate")?,
            shipped_date: get_string(item, "shippedDate")?,
            ship_via: get_string(item, "shipVia")?,
            freight: get_string(item, "freight")?,
            ship_name: get_string(item, "shipName")?,
            ship_address: get_string(item, "shipAddress")?,
            ship_city: get_string(item, "shipCity")?,
            ship_region: get_string(item, "shipRegion")?,
            ship_postal_code: get_string(item, "shipPostalCode")?,
            ship_country: get_string(item, "shipCountry")?,
        })
    }
}

impl ItemCodec for OrderDetail {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "orderID", self.order_id);
        put_number(&mut item, "productID", self.product_id);
        put_string(&mut item, "unitPrice", &self.unit_price);
        put_string(&mut item, "quantity", &self.quantity);
        put_string(&mut item, "discount", &self.discount);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(OrderDetail {
            order_id: get_u32(item, "orderID")?,
            product_id: get_u32(item, "productID")?,
            unit_price: get_string(item, "unitPrice")?,
            quantity: get_string(item, "quantity")?,
            discount: get_string(item, "discount")?,
        })
    }
}

// ============================================================================
// Product
// ============================================================================

impl ItemCodec for Product {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "productID", self.product_id);
        put_string(&mut item, "productName", &self.product_name);
        put_number(&mut item, "supplierID", self.supplier_id);
        put_number(&mut item, "categoryID", self.category_id);
        put_string(&mut item, "quantityPerUnit", &self.quantity_per_unit);
        put_string(&mut item, "unitPrice", &self.unit_price);
        put_string(&mut item, "unitsInStock", &self.units_in_stock);
        put_string(&mut item, "unitsOnOrder", &self.units_on_order);
        put_string(&mut item, "reorderLevel", &self.reorder_level);
        put_string(&mut item, "discontinued", &self.discontinued);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Product {
            product_id: get_u32(item, "productID")?,
            product_name: get_string(item, "productName")?,
            supplier_id: get_u32(item, "supplierID")?,
            category_id: get_u32(item, "categoryID")?,
            quantity_per_unit: get_string(item, "quantityPerUnit")?,
            unit_price: get_string(item, "unitPrice")?,
            units_in_stock: get_string(item, "unitsInStock")?,
            units_on_order: get_string(item, "unitsOnOrder")?,
            reorder_level: get_string(item, "reorderLevel")?,
            discontinued: get_string(item, "discontinued")?,
        })
    }
}

// ============================================================================
// Shipper and Supplier
// ============================================================================

impl ItemCodec for Shipper {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "shipperID", self.shipper_id);
        put_string(&mut item, "companyName", &self.company_name);
        put_string(&mut item, "phone", &self.phone);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Shipper {
            shipper_id: get_u32(item, "shipperID")?,
            company_name: get_string(item, "companyName")?,
            phone: get_string(item, "phone")?,
        })
    }
}

impl ItemCodec for Supplier {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put_number(&mut item, "supplierID", self.supplier_id);
        put_string(&mut item, "companyName", &self.company_name);
        put_string(&mut item, "contactName", &self.contact_name);
        put_string(&mut item, "contactTitle", &self.contact_title);
        put_string(&mut item, "address", &self.address);
        put_string(&mut item, "city", &self.city);
        put_string(&mut item, "region", &self.region);
        put_string(&mut item, "postalCode", &self.postal_code);
        put_string(&mut item, "country", &self.country);
        put_string(&mut item, "phone", &self.phone);
        put_string(&mut item, "fax", &self.fax);
        put_string(&mut item, "homePage", &self.home_page);
        item
    }

    fn from_item(item: &Item) -> Result<Self, FieldError> {
        Ok(Supplier {
            supplier_id: get_u32(item, "supplierID")?,
            company_name: get_string(item, "companyName")?,
            contact_name: get_string(item, "contactName")?,
            contact_title: get_string(item, "contactTitle")?,
            address: get_string(item, "address")?,
            city: get_string(item, "city")?,
            region: get_string(item, "region")?,
            postal_code: get_string(item, "postalCode")?,
            country: get_string(item, "country")?,
            phone: get_string(item, "phone")?,
            fax: get_string(item, "fax")?,
            home_page: get_string(item, "homePage")?,
        })
    }
}
