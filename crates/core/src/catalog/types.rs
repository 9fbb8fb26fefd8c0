use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight entity kinds stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Category,
    Customer,
    Employee,
    Order,
    OrderDetail,
    Product,
    Shipper,
    Supplier,
}

impl EntityKind {
    /// All kinds, in bulk load order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Category,
        EntityKind::Customer,
        EntityKind::Employee,
        EntityKind::OrderDetail,
        EntityKind::Order,
        EntityKind::Product,
        EntityKind::Shipper,
        EntityKind::Supplier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "Category",
            EntityKind::Customer => "Customer",
            EntityKind::Employee => "Employee",
            EntityKind::Order => "Order",
            EntityKind::OrderDetail => "OrderDetail",
            EntityKind::Product => "Product",
            EntityKind::Shipper => "Shipper",
            EntityKind::Supplier => "Supplier",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common identity of every catalog entity.
pub trait Entity {
    const KIND: EntityKind;

    /// Name of the field used to identify a record in log output.
    const LABEL_FIELD: &'static str;

    /// The entity's own identifier, rendered as a string.
    fn id(&self) -> String;

    /// Value of [`Entity::LABEL_FIELD`] for this record.
    fn label(&self) -> String;
}

/// A product category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "categoryID")]
    pub category_id: u32,
    pub category_name: String,
    pub description: String,
    pub picture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "customerID")]
    pub customer_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub contact_title: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub fax: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "employeeID")]
    pub employee_id: u32,
    pub last_name: String,
    pub first_name: String,
    pub title: String,
    pub title_of_courtesy: String,
    pub birth_date: String,
    pub hire_date: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub home_phone: String,
    pub extension: String,
    pub photo: String,
    pub notes: String,
    /// Identifier of the manager, kept verbatim (may be empty or `NULL`).
    pub reports_to: String,
    pub photo_path: String,
}

/// One line of an order: a product, its price and quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(rename = "orderID")]
    pub order_id: u32,
    #[serde(rename = "productID")]
    pub product_id: u32,
    pub unit_price: String,
    pub quantity: String,
    pub discount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderID")]
    pub order_id: u32,
    #[serde(rename = "customerID")]
    pub customer_id: String,
    #[serde(rename = "employeeID")]
    pub employee_id: u32,
    pub order_date: String,
    pub required_date: String,
    pub shipped_date: String,
    pub ship_via: String,
    pub freight: String,
    pub ship_name: String,
    pub ship_address: String,
    pub ship_city: String,
    pub ship_region: String,
    pub ship_postal_code: String,
    pub ship_country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productID")]
    pub product_id: u32,
    pub product_name: String,
    #[serde(rename = "supplierID")]
    pub supplier_id: u32,
    #[serde(rename = "categoryID")]
    pub category_id: u32,
    pub quantity_per_unit: String,
    pub unit_price: String,
    pub units_in_stock: String,
    pub units_on_order: String,
    pub reorder_level: String,
    /// `"1"` marks a discontinued product; any other value means active.
    pub discontinued: String,
}

impl Product {
    /// Sentinel stored in `discontinued` for discontinued products.
    pub const DISCONTINUED: &'static str = "1";

    pub fn is_discontinued(&self) -> bool {
        self.discontinued == Self::DISCONTINUED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipper {
    #[serde(rename = "shipperID")]
    pub shipper_id: u32,
    pub company_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(rename = "supplierID")]
    pub supplier_id: u32,
    pub company_name: String,
    pub contact_name: String,
    pub contact_title: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub fax: String,
    pub home_page: String,
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;
    const LABEL_FIELD: &'static str = "category_name";

    fn id(&self) -> String {
        self.category_id.to_string()
    }

    fn label(&self) -> String {
        self.category_name.clone()
    }
}

impl Entity for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    const LABEL_FIELD: &'static str = "company_name";

    fn id(&self) -> String {
        self.customer_id.clone()
    }

    fn label(&self) -> String {
        self.company_name.clone()
    }
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;
    const LABEL_FIELD: &'static str = "first_name";

    fn id(&self) -> String {
        self.employee_id.to_string()
    }

    fn label(&self) -> String {
        self.first_name.clone()
    }
}

impl Entity for OrderDetail {
    const KIND: EntityKind = EntityKind::OrderDetail;
    const LABEL_FIELD: &'static str = "order_id";

    fn id(&self) -> String {
        format!("{}/{}", self.order_id, self.product_id)
    }

    fn label(&self) -> String {
        self.order_id.to_string()
    }
}

impl Entity for Order {
    const KIND: EntityKind = EntityKind::Order;
    const LABEL_FIELD: &'static str = "order_id";

    fn id(&self) -> String {
        self.order_id.to_string()
    }

    fn label(&self) -> String {
        self.order_id.to_string()
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;
    const LABEL_FIELD: &'static str = "product_name";

    fn id(&self) -> String {
        self.product_id.to_string()
    }

    fn label(&self) -> String {
        self.product_name.clone()
    }
}

impl Entity for Shipper {
    const KIND: EntityKind = EntityKind::Shipper;
    const LABEL_FIELD: &'static str = "company_name";

    fn id(&self) -> String {
        self.shipper_id.to_string()
    }

    fn label(&self) -> String {
        self.company_name.clone()
    }
}

impl Entity for Supplier {
    const KIND: EntityKind = EntityKind::Supplier;
    const LABEL_FIELD: &'static str = "company_name";

    fn id(&self) -> String {
        self.supplier_id.to_string()
    }

    fn label(&self) -> String {
        self.company_name.clone()
    }
}
