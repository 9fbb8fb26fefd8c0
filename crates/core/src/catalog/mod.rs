mod types;

pub use types::{
    Category, Customer, Employee, Entity, EntityKind, Order, OrderDetail, Product, Shipper,
    Supplier,
};
