mod error;
mod traits;
mod types;

pub use error::{BackendError, FieldError, Result, StoreError};
pub use traits::CatalogRepository;
pub use types::{KeyQuery, RangeCondition};
