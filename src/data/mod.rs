//! Data module - CSV loading, cleaning and transformation

mod cleaner;
pub mod columns;
mod loader;
mod transformer;

pub use cleaner::{CleanReport, Cleaner, NumericFill};
pub use loader::{
    DataLoader, LoadOptions, LoaderError, get_columns, get_numeric_columns, is_numeric_dtype,
};
pub use transformer::{Transformer, study_efficiency, total_leisure_hours};
