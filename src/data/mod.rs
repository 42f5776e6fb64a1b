//! Data module - survey CSV loading and field normalization

mod cache;
mod loader;
mod normalizer;

pub use cache::CachedLoader;
pub use loader::{load, LoaderError, ResponseTable};
pub use normalizer::{DerivedSeries, FieldNormalizer, TextSeries, MISSING_LABEL};
