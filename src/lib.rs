// Main library file for the travel guide data core

// Export modules for each component
pub mod controller;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod notify;
pub mod render;
pub mod retry;
pub mod store;

// Re-export key types for convenience
pub use controller::{DestinationsPage, FilterEvent};
pub use fetch::{DataFetcher, FetchError, HttpFetcher};
pub use filter::{filter_and_sort, filter_provinces, FilterState, SortKey};
pub use models::{Contact, Coordinates, Destination, EntranceFee, Province, Region};
pub use notify::{ErrorLog, Notify, Severity, TracingNotifier};
pub use render::{DestinationGrid, RenderSurface, StringSurface};
pub use retry::{with_retry, Fallback, RetryOptions, RetryPolicy};
pub use store::{DataStore, GuideData, LoadError, StoreConfig};
