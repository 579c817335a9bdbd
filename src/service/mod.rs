pub mod cache;
pub mod comparator;
pub mod export;
pub mod ingest;
pub mod normalizer;
pub mod reconcile;
pub mod source;

pub use cache::TimedCache;
pub use comparator::{classify, compare};
pub use export::{read_table_csv, table_to_csv, write_table_csv, EXPORT_HEADER};
pub use ingest::{decode_upload, sniff_delimiter};
pub use normalizer::{normalize_offer, normalize_request, OfferFormat};
pub use reconcile::{ReconciliationService, DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL};
pub use source::{RequestFilter, RequestSource};
