pub mod pool;
pub mod queries;

pub use pool::create_pool;
pub use queries::{list_request_positions, PgRequestSource};
