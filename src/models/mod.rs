pub mod line_item;
pub mod mapping;
pub mod offer;
pub mod reconciliation;

pub use line_item::LineItem;
pub use mapping::CanonicalMapping;
pub use offer::{DropReason, NormalizedOffer, RowCoercionWarning};
pub use reconciliation::{
    ReconciliationReport, ReconciliationRow, ReconciliationStatus, ReconciliationSummary,
    ReconciliationTable, UnknownStatus,
};
