//! Normalization and validation: dates, amounts, derived attributes,
//! balance-chain checks, accuracy scoring and statement metrics.

pub mod amounts;
pub mod dates;
pub mod enrich;
pub mod metrics;
pub mod score;
pub mod validate;

pub use amounts::{parse_amount, scan_amount};
pub use dates::normalise_date;
pub use enrich::enrich_all;
pub use metrics::compute_metrics;
pub use score::compute_accuracy;
pub use validate::{quick_chain_score, validate_balance_chain};
