//! Offline indexing jobs

mod backfill;

pub use backfill::{run_backfill, BackfillOptions, BackfillReport};
