pub mod filter;
pub mod guards;
pub mod similarity;
pub mod statistics;
pub mod timestamps;
pub mod views;

pub use filter::{apply_filter, matches, CompiledFilter};
pub use similarity::{build_groups, filter_groups, group_similar};
pub use statistics::{aggregate, aggregate_all};
