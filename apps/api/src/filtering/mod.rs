// Multi-criteria filter engine shared by every list endpoint.
// FilterSpec (validated input) -> compiler (storage / in-process rules) -> paginate.

pub mod compiler;
pub mod paginate;
pub mod rule;
pub mod spec;
pub mod sql;

pub use compiler::compile;
pub use paginate::{paginate, Page, PaginationState};
pub use rule::{matches_all, FilterRule, Filterable};
pub use spec::{AppliedFilters, FilterSpec, ListQuery};
