// Jobseeker profiles: filtered listing, verification lifecycle, employee codes.

pub mod employee_code;
pub mod handlers;
pub mod listing;
pub mod store;
pub mod verification;

pub use store::{PgProfileStore, ProfileStore};
