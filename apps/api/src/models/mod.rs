pub mod candidate;
pub mod profile;

pub use candidate::Candidate;
pub use profile::{JobseekerProfile, VerificationStatus};
