pub mod config;
pub mod error;
pub mod types;
pub mod weights;

pub use config::ParleyConfig;
pub use error::{ParleyError, Result};
pub use types::UserInfo;
pub use weights::WeightSet;

/// Version code of the action API.
///
/// Action packages declare the minimum code they were written against; packages
/// requiring a newer code than this one are refused at registration.
pub const LIBRARY_VERSION: u32 = 3;
