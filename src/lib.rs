pub mod error;
pub mod logging;
pub mod tracker;
pub mod utility;

pub use error::FetchError;
