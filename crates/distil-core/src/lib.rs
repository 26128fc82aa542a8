pub mod config_manager;
pub mod error;
pub mod readability;
pub mod traits;
pub mod types;

pub use config_manager::*;
pub use error::*;
pub use readability::*;
pub use traits::*;
pub use types::*;
