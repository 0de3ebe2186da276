pub mod bignum;
pub mod config;
pub mod error;
pub mod signals;
pub mod types;

pub use bignum::BigNumber;
pub use error::{LichError, Result};
