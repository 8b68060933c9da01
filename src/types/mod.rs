//! Type definitions for healthlog

mod error;
mod record;
mod summary;
mod user;

pub use error::*;
pub use record::*;
pub use summary::*;
pub use user::*;
