pub mod classify;
pub mod dispatch;
pub mod endpoints;
pub mod error;
pub mod service;

pub use classify::*;
pub use dispatch::*;
pub use endpoints::*;
pub use error::*;
pub use service::*;
