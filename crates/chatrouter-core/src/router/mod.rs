mod core;
mod result;

pub use self::core::Router;
pub use result::{Attempt, RouteMetadata, RouterResult};
