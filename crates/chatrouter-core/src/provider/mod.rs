mod traits;
mod builder;
pub mod registry;

pub use traits::*;
pub use builder::{CanHandleFn, FnProvider, ProcessFn, ProviderBuilder};
pub use registry::{CuratedSets, ProviderRegistry};
