pub mod error;
pub mod constants;
pub mod config;
pub mod hints;
pub mod provider;
pub mod health;
pub mod router;
pub mod fallback;

// Re-export key types
pub use error::{Result, RouterError};
pub use config::Settings;
pub use hints::{RouteMode, RouteOptions, RoutingHints};
pub use provider::{Provider, ProviderBuilder, ProviderReply, ProviderRegistry, ProviderResult};
pub use health::{HealthMonitor, HealthRecord, HealthStatus, HealthTracker, SystemHealthReport};
pub use router::{Router, RouterResult};
pub use fallback::FallbackResponder;
