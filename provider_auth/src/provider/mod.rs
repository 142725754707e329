mod config;
mod errors;
mod loader;
mod registry;
mod resolve;
mod types;

pub use config::{ProviderConfig, RouteConfig, RouteOptions};
pub use errors::ProviderError;
pub use loader::{LoadedProviders, load_provider_configs};
pub use registry::{ProviderRegistry, ProviderRegistryBuilder};
pub use resolve::resolve;
pub use types::{
    BodyParser, CookieSpec, HttpMethod, ProviderSummary, ResolvedProvider, RouteSpec,
};
