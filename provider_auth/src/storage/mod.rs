mod identities;
mod sessions;
mod tokens;

pub use identities::InMemoryIdentityStore;
pub use sessions::InMemorySessionManager;
pub use tokens::InMemoryTokenStore;
