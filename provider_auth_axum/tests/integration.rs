/// Integration tests for provider-auth-axum
///
/// These tests run the provider routes on a real listener with a fake
/// identity provider strategy and in-memory stores.
mod common;

mod integration {
    pub mod link_flows;
    pub mod listing;
    pub mod login_flows;
}
