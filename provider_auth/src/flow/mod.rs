mod controller;
mod errors;
mod token;
mod types;

pub use controller::{FlowContext, FlowController};
pub use errors::FlowError;
pub use token::{ACCESS_TOKEN_COOKIE, USER_ID_COOKIE};
pub use types::{AUTHENTICATION_FAILED, AuthFailure, FlowBody, FlowOutcome, FlowResponse};
