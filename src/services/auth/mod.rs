pub mod claims;
pub mod clock;
pub mod factory;
pub mod gate;
pub mod identity;
pub mod token_service;

pub use factory::build_token_service;
pub use gate::{AccessDenied, AccessGate, Guarded};
pub use identity::{Identity, Role, UserId, UserLookup};
pub use token_service::{ConfigurationError, TokenError, TokenService};
