pub mod authorizer;
pub mod claims;
pub mod factory;
pub mod policy;

pub use authorizer::{AuthorizeError, Authorizer, AuthorizerOptions};
pub use factory::build_authorizer;
pub use policy::{Effect, PolicyDocument};
