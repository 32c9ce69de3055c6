pub mod identity;
pub mod security;

pub use identity::{identity_middleware, session_token};
pub use security::{security_headers_middleware, SecurityHeaders};
