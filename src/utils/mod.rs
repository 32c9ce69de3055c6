pub mod cookie;
pub mod password;
pub mod token;

pub use cookie::{extract_cookie, CookieSettings, SESSION_COOKIE};
pub use password::CredentialStore;
pub use token::{Claims, TokenCodec};
