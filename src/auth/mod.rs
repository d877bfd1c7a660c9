/// Authentication module
///
/// Password hashing, access tokens, refresh tokens, authorization header
/// parsing, and the session flows that combine them.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::Claims;
pub use credentials::{
    api_keys_match, authorization_header, extract_api_key, extract_bearer, API_KEY_SCHEME,
    BEARER_SCHEME,
};
pub use jwt::AccessTokenSigner;
pub use password::{hash_password, verify_password};
pub use refresh_token::{generate_refresh_token, RefreshTokenManager};
pub use session::{bearer_token, LoginOutcome, SessionService};
