/// Authentication module
///
/// Password hashing, session token issuance/verification, the token cookie
/// and the authorization policy for user resources.

mod claims;
pub mod cookie;
mod jwt;
mod password;
pub mod policy;

pub use claims::Claims;
pub use jwt::TokenService;
pub use password::{hash_password, verify_password, HASH_COST};
pub use policy::{authorize, Operation};
