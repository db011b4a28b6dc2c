//! Authentication and authorization
//!
//! JWT token service, argon2 password hashing, the request
//! authentication middleware, and the store-staff extractor.

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use extractor::{BearerToken, StoreStaff};
pub use jwt::{Claims, CurrentUser, InviteClaims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
