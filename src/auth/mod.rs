//! Authentication: password hashing, token issuing, request extraction.

pub mod extract;
pub mod password;
pub mod token;

pub use extract::{AuthError, AuthUser};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};
