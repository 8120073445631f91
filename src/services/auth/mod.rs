pub mod claims;
pub mod gate;
pub mod key;

#[cfg(test)]
pub mod testing;

pub use claims::Claims;
pub use gate::{AuthError, AuthGate};
pub use key::PublicKeyError;
