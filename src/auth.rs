//! Auth-domain identifiers, secrets, and cached credentials.

pub mod code;
pub mod credential;
pub mod secret;

pub use code::*;
pub use credential::*;
pub use secret::*;
