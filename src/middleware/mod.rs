pub mod access;
pub mod auth;

pub use access::{AccessDecision, AccessPolicy, PathClass, Principal};
pub use auth::{access_control_middleware, AccessGate, Session};
