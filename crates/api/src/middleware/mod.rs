//! Request middleware and extractors.

pub mod identity;

pub use identity::{Caller, ROLES_HEADER, USER_HEADER, identity_middleware};
