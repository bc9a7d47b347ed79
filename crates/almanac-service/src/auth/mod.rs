//! Authentication.
//!
//! ## Module Organization
//!
//! - `account`: Registration, login and logout
//! - `authenticate`: Request authentication (single user, bearer token)
//! - `depot`: Helpers for reading the authenticated user from Salvo's depot
//! - `password`: Password hashing and verification with Argon2
//! - `token`: Random secret generation and token digests

pub mod account;
pub mod authenticate;
pub mod depot;
pub mod password;
pub mod token;

pub use account::{IssuedToken, LoginInput, RegisterInput, login, logout, register};
pub use authenticate::{Authenticated, authenticate};
pub use depot::{depot_keys, get_token_id_from_depot, get_user_from_depot};
