// Models module

pub mod user;

pub use user::{CreateUserRequest, User};
