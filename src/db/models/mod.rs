//! Database models split into domain-specific modules.

pub mod common;
pub mod employee;
pub mod evaluation;
pub mod question;
pub mod user;

pub use common::*;
pub use employee::*;
pub use evaluation::*;
pub use question::*;
pub use user::*;
