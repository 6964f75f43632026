pub mod account;
pub mod auth;
pub mod common;
pub mod plan;
pub mod profile;
pub mod subscription;
pub mod ticket;
pub mod transaction;
pub mod usage;

pub use account::*;
pub use auth::*;
pub use common::*;
pub use plan::*;
pub use profile::*;
pub use subscription::*;
pub use ticket::*;
pub use transaction::*;
pub use usage::*;
