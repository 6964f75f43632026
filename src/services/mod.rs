pub mod auth_service;
pub mod plan_service;
pub mod profile_service;
pub mod subscription_service;
pub mod ticket_service;
pub mod transaction_service;
pub mod usage_service;

pub use auth_service::*;
pub use plan_service::*;
pub use profile_service::*;
pub use subscription_service::*;
pub use ticket_service::*;
pub use transaction_service::*;
pub use usage_service::*;
