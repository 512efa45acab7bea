mod auth;
mod license;
mod plan;
mod usage;
mod user;

pub use auth::*;
pub use license::*;
pub use plan::*;
pub use usage::*;
pub use user::*;
