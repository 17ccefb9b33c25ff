//! Value Objects - Immutable, identity-less domain primitives

mod region;
mod user_id;

pub use region::Region;
pub use user_id::UserId;
