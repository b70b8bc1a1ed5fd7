pub mod catalog;
pub mod lesson;
pub mod membership;
pub mod user;

pub use catalog::*;
pub use lesson::*;
pub use membership::MembershipType;
pub use user::*;
