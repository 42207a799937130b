pub mod issue;
pub mod property;
pub mod user;
pub mod workflow;

pub use issue::*;
pub use property::*;
pub use user::*;
pub use workflow::*;
