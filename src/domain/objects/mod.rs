mod notice;
mod interaction;
mod user;

pub use notice::*;
pub use interaction::*;
pub use user::*;
