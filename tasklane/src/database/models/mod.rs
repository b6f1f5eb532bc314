pub mod user;
pub mod user_crypt;

pub use user::{Id as UserId, User};
pub use user_crypt::PasswordHash as UserPassword;

type Id = i32;
