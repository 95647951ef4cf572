pub mod argon2;
pub mod complexity;
pub mod errors;

pub use argon2::PasswordHasher;
pub use complexity::has_complexity;
pub use errors::PasswordError;
