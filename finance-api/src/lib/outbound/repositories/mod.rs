pub mod memory;
pub mod user;

pub use memory::InMemoryUserDirectory;
pub use user::PostgresUserDirectory;
