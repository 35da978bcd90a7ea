//! PostgreSQL implementations of the storage traits.

pub mod credential;
pub mod job;
pub mod shop;

pub use credential::CredentialRepository;
pub use job::JobRepository;
pub use shop::ShopRepository;
