pub mod client;
pub mod connection;
pub mod executor;
pub mod queries;
pub mod types;

mod provider;

pub use provider::SqlServerProvider;
