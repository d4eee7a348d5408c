pub mod http;
pub mod provider;
pub mod search;
pub mod types;
