pub mod schema;
pub mod store;

pub use store::{clear, connect, CacheLocation, Store};
