mod id_generator;
mod store;

pub use id_generator::{IdGenerator, UuidV7Generator};
pub use store::{CallOptions, Collection, Connector, Credentials, StoreClient};
