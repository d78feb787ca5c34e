mod client;
mod errors;
mod resource;
pub mod user_agent;
pub use self::client::Client;
pub use self::errors::Error;
pub use self::resource::{Resource, WAGO_BUILD};
