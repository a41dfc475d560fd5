pub mod config;
pub mod conn;
pub mod protocol;
pub mod registry;
pub mod server;

pub use config::Config;
pub use registry::ClientRegistry;
pub use server::Server;
