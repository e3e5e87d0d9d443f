// hobaa-api: HTTP access to the sources Hobaa consults during identity
// resolution and icon provisioning.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{HobaaClient, catalog_icon_url};
pub use error::Error;
pub use models::RemoteSite;
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
