//! HTTP collaborators: the juso.go.kr road-address API and the building
//! registry hub on apis.data.go.kr.

mod config;
pub use config::ClientConfig;

#[cfg(feature = "http")]
mod error;
#[cfg(feature = "http")]
pub mod juso;
#[cfg(feature = "http")]
pub mod registry;
#[cfg(feature = "http")]
pub mod xml;

#[cfg(feature = "http")]
pub use error::ClientError;
#[cfg(feature = "http")]
pub use juso::JusoClient;
#[cfg(feature = "http")]
pub use registry::RegistryClient;
