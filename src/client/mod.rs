pub mod client;
pub mod credentials;

pub use client::AnnotateClient;
pub use credentials::Credentials;
