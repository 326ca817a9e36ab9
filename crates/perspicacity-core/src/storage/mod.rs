//! Local persistent storage

pub mod credentials;

pub use credentials::{CredentialKey, CredentialStore, Credentials};
