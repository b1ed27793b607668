//! Session token storage adapters.

mod keyring_storage;

pub use keyring_storage::KeyringTokenStorage;
