pub mod credentials;
pub mod source;
pub mod store;
pub mod token;

pub use credentials::{AppCredentials, Credentials};
pub use source::{CredentialSource, EnvSource, FileSource, HybridSource};
pub use token::{TokenPair, TokenResponse};
