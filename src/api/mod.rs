pub mod basic_auth;
pub mod client;
pub mod endpoint;
pub mod response;

pub use client::EnphaseApi;
pub use endpoint::{Endpoints, SystemResource};
