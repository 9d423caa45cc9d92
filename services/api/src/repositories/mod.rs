//! Data access for users and their stored platform credentials

mod credential;
mod user;

pub use credential::CredentialRepository;
pub use user::UserRepository;
