//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod env;
pub mod errors;
pub mod fs;
pub mod hash;
pub mod shell;

pub use config::Config;
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use env::{EnvLookup, ProcessEnv};
pub use errors::ErrorList;
pub use hash::Fingerprint;
pub use shell::{ColorChoice, Shell, Status};
