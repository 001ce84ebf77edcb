//! Core traits for the lexicon webhook
//!
//! This module defines the abstract interfaces at the solver's I/O seams.
//!
//! - [`SecretStore`]: Read provider credentials from a namespaced store
//! - [`CommandRunner`]: Run external programs (lexicon) with a deadline

pub mod secret_store;
pub mod command_runner;

pub use secret_store::{SecretStore, SecretData};
pub use command_runner::{CommandRunner, CommandInvocation, CommandOutput};
