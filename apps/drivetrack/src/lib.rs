//! # drivetrack (library)
//!
//! Library surface of the Drivetrack binary: the HTTP API, the CLI, and
//! the mail dispatcher. Exposed as a lib so the integration tests can
//! drive the router directly via `drivetrack::api::*`.

pub mod api;
pub mod cli;
pub mod mail;
