//! `hexarc-cli` - Command-line entry point and sample service for hexarc
//!
//! This crate holds the `hexarc` binary's CLI surface plus the bundled
//! lamp service it deploys, a minimal but complete example of the
//! port / model / adapter pattern.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod lamp;
