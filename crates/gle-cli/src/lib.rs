//! # gle-cli
//!
//! Command-line front end for [`gle_query`].
//!
//! The `gle` binary takes a log name, a LEQL statement and a UTC time
//! window, runs the query and streams the matching events to stdout:
//!
//! ```text
//! ┌───────┐  SearchRequest  ┌───────────┐   HTTPS    ┌──────────────────┐
//! │  gle  │────────────────►│ gle-query │◄──────────►│ Logentries REST  │
//! └───┬───┘                 └─────┬─────┘            └──────────────────┘
//!     │ stdout (text/json)        │ events
//!     ◄───────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod error;
pub mod output;

pub use cli::{Cli, Format};
pub use error::CliError;
pub use output::{JsonLinesWriter, OutputFormat};
