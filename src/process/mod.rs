//! External command execution with deadlines, retries, and typed failures.
//!
//! Speech synthesis, noise generation, mixing, and muxing all go through [`CommandRunner`].

mod runner;

pub use runner::{
    CommandError, CommandOutput, CommandPolicy, CommandRunner, ExternalCommand, SystemRunner,
    is_on_path,
};
