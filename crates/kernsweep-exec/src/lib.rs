//! kernsweep-exec: Command execution abstraction
//!
//! Provides the executor trait and a local implementation that spawns host
//! processes without a shell

pub mod command;
pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use command::CommandLine;
pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
