//! Declarative command-line applications.
//!
//! An application registers one handler per command. Each handler's argument
//! type is an [`ArgsSchema`]: its fields become flags, and parsed values are
//! validated back into the schema type before the handler runs.
//!
//! ```text
//! prog greet --name Ada --count 2        # runs the `greet` handler
//! prog greet --help                      # help for one command
//! prog --name Ada                        # runs `run_default`, if registered
//! prog file-ops a.txt -- --raw tokens    # positional and remainder capture
//! ```
//!
//! Schemas are resolved in order:
//!
//! 1. the handler's declared argument type ([`CliBuilder::command`]);
//! 2. a schema registered with [`CliBuilder::schema`] whose name follows the
//!    command (`FileOpsArgs` for `file_ops`, then `CustomArgs`);
//! 3. the common schema ([`CliBuilder::common`]).
//!
//! Handler results map to exit codes through [`IntoOutcome`].
//!
//! # Example
//!
//! ```
//! use autocli::{AutoCli, CliConfig};
//! use autocli_core::{ArgsSchema, FieldDescriptor, ValueKind, param};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct GreetArgs {
//!     name: String,
//!     count: i64,
//! }
//!
//! impl ArgsSchema for GreetArgs {
//!     const NAME: &'static str = "GreetArgs";
//!
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             param("name", ValueKind::String, "World"),
//!             param("count", ValueKind::Integer, 1),
//!         ]
//!     }
//! }
//!
//! let mut cli = AutoCli::builder(Vec::<String>::new())
//!     .config(CliConfig::quiet())
//!     .output(std::io::sink())
//!     .command("run_greet", |greetings: &mut Vec<String>, args: GreetArgs| {
//!         for _ in 0..args.count {
//!             greetings.push(format!("Hello, {}!", args.name));
//!         }
//!         true
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(cli.dispatch(["prog", "greet", "--name", "Ada", "--count", "2"]), 0);
//! assert_eq!(cli.state().len(), 2);
//! ```

mod args;
mod compile;
mod config;
mod console;
mod dispatch;
mod error;
mod handler;
mod help;
mod outcome;
mod registry;
mod resolve;

pub use args::{DynArgs, PreparedArgs};
pub use compile::{Arity, CompiledFlag, CompiledSchema, compile};
pub use config::{CliConfig, ConfigFileError, QUIET_ENV};
pub use dispatch::{AutoCli, ParsedInvocation};
pub use error::{DispatchError, ValidationError};
pub use handler::HandlerFuture;
pub use outcome::{IntoOutcome, Outcome};
pub use registry::{CliBuilder, CommandSpec, PrepareHook, Registry};
pub use resolve::{ErasedSchema, Resolution, SchemaCatalog, SchemaSource, resolve_schema};
