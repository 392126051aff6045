//! Core schema types for declarative command-line applications.
//!
//! This crate defines the data model every command schema is described
//! with:
//!
//! - [`ArgsSchema`]: trait implemented by a command's argument struct.
//! - [`FieldDescriptor`]: one field with its type, default and flag
//!   aliases.
//! - [`SchemaDescriptor`]: a schema detached from its Rust type.
//! - [`ExtraArgs`] / [`ExtraArgsCapable`]: opt-in capture of positional and
//!   remainder tokens.
//!
//! Validation ([`validate_fields`]) catches reserved, duplicate and
//! malformed flags before a CLI is built. Naming helpers
//! ([`command_name`], [`convention_names`]) implement the `run_<command>`
//! and `<Command>Args` conventions.
//!
//! # Example
//!
//! ```
//! use autocli_core::*;
//!
//! let fields = vec![
//!     param("name", ValueKind::String, "World").short("-n"),
//!     FieldDescriptor::new("filename", ValueKind::String).long("--file"),
//! ];
//!
//! assert!(validate_fields(&fields).is_empty());
//! assert_eq!(fields[1].long_flag(), "--file");
//! assert!(fields[1].required());
//! assert_eq!(convention_names("greet")[0], "GreetArgs");
//! ```

mod extra;
mod naming;
mod types;
mod validate;

pub use extra::{ExtraArgs, ExtraArgsCapable};
pub use naming::{
    CUSTOM_ARGS, DEFAULT_COMMAND, command_name, convention_names, snake_to_kebab, snake_to_pascal,
};
pub use types::*;
pub use validate::{ConfigError, validate_fields};
