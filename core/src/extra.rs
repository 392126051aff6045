//! Positional and remainder capture for schemas that opt in.
//!
//! A schema that wants leftover positional tokens and the verbatim tokens
//! after a `--` separator embeds an [`ExtraArgs`] slot and implements
//! [`ExtraArgsCapable`]. Schemas that do not opt in have no such accessors.
//!
//! # Examples
//!
//! ```
//! use autocli_core::{ExtraArgs, ExtraArgsCapable};
//!
//! let extra = ExtraArgs::new(
//!     vec!["PARAM1".into()],
//!     vec!["nested-cmd".into(), "--param".into(), "123".into()],
//! );
//! assert_eq!(extra.get_positional(), ["PARAM1"]);
//! assert_eq!(extra.get_remainder(), "nested-cmd --param 123");
//! ```

/// Tokens captured outside the flag namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraArgs {
    positional: Vec<String>,
    remainder: Vec<String>,
}

impl ExtraArgs {
    pub fn new(positional: Vec<String>, remainder: Vec<String>) -> Self {
        Self {
            positional,
            remainder,
        }
    }
}

/// Accessors for captured tokens.
///
/// Implementors only provide [`extra_args`](Self::extra_args); the getters
/// are derived from it.
pub trait ExtraArgsCapable {
    fn extra_args(&self) -> &ExtraArgs;

    /// Leftover non-flag tokens before the separator, in order.
    ///
    /// Always empty for the default command.
    fn get_positional(&self) -> &[String] {
        &self.extra_args().positional
    }

    /// Tokens after the separator, verbatim.
    fn get_remainder_list(&self) -> &[String] {
        &self.extra_args().remainder
    }

    /// Remainder tokens joined with single spaces; empty if none.
    fn get_remainder(&self) -> String {
        self.get_remainder_list().join(" ")
    }
}

impl ExtraArgsCapable for ExtraArgs {
    fn extra_args(&self) -> &ExtraArgs {
        self
    }
}
