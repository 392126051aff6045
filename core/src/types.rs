//! Schema type definitions for command argument modeling.
//!
//! This module defines the data model that describes one command's accepted
//! arguments: the value kinds a field can hold, the per-field descriptor
//! (defaults, flag aliases, choices, help text), and the [`ArgsSchema`] trait
//! a struct implements to expose its descriptors to the flag compiler.

use std::any::TypeId;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::extra::ExtraArgs;

/// Long flag reserved for help on every command.
pub const HELP_FLAG: &str = "--help";

/// Field name reserved because it would shadow [`HELP_FLAG`].
pub const HELP_FIELD: &str = "help";

/// Parser identifier reserved for captured positional tokens.
pub const POSITIONAL_ID: &str = "__positional";

/// Scalar element type of a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Text value.
    String,
    /// Signed integer (parsed as `i64`).
    Integer,
    /// Floating point number (parsed as `f64`).
    Float,
}

impl Primitive {
    /// Value name shown in help for a required value of this type.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "number",
        }
    }
}

/// Declared type of a schema field.
///
/// # Examples
///
/// ```
/// use autocli_core::{Primitive, ValueKind};
///
/// assert!(ValueKind::Boolean.is_boolean());
/// assert_eq!(ValueKind::List(Primitive::Integer).primitive(), Some(Primitive::Integer));
/// assert_eq!(ValueKind::Boolean.primitive(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Single text value.
    String,
    /// Single integer value.
    Integer,
    /// Single floating point value.
    Float,
    /// Presence flag; never takes a value token.
    Boolean,
    /// One or more values of the given primitive type.
    List(Primitive),
}

impl ValueKind {
    /// Returns the element type for scalar and list kinds, `None` for booleans.
    pub fn primitive(self) -> Option<Primitive> {
        match self {
            Self::String => Some(Primitive::String),
            Self::Integer => Some(Primitive::Integer),
            Self::Float => Some(Primitive::Float),
            Self::Boolean => None,
            Self::List(p) => Some(p),
        }
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }

    pub fn is_list(self) -> bool {
        matches!(self, Self::List(_))
    }
}

/// Descriptor for one schema field.
///
/// A field without a default is required. The long flag defaults to the
/// field name with underscores turned into hyphens; an explicit alias
/// replaces it. Short flags are only used when declared.
///
/// Use [`FieldDescriptor::new`] and chain builder methods, or the [`param`]
/// shorthand when a default is known up front.
///
/// # Examples
///
/// ```
/// use autocli_core::{FieldDescriptor, ValueKind};
///
/// let name = FieldDescriptor::new("user_name", ValueKind::String).default("World");
/// assert_eq!(name.long_flag(), "--user-name");
/// assert!(!name.required());
///
/// let file = FieldDescriptor::new("filename", ValueKind::String)
///     .long("--file")
///     .short("-f");
/// assert_eq!(file.long_flag(), "--file");
/// assert_eq!(file.flag_id(), "file");
/// assert!(file.required());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name as it appears in the schema struct.
    pub name: String,
    /// Declared value type.
    pub kind: ValueKind,
    /// Default value; `None` makes the field required.
    pub default: Option<Value>,
    /// Explicit long alias (e.g. `"--file"`).
    pub long: Option<String>,
    /// Explicit short form (e.g. `"-f"`).
    pub short: Option<String>,
    /// Accepted textual values, checked during flag parsing.
    pub choices: Option<Vec<String>>,
    /// Help text.
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            long: None,
            short: None,
            choices: None,
            description: None,
        }
    }

    /// Sets the default value, making the field optional.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets an explicit long alias.
    pub fn long(mut self, flag: impl Into<String>) -> Self {
        self.long = Some(flag.into());
        self
    }

    /// Sets an explicit short flag.
    pub fn short(mut self, flag: impl Into<String>) -> Self {
        self.short = Some(flag.into());
        self
    }

    /// Restricts accepted values to `choices`.
    pub fn choices<I, T>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Adds help text.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn required(&self) -> bool {
        self.default.is_none()
    }

    /// Returns the long flag used on the command line.
    pub fn long_flag(&self) -> String {
        match &self.long {
            Some(alias) => alias.clone(),
            None => format!("--{}", self.name.replace('_', "-")),
        }
    }

    /// Returns the identifier the flag parser reports values under.
    ///
    /// This is the long flag without dashes, hyphens turned back into
    /// underscores. It equals [`name`](Self::name) unless an alias is set.
    pub fn flag_id(&self) -> String {
        self.long_flag().trim_start_matches('-').replace('-', "_")
    }

    /// Returns the default rendered for display in help output.
    pub fn default_display(&self) -> Option<String> {
        self.default.as_ref().map(display_value)
    }
}

/// Shorthand for a field with a default value.
///
/// # Examples
///
/// ```
/// use autocli_core::{param, ValueKind};
///
/// let count = param("count", ValueKind::Integer, 1).short("-c");
/// assert_eq!(count.default, Some(serde_json::json!(1)));
/// assert_eq!(count.short.as_deref(), Some("-c"));
/// ```
pub fn param(name: impl Into<String>, kind: ValueKind, default: impl Into<Value>) -> FieldDescriptor {
    FieldDescriptor::new(name, kind).default(default)
}

/// Renders a JSON value the way it is shown on the console.
///
/// Strings are printed without quotes; everything else uses JSON notation.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A struct usable as a command's argument schema.
///
/// Implementors describe their fields through [`fields`](Self::fields) and
/// are re-hydrated from parsed flag values with `serde`. Field names in the
/// descriptors must match the serde field names.
///
/// Schemas that capture positional and remainder tokens set
/// [`CAPTURES_EXTRA`](Self::CAPTURES_EXTRA), hold an [`ExtraArgs`] slot
/// (marked `#[serde(skip)]`), return it from
/// [`extra_args_mut`](Self::extra_args_mut), and implement
/// [`ExtraArgsCapable`](crate::ExtraArgsCapable).
///
/// # Examples
///
/// ```
/// use autocli_core::{ArgsSchema, FieldDescriptor, ValueKind, param};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct GreetArgs {
///     name: String,
///     count: i64,
/// }
///
/// impl ArgsSchema for GreetArgs {
///     const NAME: &'static str = "GreetArgs";
///
///     fn fields() -> Vec<FieldDescriptor> {
///         vec![
///             param("name", ValueKind::String, "World").long("--name").short("-n"),
///             param("count", ValueKind::Integer, 1),
///         ]
///     }
/// }
///
/// assert_eq!(GreetArgs::fields().len(), 2);
/// ```
pub trait ArgsSchema: Serialize + DeserializeOwned + 'static {
    /// Type name used for naming-convention lookups (e.g. `"GreetArgs"`).
    const NAME: &'static str;

    /// Whether this schema opts into positional/remainder capture.
    const CAPTURES_EXTRA: bool = false;

    /// Ordered field descriptors.
    fn fields() -> Vec<FieldDescriptor>;

    /// Schema-level checks that flag syntax cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Slot receiving captured positional and remainder tokens.
    fn extra_args_mut(&mut self) -> Option<&mut ExtraArgs> {
        None
    }
}

/// Type-level description of a schema, detached from its Rust type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub fields: Vec<FieldDescriptor>,
    pub captures_extra: bool,
}

impl SchemaDescriptor {
    /// Builds the descriptor for `T`.
    pub fn of<T: ArgsSchema>() -> Self {
        Self {
            type_name: T::NAME,
            type_id: TypeId::of::<T>(),
            fields: T::fields(),
            captures_extra: T::CAPTURES_EXTRA,
        }
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Application-wide fallback schema with no fields.
///
/// Used for commands that neither declare a schema type nor have a
/// convention-named one, unless the application registers its own common
/// schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommonArgs {}

impl ArgsSchema for CommonArgs {
    const NAME: &'static str = "CommonArgs";

    fn fields() -> Vec<FieldDescriptor> {
        Vec::new()
    }
}
