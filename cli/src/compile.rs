//! Flag-spec compiler.
//!
//! Turns a [`SchemaDescriptor`] into a [`CompiledSchema`]: one
//! [`CompiledFlag`] per field plus the reverse mapping from flag identifier
//! to field name. The compiled schema renders into a `clap::Command` and
//! collects parsed matches back into a raw field map for validation.

use autocli_core::{
    ConfigError, FieldDescriptor, HELP_FIELD, POSITIONAL_ID, Primitive, SchemaDescriptor,
    ValueKind, validate_fields,
};
use clap::builder::{PossibleValuesParser, TypedValueParser, ValueParser};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// How many value tokens a flag consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Boolean presence flag; consumes nothing.
    Presence,
    /// Exactly one value.
    Single,
    /// Greedy, at least one value (list without default).
    OneOrMore,
    /// Greedy, zero or more values (list with default).
    ZeroOrMore,
}

/// One field compiled into a flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFlag {
    /// Identifier the parser reports the value under.
    pub id: String,
    pub long: String,
    pub short: Option<char>,
    pub arity: Arity,
    /// Element type; `None` for presence flags.
    pub primitive: Option<Primitive>,
    pub required: bool,
    pub default: Option<Value>,
    /// Display hint: the default's string form, or a type placeholder.
    pub value_name: Option<String>,
    pub choices: Option<Vec<String>>,
    pub help: Option<String>,
}

/// Flag specification of one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub flags: Vec<CompiledFlag>,
    /// Flag identifier → field name, for fields with an explicit alias.
    pub flag_to_field: IndexMap<String, String>,
}

/// Compiles a schema's fields into flags.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found in the field set: reserved help
/// names, duplicate or malformed flags, invalid choices.
pub fn compile(schema: &SchemaDescriptor) -> Result<CompiledSchema, ConfigError> {
    if let Some(err) = validate_fields(&schema.fields).into_iter().next() {
        return Err(err);
    }

    let mut flag_to_field = IndexMap::new();
    let mut flags = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let id = field.flag_id();
        if field.long.is_some() {
            flag_to_field.insert(id.clone(), field.name.clone());
        } else if id != field.name {
            // Field names with hyphens would not round-trip through the id.
            return Err(ConfigError::InvalidLongFlag(field.long_flag()));
        }
        flags.push(compile_field(field, id));
    }

    Ok(CompiledSchema {
        flags,
        flag_to_field,
    })
}

fn compile_field(field: &FieldDescriptor, id: String) -> CompiledFlag {
    let required = field.required();
    let arity = match field.kind {
        ValueKind::Boolean => Arity::Presence,
        ValueKind::List(_) if required => Arity::OneOrMore,
        ValueKind::List(_) => Arity::ZeroOrMore,
        _ => Arity::Single,
    };
    let value_name = match (arity, field.kind.primitive()) {
        (Arity::Presence, _) | (_, None) => None,
        (_, Some(primitive)) => Some(
            field
                .default_display()
                .unwrap_or_else(|| primitive.placeholder().to_string()),
        ),
    };

    CompiledFlag {
        id,
        long: field.long_flag(),
        short: field.short.as_deref().and_then(|s| s.chars().nth(1)),
        arity,
        primitive: field.kind.primitive(),
        // Booleans always have a `false` baseline.
        required: required && arity != Arity::Presence,
        default: field.default.clone(),
        value_name,
        choices: field.choices.clone(),
        help: field.description.clone(),
    }
}

impl CompiledSchema {
    /// Maps a flag identifier back to its schema field.
    pub fn field_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.flag_to_field.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Renders the flag spec as a clap command.
    ///
    /// The clap help flag is replaced by a plain `--help` switch; help
    /// requests are intercepted before parsing. `show_positional` controls
    /// whether the positional catch-all appears in help output; it always
    /// accepts tokens so stray positionals do not abort the run.
    pub fn to_command(&self, name: &str, about: Option<&str>, show_positional: bool) -> Command {
        let mut command = Command::new(name.to_string())
            .disable_help_flag(true)
            .arg(
                Arg::new(HELP_FIELD)
                    .long(HELP_FIELD)
                    .action(ArgAction::SetTrue)
                    .help("Print help"),
            );
        if let Some(about) = about {
            command = command.about(about.to_string());
        }
        for flag in &self.flags {
            command = command.arg(to_arg(flag));
        }
        command.arg(
            Arg::new(POSITIONAL_ID)
                .num_args(0..)
                .action(ArgAction::Append)
                .value_parser(ValueParser::string())
                .value_name("ARGS")
                .hide(!show_positional),
        )
    }

    /// Collects parsed values into a map keyed by field name.
    ///
    /// Absent optional fields receive their declared default; booleans are
    /// `false` unless passed. The help switch is dropped.
    pub fn collect(&self, matches: &ArgMatches) -> Map<String, Value> {
        let mut raw = Map::new();
        for flag in &self.flags {
            let value = match flag.arity {
                Arity::Presence => Some(Value::Bool(matches.get_flag(&flag.id))),
                Arity::Single => scalar_value(matches, flag),
                Arity::OneOrMore | Arity::ZeroOrMore => list_value(matches, flag),
            };
            if let Some(value) = value.or_else(|| flag.default.clone()) {
                raw.insert(self.field_for(&flag.id).to_string(), value);
            }
        }
        raw.remove(HELP_FIELD);
        raw
    }
}

/// Returns the positional tokens left over after flag parsing.
pub fn positional_tokens(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>(POSITIONAL_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn to_arg(flag: &CompiledFlag) -> Arg {
    let mut arg = Arg::new(flag.id.clone()).long(flag.long.trim_start_matches('-').to_string());
    if let Some(short) = flag.short {
        arg = arg.short(short);
    }
    if let Some(help) = &flag.help {
        arg = arg.help(help.clone());
    }

    let arg = match flag.arity {
        Arity::Presence => return arg.action(ArgAction::SetTrue),
        Arity::Single => arg.action(ArgAction::Set).num_args(1),
        Arity::OneOrMore => arg.action(ArgAction::Set).num_args(1..),
        Arity::ZeroOrMore => arg.action(ArgAction::Set).num_args(0..),
    };
    let arg = match &flag.value_name {
        Some(name) => arg.value_name(name.clone()),
        None => arg,
    };

    let primitive = flag.primitive.unwrap_or(Primitive::String);
    arg.required(flag.required)
        .allow_negative_numbers(primitive != Primitive::String)
        .value_parser(value_parser_for(primitive, flag.choices.as_deref()))
}

fn value_parser_for(primitive: Primitive, choices: Option<&[String]>) -> ValueParser {
    match (primitive, choices) {
        (Primitive::String, None) => ValueParser::string(),
        (Primitive::Integer, None) => value_parser!(i64).into(),
        (Primitive::Float, None) => value_parser!(f64).into(),
        (Primitive::String, Some(choices)) => PossibleValuesParser::new(choices.to_vec()).into(),
        (Primitive::Integer, Some(choices)) => PossibleValuesParser::new(choices.to_vec())
            .try_map(|s| s.parse::<i64>())
            .into(),
        (Primitive::Float, Some(choices)) => PossibleValuesParser::new(choices.to_vec())
            .try_map(|s| s.parse::<f64>())
            .into(),
    }
}

fn scalar_value(matches: &ArgMatches, flag: &CompiledFlag) -> Option<Value> {
    match flag.primitive? {
        Primitive::String => matches.get_one::<String>(&flag.id).map(|v| Value::from(v.clone())),
        Primitive::Integer => matches.get_one::<i64>(&flag.id).map(|v| Value::from(*v)),
        Primitive::Float => matches.get_one::<f64>(&flag.id).map(|v| Value::from(*v)),
    }
}

fn list_value(matches: &ArgMatches, flag: &CompiledFlag) -> Option<Value> {
    let values: Vec<Value> = match flag.primitive? {
        Primitive::String => matches
            .get_many::<String>(&flag.id)?
            .map(|v| Value::from(v.clone()))
            .collect(),
        Primitive::Integer => matches
            .get_many::<i64>(&flag.id)?
            .map(|v| Value::from(*v))
            .collect(),
        Primitive::Float => matches
            .get_many::<f64>(&flag.id)?
            .map(|v| Value::from(*v))
            .collect(),
    };
    Some(Value::Array(values))
}
