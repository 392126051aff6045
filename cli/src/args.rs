//! Validated argument objects.
//!
//! Parsed flag values are re-hydrated into the schema type with `serde`,
//! checked with [`ArgsSchema::validate`], and handed to the handler. Handlers
//! registered without a schema type receive a [`DynArgs`] instead.

use std::any::Any;

use autocli_core::{ArgsSchema, ExtraArgs};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ValidationError;

/// Type-erased result of validation.
#[derive(Debug)]
pub(crate) struct Validated {
    pub(crate) args: Box<dyn Any>,
    /// Serialized field values, for banners and the prepare hook.
    pub(crate) values: Map<String, Value>,
}

/// Turns a raw field map plus captured tokens into a [`Validated`].
pub(crate) type Hydrator = fn(Map<String, Value>, ExtraArgs) -> Result<Validated, ValidationError>;

pub(crate) fn hydrate<T: ArgsSchema>(
    raw: Map<String, Value>,
    extra: ExtraArgs,
) -> Result<T, ValidationError> {
    let mut args: T = serde_json::from_value(Value::Object(raw))?;
    args.validate().map_err(ValidationError::Schema)?;
    if let Some(slot) = args.extra_args_mut() {
        *slot = extra;
    }
    Ok(args)
}

pub(crate) fn hydrate_typed<T: ArgsSchema>(
    raw: Map<String, Value>,
    extra: ExtraArgs,
) -> Result<Validated, ValidationError> {
    let args = hydrate::<T>(raw, extra)?;
    let values = dump(&args);
    Ok(Validated {
        args: Box::new(args),
        values,
    })
}

pub(crate) fn hydrate_dyn<T: ArgsSchema>(
    raw: Map<String, Value>,
    extra: ExtraArgs,
) -> Result<Validated, ValidationError> {
    let mut args = hydrate::<T>(raw, extra)?;
    let values = dump(&args);
    let extra = args.extra_args_mut().map(|slot| slot.clone());
    let dyn_args = DynArgs {
        schema: T::NAME,
        values: values.clone(),
        extra,
        typed: Box::new(args),
    };
    Ok(Validated {
        args: Box::new(dyn_args),
        values,
    })
}

/// Field values shown in the Args banner. Empty when the schema does not
/// serialize to a map.
fn dump<T: ArgsSchema>(args: &T) -> Map<String, Value> {
    match serde_json::to_value(args) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(
                schema = T::NAME,
                kind = value_kind(&other),
                "Arguments did not serialize to a map; showing no args"
            );
            Map::new()
        }
        Err(err) => {
            warn!(schema = T::NAME, error = %err, "Failed to serialize arguments; showing no args");
            Map::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validated arguments of a handler registered without a schema type.
///
/// The schema is resolved by naming convention (`GreetArgs` for `greet`,
/// then `CustomArgs`) or falls back to the common schema. Values are read
/// by field name, or the typed schema is recovered with
/// [`downcast_ref`](Self::downcast_ref).
#[derive(Debug)]
pub struct DynArgs {
    schema: &'static str,
    values: Map<String, Value>,
    extra: Option<ExtraArgs>,
    typed: Box<dyn Any>,
}

impl DynArgs {
    /// Name of the resolved schema type.
    pub fn schema_name(&self) -> &'static str {
        self.schema
    }

    /// Reads one field, deserialized as `T`.
    pub fn get<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
        self.values
            .get(field)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn downcast_ref<T: ArgsSchema>(&self) -> Option<&T> {
        self.typed.downcast_ref::<T>()
    }

    /// Recovers the typed schema, or gives the arguments back on mismatch.
    pub fn into_typed<T: ArgsSchema>(self) -> Result<T, Self> {
        match self.typed.downcast::<T>() {
            Ok(typed) => Ok(*typed),
            Err(typed) => Err(Self { typed, ..self }),
        }
    }

    /// Captured tokens; `None` when the resolved schema did not opt in.
    pub fn extra_args(&self) -> Option<&ExtraArgs> {
        self.extra.as_ref()
    }
}

/// Read-only view of validated arguments given to the prepare hook.
#[derive(Debug, Clone, Copy)]
pub struct PreparedArgs<'a> {
    pub(crate) command: &'a str,
    pub(crate) values: &'a Map<String, Value>,
    pub(crate) args: &'a dyn Any,
}

impl<'a> PreparedArgs<'a> {
    /// Snake-case name of the command about to run.
    pub fn command(&self) -> &'a str {
        self.command
    }

    pub fn values(&self) -> &'a Map<String, Value> {
        self.values
    }

    /// Reads one field, deserialized as `T`.
    pub fn get<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
        self.values
            .get(field)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Returns the typed arguments if the command's schema is `T`.
    pub fn downcast_ref<T: ArgsSchema>(&self) -> Option<&'a T> {
        self.args.downcast_ref::<T>().or_else(|| {
            self.args
                .downcast_ref::<DynArgs>()
                .and_then(DynArgs::downcast_ref::<T>)
        })
    }
}
