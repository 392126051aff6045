//! Schema introspector.
//!
//! Decides which schema a handler's arguments are validated against:
//!
//! 1. the handler's declared schema type (typed registration);
//! 2. a catalog schema named by convention: `PascalCase(command) + "Args"`,
//!    then `Capitalized(command) + "Args"`, then `"CustomArgs"`;
//! 3. the application's common schema.
//!
//! When a typed handler also has a differently-typed convention schema, the
//! declared type wins and a warning is logged.

use autocli_core::{ArgsSchema, SchemaDescriptor, convention_names};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::args::{Hydrator, hydrate_dyn, hydrate_typed};

/// A schema together with its type-erased hydration functions.
#[derive(Debug, Clone)]
pub struct ErasedSchema {
    pub descriptor: SchemaDescriptor,
    pub(crate) hydrate: Hydrator,
    pub(crate) hydrate_dyn: Hydrator,
}

impl ErasedSchema {
    pub fn of<T: ArgsSchema>() -> Self {
        Self {
            descriptor: SchemaDescriptor::of::<T>(),
            hydrate: hydrate_typed::<T>,
            hydrate_dyn: hydrate_dyn::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.type_name
    }
}

/// Schemas available to naming-convention lookups, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    by_name: IndexMap<&'static str, ErasedSchema>,
}

impl SchemaCatalog {
    pub fn insert(&mut self, schema: ErasedSchema) {
        if let Some(previous) = self.by_name.insert(schema.name(), schema) {
            debug!(schema = previous.name(), "Replacing catalog schema");
        }
    }

    pub fn get(&self, name: &str) -> Option<&ErasedSchema> {
        self.by_name.get(name)
    }

    /// First convention-named schema for `command`.
    pub fn by_convention(&self, command: &str) -> Option<&ErasedSchema> {
        convention_names(command)
            .iter()
            .find_map(|name| self.by_name.get(name.as_str()))
    }
}

/// Which precedence rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// The handler's declared argument type.
    Annotation,
    /// A catalog schema named after the command.
    Convention,
    /// The application's common schema.
    Fallback,
}

/// Outcome of schema resolution for one handler.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub schema: ErasedSchema,
    pub source: SchemaSource,
}

impl Resolution {
    /// Hydrator matching the handler's argument type.
    pub(crate) fn hydrator(&self) -> Hydrator {
        match self.source {
            SchemaSource::Annotation => self.schema.hydrate,
            SchemaSource::Convention | SchemaSource::Fallback => self.schema.hydrate_dyn,
        }
    }
}

/// Resolves the schema for `command`.
///
/// `declared` is the handler's argument type, if it has one. Resolution
/// depends only on types, never on how the handler names its parameter.
pub fn resolve_schema(
    command: &str,
    declared: Option<&ErasedSchema>,
    catalog: &SchemaCatalog,
    common: &ErasedSchema,
) -> Resolution {
    let conventional = catalog.by_convention(command);

    if let Some(declared) = declared {
        if let Some(conventional) = conventional {
            if conventional.descriptor.type_id != declared.descriptor.type_id {
                warn!(
                    command,
                    declared = declared.name(),
                    convention = conventional.name(),
                    "Declared argument type differs from convention-named schema; using the declared type"
                );
            }
        }
        debug!(command, schema = declared.name(), "Resolved schema from declared type");
        return Resolution {
            schema: declared.clone(),
            source: SchemaSource::Annotation,
        };
    }

    if let Some(conventional) = conventional {
        debug!(command, schema = conventional.name(), "Resolved schema by naming convention");
        return Resolution {
            schema: conventional.clone(),
            source: SchemaSource::Convention,
        };
    }

    debug!(command, schema = common.name(), "Falling back to common schema");
    Resolution {
        schema: common.clone(),
        source: SchemaSource::Fallback,
    }
}
