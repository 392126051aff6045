//! Command registry and builder.
//!
//! Commands are registered in an explicit table: a handler member name
//! following `run_<command>`, an optional declared schema type, and the
//! handler itself. [`CliBuilder::build`] resolves every schema, compiles its
//! flags, and freezes the result into a [`Registry`].

use std::collections::HashMap;
use std::io::Write;

use autocli_core::{
    ArgsSchema, CommonArgs, ConfigError, DEFAULT_COMMAND, command_name, snake_to_kebab,
};
use clap::{ColorChoice, Command};
use indexmap::IndexMap;
use tracing::debug;

use crate::args::{DynArgs, PreparedArgs};
use crate::compile::{CompiledSchema, compile};
use crate::config::CliConfig;
use crate::console::Console;
use crate::dispatch::AutoCli;
use crate::handler::{Handler, HandlerFuture, async_handler, sync_handler};
use crate::outcome::IntoOutcome;
use crate::resolve::{ErasedSchema, Resolution, SchemaCatalog, resolve_schema};

/// Hook run with the validated arguments before a command starts.
pub type PrepareHook<S> = Box<dyn Fn(&mut S, &PreparedArgs<'_>)>;

/// One compiled command.
#[derive(Debug)]
pub struct CommandSpec<S> {
    /// Snake-case command name (`file_ops`).
    pub name: String,
    /// Kebab-case subcommand (`file-ops`).
    pub subcommand: String,
    /// One-line description.
    pub about: Option<String>,
    pub resolution: Resolution,
    pub compiled: CompiledSchema,
    pub(crate) handler: Handler<S>,
}

impl<S> CommandSpec<S> {
    /// Name of the schema type this command validates against.
    pub fn schema_name(&self) -> &'static str {
        self.resolution.schema.name()
    }

    pub fn captures_extra(&self) -> bool {
        self.resolution.schema.descriptor.captures_extra
    }

    /// Builds the clap command used to parse and describe this command.
    pub fn command(&self, bin_name: &str, color: bool, show_positional: bool) -> Command {
        let choice = if color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        self.compiled
            .to_command(&self.subcommand, self.about.as_deref(), show_positional)
            .bin_name(bin_name.to_string())
            .color(choice)
    }
}

/// All commands of one CLI, in registration order.
#[derive(Debug)]
pub struct Registry<S> {
    commands: IndexMap<String, CommandSpec<S>>,
    default_command: Option<String>,
}

impl<S> Registry<S> {
    /// Finds a command by subcommand name.
    pub fn get(&self, subcommand: &str) -> Option<&CommandSpec<S>> {
        self.commands.get(subcommand)
    }

    pub fn default_command(&self) -> Option<&CommandSpec<S>> {
        self.default_command
            .as_deref()
            .and_then(|name| self.commands.get(name))
    }

    pub fn is_default(&self, subcommand: &str) -> bool {
        self.default_command.as_deref() == Some(subcommand)
    }

    /// Whether positional tokens reach the handler. Never for the default
    /// command.
    pub fn captures_positional(&self, spec: &CommandSpec<S>) -> bool {
        spec.captures_extra() && !self.is_default(&spec.subcommand)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec<S>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Subcommand names with their descriptions, in registration order.
    pub fn subcommands(&self) -> Vec<(&str, Option<&str>)> {
        self.commands
            .values()
            .map(|spec| (spec.subcommand.as_str(), spec.about.as_deref()))
            .collect()
    }

    /// Schema type name resolved for a snake-case command name.
    pub fn schema_for(&self, command: &str) -> Option<&'static str> {
        self.commands
            .values()
            .find(|spec| spec.name == command)
            .map(CommandSpec::schema_name)
    }
}

struct PendingCommand<S> {
    member: String,
    declared: Option<ErasedSchema>,
    handler: Handler<S>,
}

/// Builder for an [`AutoCli`].
///
/// # Examples
///
/// ```
/// use autocli::{AutoCli, CliConfig};
/// use autocli_core::{ArgsSchema, FieldDescriptor, ValueKind, param};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct GreetArgs {
///     name: String,
/// }
///
/// impl ArgsSchema for GreetArgs {
///     const NAME: &'static str = "GreetArgs";
///     fn fields() -> Vec<FieldDescriptor> {
///         vec![param("name", ValueKind::String, "World")]
///     }
/// }
///
/// let mut cli = AutoCli::builder(())
///     .config(CliConfig::quiet())
///     .output(std::io::sink())
///     .command("run_greet", |_, args: GreetArgs| args.name == "Ada")
///     .about("greet", "Say hello")
///     .build()
///     .unwrap();
///
/// assert_eq!(cli.dispatch(["prog", "greet", "--name", "Ada"]), 0);
/// assert_eq!(cli.dispatch(["prog", "greet"]), 1);
/// ```
pub struct CliBuilder<S> {
    state: S,
    program: Option<String>,
    config: CliConfig,
    output: Option<Box<dyn Write>>,
    common: ErasedSchema,
    catalog: SchemaCatalog,
    pending: Vec<PendingCommand<S>>,
    descriptions: HashMap<String, String>,
    prepare: Option<PrepareHook<S>>,
    pre_common: Option<PrepareHook<S>>,
}

impl<S: 'static> CliBuilder<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            program: None,
            config: CliConfig::default(),
            output: None,
            common: ErasedSchema::of::<CommonArgs>(),
            catalog: SchemaCatalog::default(),
            pending: Vec::new(),
            descriptions: HashMap::new(),
            prepare: None,
            pre_common: None,
        }
    }

    pub fn config(mut self, config: CliConfig) -> Self {
        self.config = config;
        self
    }

    /// Program name used in usage lines; defaults to the file name of
    /// `argv[0]`.
    pub fn program(mut self, name: impl Into<String>) -> Self {
        self.program = Some(name.into());
        self
    }

    /// Redirects banners and help output (stdout by default).
    pub fn output(mut self, output: impl Write + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    /// Sets the shared fallback schema.
    pub fn common<T: ArgsSchema>(mut self) -> Self {
        self.common = ErasedSchema::of::<T>();
        self
    }

    /// Makes `T` available to naming-convention lookups under `T::NAME`.
    pub fn schema<T: ArgsSchema>(mut self) -> Self {
        self.catalog.insert(ErasedSchema::of::<T>());
        self
    }

    /// Registers a handler whose argument type declares its schema.
    pub fn command<T, O, F>(mut self, member: &str, handler: F) -> Self
    where
        T: ArgsSchema,
        O: IntoOutcome,
        F: Fn(&mut S, T) -> O + 'static,
    {
        self.pending.push(PendingCommand {
            member: member.to_string(),
            declared: Some(ErasedSchema::of::<T>()),
            handler: sync_handler(handler),
        });
        self
    }

    /// Registers a handler whose schema is resolved by naming convention,
    /// falling back to the common schema.
    pub fn command_dyn<O, F>(mut self, member: &str, handler: F) -> Self
    where
        O: IntoOutcome,
        F: Fn(&mut S, DynArgs) -> O + 'static,
    {
        self.pending.push(PendingCommand {
            member: member.to_string(),
            declared: None,
            handler: sync_handler(handler),
        });
        self
    }

    /// Registers an async handler with a declared schema.
    ///
    /// The dispatcher blocks on the returned future with a single-threaded
    /// runtime.
    pub fn command_async<T, O, F>(mut self, member: &str, handler: F) -> Self
    where
        T: ArgsSchema,
        O: IntoOutcome + 'static,
        F: for<'a> Fn(&'a mut S, T) -> HandlerFuture<'a, O> + 'static,
    {
        self.pending.push(PendingCommand {
            member: member.to_string(),
            declared: Some(ErasedSchema::of::<T>()),
            handler: async_handler(handler),
        });
        self
    }

    /// Registers an async handler whose schema is resolved by convention.
    pub fn command_dyn_async<O, F>(mut self, member: &str, handler: F) -> Self
    where
        O: IntoOutcome + 'static,
        F: for<'a> Fn(&'a mut S, DynArgs) -> HandlerFuture<'a, O> + 'static,
    {
        self.pending.push(PendingCommand {
            member: member.to_string(),
            declared: None,
            handler: async_handler(handler),
        });
        self
    }

    /// Sets the one-line description shown in help for a command.
    pub fn about(mut self, member: &str, text: impl Into<String>) -> Self {
        let key = command_name(member).unwrap_or_else(|| member.to_string());
        self.descriptions.insert(key, text.into());
        self
    }

    /// Sets the hook run before every command, after validation.
    pub fn prepare(mut self, hook: impl Fn(&mut S, &PreparedArgs<'_>) + 'static) -> Self {
        self.prepare = Some(Box::new(hook));
        self
    }

    /// Older name of [`prepare`](Self::prepare).
    ///
    /// Ignored when a `prepare` hook is also set.
    #[deprecated(note = "pre_common() is deprecated. Use prepare() instead.")]
    pub fn pre_common(mut self, hook: impl Fn(&mut S, &PreparedArgs<'_>) + 'static) -> Self {
        self.pre_common = Some(Box::new(hook));
        self
    }

    /// Resolves and compiles every registered command.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for invalid or duplicate command names and
    /// for any schema whose fields fail validation (reserved `--help`,
    /// duplicate flags, ...).
    pub fn build(self) -> Result<AutoCli<S>, ConfigError> {
        let mut descriptions = self.descriptions;
        let mut commands = IndexMap::new();
        let mut default_command = None;

        for pending in self.pending {
            let name = command_name(&pending.member)
                .ok_or_else(|| ConfigError::InvalidCommandName(pending.member.clone()))?;
            let subcommand = snake_to_kebab(&name);
            if commands.contains_key(&subcommand) {
                return Err(ConfigError::DuplicateCommand(subcommand));
            }

            let resolution = resolve_schema(
                &name,
                pending.declared.as_ref(),
                &self.catalog,
                &self.common,
            );
            let compiled = compile(&resolution.schema.descriptor)?;
            debug!(
                command = %name,
                subcommand = %subcommand,
                schema = resolution.schema.name(),
                flags = compiled.flags.len(),
                "Registered command"
            );

            if name == DEFAULT_COMMAND {
                default_command = Some(subcommand.clone());
            }
            let spec = CommandSpec {
                about: descriptions.remove(&name),
                name,
                subcommand: subcommand.clone(),
                resolution,
                compiled,
                handler: pending.handler,
            };
            commands.insert(subcommand, spec);
        }

        let registry = Registry {
            commands,
            default_command,
        };
        let output = self
            .output
            .unwrap_or_else(|| Box::new(std::io::stdout()));
        Ok(AutoCli::new(
            self.state,
            self.program,
            registry,
            Console::new(self.config, output),
            self.prepare,
            self.pre_common,
        ))
    }
}
