//! The dispatch engine.
//!
//! One call to [`AutoCli::dispatch`] walks
//! `classify → {help, parse} → validate → prepare → execute → report` and
//! returns the exit code. Nothing escapes as a panic: parse errors, validation
//! failures and handler errors all become exit codes.

use std::any::Any;
use std::iter;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::anyhow;
use autocli_core::{ExtraArgs, HELP_FLAG};
use clap::error::ErrorKind;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::args::{PreparedArgs, Validated};
use crate::compile::positional_tokens;
use crate::console::Console;
use crate::error::DispatchError;
use crate::handler::Handler;
use crate::help;
use crate::outcome::Outcome;
use crate::registry::{CliBuilder, CommandSpec, PrepareHook, Registry};

const REMAINDER_SEPARATOR: &str = "--";

/// A parsed command line, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInvocation {
    /// Subcommand name (kebab-case).
    pub command: String,
    /// Field values keyed by field name, defaults filled in.
    pub values: Map<String, Value>,
    pub positional: Vec<String>,
    /// Tokens after the first `--`, verbatim.
    pub remainder: Vec<String>,
}

enum Route {
    Help(Option<String>),
    Run { subcommand: String, explicit: bool },
    Unknown(String),
    Usage,
}

struct Hooks<S> {
    prepare: Option<PrepareHook<S>>,
    pre_common: Option<PrepareHook<S>>,
    pre_common_warned: bool,
}

impl<S> Hooks<S> {
    fn run(&mut self, state: &mut S, args: &PreparedArgs<'_>) {
        if let Some(prepare) = &self.prepare {
            prepare(state, args);
            return;
        }
        if let Some(pre_common) = &self.pre_common {
            if !self.pre_common_warned {
                warn!("pre_common() is deprecated. Use prepare() instead.");
                self.pre_common_warned = true;
            }
            pre_common(state, args);
        }
    }
}

/// A built command-line application.
///
/// Owns the application state `S`; the prepare hook writes it, handlers
/// read and write it.
pub struct AutoCli<S> {
    state: S,
    program: Option<String>,
    registry: Registry<S>,
    console: Console,
    hooks: Hooks<S>,
}

impl<S> std::fmt::Debug for AutoCli<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCli")
            .field("program", &self.program)
            .field("commands", &self.registry.subcommands())
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

impl<S: 'static> AutoCli<S> {
    pub fn builder(state: S) -> CliBuilder<S> {
        CliBuilder::new(state)
    }

    pub(crate) fn new(
        state: S,
        program: Option<String>,
        registry: Registry<S>,
        console: Console,
        prepare: Option<PrepareHook<S>>,
        pre_common: Option<PrepareHook<S>>,
    ) -> Self {
        Self {
            state,
            program,
            registry,
            console,
            hooks: Hooks {
                prepare,
                pre_common,
                pre_common_warned: false,
            },
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    /// Subcommand names with their descriptions, in registration order.
    pub fn subcommands(&self) -> Vec<(&str, Option<&str>)> {
        self.registry.subcommands()
    }

    /// Schema type name resolved for a snake-case command name.
    pub fn schema_for(&self, command: &str) -> Option<&'static str> {
        self.registry.schema_for(command)
    }

    /// Runs with the process arguments and exits with the resulting code.
    pub fn run(&mut self) -> ! {
        let code = self.dispatch(std::env::args());
        std::process::exit(i32::try_from(code).unwrap_or(1))
    }

    /// Runs one invocation and returns its exit code.
    ///
    /// `argv[0]` is the program name.
    pub fn dispatch<I, T>(&mut self, argv: I) -> i64
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let argv0 = argv.next();
        let program = self
            .program
            .clone()
            .or_else(|| argv0.as_deref().map(program_name))
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        let (mut head, remainder) = split_remainder(argv.collect());
        let color = self.console.config().color;

        match classify(&self.registry, &mut head) {
            Route::Help(selected) => {
                let text = match selected.as_deref().and_then(|s| self.registry.get(s)) {
                    Some(spec) => help::command_help(&self.registry, spec, &program, color),
                    None => match self.registry.default_command() {
                        Some(spec) => help::default_help(spec, &program, color),
                        None => help::full_help(&self.registry, &program, color),
                    },
                };
                self.console.help(&text);
                0
            }
            Route::Usage => {
                let text = help::full_help(&self.registry, &program, color);
                self.console.help(&text);
                0
            }
            Route::Unknown(token) => {
                let err = clap::Error::raw(
                    ErrorKind::InvalidSubcommand,
                    format!("unrecognized subcommand '{token}'\n\nFor more information, try '{program} --help'.\n"),
                );
                report_error(DispatchError::from(err))
            }
            Route::Run {
                subcommand,
                explicit,
            } => {
                let Self {
                    state,
                    registry,
                    console,
                    hooks,
                    ..
                } = self;
                let Some(spec) = registry.get(&subcommand) else {
                    return 1;
                };
                let bin = if explicit {
                    format!("{program} {subcommand}")
                } else {
                    program
                };
                let positional_allowed = registry.captures_positional(spec);
                let result = parse(spec, &bin, color, positional_allowed, head, remainder)
                    .and_then(|parsed| validate(spec, parsed));
                match result {
                    Ok(validated) => run_command(spec, state, console, hooks, validated),
                    Err(err) => report_error(err),
                }
            }
        }
    }
}

fn program_name(argv0: &str) -> String {
    Path::new(argv0)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(argv0)
        .to_string()
}

/// Splits at the first `--`; the separator itself is dropped.
fn split_remainder(mut tokens: Vec<String>) -> (Vec<String>, Vec<String>) {
    match tokens.iter().position(|t| t == REMAINDER_SEPARATOR) {
        Some(index) => {
            let remainder = tokens.split_off(index + 1);
            tokens.pop();
            (tokens, remainder)
        }
        None => (tokens, Vec::new()),
    }
}

fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Decides what to do with the pre-separator tokens. A selected subcommand
/// is removed from `head`.
fn classify<S>(registry: &Registry<S>, head: &mut Vec<String>) -> Route {
    let candidate = head.iter().position(|t| !is_flag(t));
    let selected = candidate.filter(|&i| registry.get(&head[i]).is_some());

    if head.iter().any(|t| t == HELP_FLAG) {
        return Route::Help(selected.map(|i| head[i].clone()));
    }
    if let Some(index) = selected {
        let subcommand = head.remove(index);
        debug!(subcommand = %subcommand, "Selected subcommand");
        return Route::Run {
            subcommand,
            explicit: true,
        };
    }
    if let Some(spec) = registry.default_command() {
        debug!("No subcommand given; running the default command");
        return Route::Run {
            subcommand: spec.subcommand.clone(),
            explicit: false,
        };
    }
    match candidate {
        Some(index) => Route::Unknown(head[index].clone()),
        None => Route::Usage,
    }
}

fn parse<S>(
    spec: &CommandSpec<S>,
    bin: &str,
    color: bool,
    positional_allowed: bool,
    tokens: Vec<String>,
    remainder: Vec<String>,
) -> Result<ParsedInvocation, DispatchError> {
    let matches = spec
        .command(bin, color, positional_allowed)
        .try_get_matches_from(iter::once(bin.to_string()).chain(tokens))?;

    let mut positional = positional_tokens(&matches);
    if !positional_allowed && !positional.is_empty() {
        debug!(
            command = %spec.name,
            count = positional.len(),
            "Discarding positional tokens"
        );
        positional.clear();
    }

    Ok(ParsedInvocation {
        command: spec.subcommand.clone(),
        values: spec.compiled.collect(&matches),
        positional,
        remainder,
    })
}

fn validate<S>(spec: &CommandSpec<S>, parsed: ParsedInvocation) -> Result<Validated, DispatchError> {
    let extra = ExtraArgs::new(parsed.positional, parsed.remainder);
    let validated = (spec.resolution.hydrator())(parsed.values, extra)?;
    Ok(validated)
}

fn report_error(err: DispatchError) -> i64 {
    let code = err.exit_code();
    match &err {
        DispatchError::Parse(clap_err) => {
            if let Err(io_err) = clap_err.print() {
                debug!(error = %io_err, "Failed to print parse error");
            }
        }
        DispatchError::Validation(_) | DispatchError::Runtime(_) => {
            error!(error = %err, "Argument validation failed");
            eprintln!("error: {err}");
        }
    }
    code
}

fn run_command<S>(
    spec: &CommandSpec<S>,
    state: &mut S,
    console: &mut Console,
    hooks: &mut Hooks<S>,
    validated: Validated,
) -> i64 {
    let Validated { args, values } = validated;
    let prepared = PreparedArgs {
        command: &spec.name,
        values: &values,
        args: args.as_ref(),
    };
    hooks.run(state, &prepared);

    console.starting(&spec.name, &values);
    let outcome = execute(&spec.handler, state, args);

    match &outcome {
        Outcome::Error(err) => {
            error!(command = %spec.name, error = %format!("{err:#}"), "Command failed");
            eprintln!("error: {err:#}");
            console.failed(&spec.name);
        }
        Outcome::Unexpected(result) => {
            warn!(
                command = %spec.name,
                result = %result,
                "Handler returned a value with no exit-code meaning; exiting with 1"
            );
            console.done(&spec.name);
        }
        Outcome::Success | Outcome::Failure | Outcome::Code(_) => console.done(&spec.name),
    }
    outcome.exit_code()
}

fn execute<S>(handler: &Handler<S>, state: &mut S, args: Box<dyn Any>) -> Outcome {
    let result = match handler {
        Handler::Sync(run) => panic::catch_unwind(AssertUnwindSafe(|| run(state, args))),
        Handler::Async(run) => {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => return Outcome::Error(DispatchError::from(err).into()),
            };
            panic::catch_unwind(AssertUnwindSafe(|| runtime.block_on(run(state, args))))
        }
    };
    result.unwrap_or_else(|payload| {
        Outcome::Error(anyhow!("handler panicked: {}", panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
