//! Help text rendering.
//!
//! Per-command help comes straight from clap. The full help adds a fixed
//! usage-patterns block and a command index in front of every command's
//! option list.

use clap::Command;

use crate::registry::{CommandSpec, Registry};

fn render(mut command: Command, color: bool) -> String {
    let help = command.render_help();
    if color {
        help.ansi().to_string()
    } else {
        help.to_string()
    }
}

/// Help for one subcommand, as `<program> <subcommand>`.
pub(crate) fn command_help<S>(
    registry: &Registry<S>,
    spec: &CommandSpec<S>,
    program: &str,
    color: bool,
) -> String {
    let bin = format!("{program} {}", spec.subcommand);
    render(
        spec.command(&bin, color, registry.captures_positional(spec)),
        color,
    )
}

/// Help for the default command, invoked without a subcommand.
pub(crate) fn default_help<S>(spec: &CommandSpec<S>, program: &str, color: bool) -> String {
    render(spec.command(program, color, false), color)
}

/// Full help: usage patterns, the command index, then each command's options.
pub(crate) fn full_help<S>(registry: &Registry<S>, program: &str, color: bool) -> String {
    let patterns = [
        (format!("{program} <command> [options]"), "Run a command"),
        (format!("{program} <command> --help"), "Show help for one command"),
        (format!("{program} [options]"), "Run the default command, if defined"),
        (
            format!("{program} <command> [args] -- [rest]"),
            "Pass everything after `--` through unparsed",
        ),
    ];
    let width = patterns.iter().map(|(p, _)| p.len()).max().unwrap_or(0);

    let mut out = format!("Usage: {program} <COMMAND> [OPTIONS] [-- ARGS...]\n\nAutoCLI patterns:\n");
    for (pattern, meaning) in &patterns {
        out.push_str(&format!("  {pattern:<width$}  {meaning}\n"));
    }

    if registry.is_empty() {
        out.push_str("\nNo commands registered.\n");
        return out;
    }

    out.push_str("\nCommands:\n");
    let width = registry
        .iter()
        .map(|spec| spec.subcommand.len())
        .max()
        .unwrap_or(0);
    for spec in registry.iter() {
        let about = spec.about.as_deref().unwrap_or("");
        let marker = if registry.is_default(&spec.subcommand) {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!("  {:<width$}  {about}{marker}\n", spec.subcommand));
    }

    for spec in registry.iter() {
        out.push_str(&format!("\n--- {} ---\n", spec.subcommand));
        out.push_str(&command_help(registry, spec, program, color));
    }
    out
}
