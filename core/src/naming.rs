//! Command and schema naming conventions.
//!
//! Commands are registered under snake_case names (optionally with a `run_`
//! prefix), exposed as kebab-case subcommands, and matched against schema
//! types named after them.

use std::sync::LazyLock;

use heck::{ToKebabCase, ToUpperCamelCase};
use regex::Regex;

/// Name of the command invoked when no subcommand is given.
pub const DEFAULT_COMMAND: &str = "default";

/// Last-resort convention name tried before the common schema.
pub const CUSTOM_ARGS: &str = "CustomArgs";

static COMMAND_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex must compile"));

/// Extracts the command name from a handler member name.
///
/// Accepts `run_<command>` as well as a bare `<command>`.
///
/// # Examples
///
/// ```
/// use autocli_core::command_name;
///
/// assert_eq!(command_name("run_file_ops").as_deref(), Some("file_ops"));
/// assert_eq!(command_name("greet").as_deref(), Some("greet"));
/// assert_eq!(command_name("Run-Greet"), None);
/// ```
pub fn command_name(member: &str) -> Option<String> {
    let name = member.strip_prefix("run_").unwrap_or(member);
    COMMAND_NAME.is_match(name).then(|| name.to_string())
}

/// `file_ops` → `FileOps`.
pub fn snake_to_pascal(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `file_ops` → `file-ops`.
pub fn snake_to_kebab(name: &str) -> String {
    name.to_kebab_case()
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Schema type names tried for `command`, in precedence order.
///
/// # Examples
///
/// ```
/// use autocli_core::convention_names;
///
/// assert_eq!(
///     convention_names("file_ops"),
///     vec!["FileOpsArgs", "File_opsArgs", "CustomArgs"],
/// );
/// assert_eq!(convention_names("greet"), vec!["GreetArgs", "CustomArgs"]);
/// ```
pub fn convention_names(command: &str) -> Vec<String> {
    let mut names = vec![format!("{}Args", snake_to_pascal(command))];
    let secondary = format!("{}Args", capitalize(command));
    if !names.contains(&secondary) {
        names.push(secondary);
    }
    names.push(CUSTOM_ARGS.to_string());
    names
}
