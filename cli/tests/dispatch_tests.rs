use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use autocli::{AutoCli, CliBuilder, CliConfig, DynArgs, HandlerFuture, PreparedArgs};
use autocli_core::{
    ArgsSchema, ConfigError, ExtraArgs, ExtraArgsCapable, FieldDescriptor, ValueKind, param,
};
use serde::{Deserialize, Serialize};

/// Writer shared between the CLI and the test.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Collects formatted `tracing` output for assertions on warnings.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Runs `f` with a WARN-level subscriber writing into this buffer.
    fn record<R>(&self, f: impl FnOnce() -> R) -> R {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    fn count(&self, needle: &str) -> usize {
        let bytes = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&bytes).matches(needle).count()
    }
}

#[derive(Debug, Default)]
struct Log {
    calls: Vec<String>,
}

impl Log {
    fn push(&mut self, entry: impl Into<String>) {
        self.calls.push(entry.into());
    }
}

fn build(configure: impl FnOnce(CliBuilder<Log>) -> CliBuilder<Log>) -> (AutoCli<Log>, SharedBuffer) {
    let out = SharedBuffer::default();
    let builder = AutoCli::builder(Log::default())
        .program("prog")
        .config(CliConfig::default())
        .output(out.clone());
    let cli = configure(builder).build().expect("cli should build");
    (cli, out)
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct GreetArgs {
    name: String,
    count: i64,
}

impl ArgsSchema for GreetArgs {
    const NAME: &'static str = "GreetArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            param("name", ValueKind::String, "World"),
            param("count", ValueKind::Integer, 1),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        if self.count < 0 {
            return Err("count must not be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelArgs {
    level: i64,
}

impl ArgsSchema for LevelArgs {
    const NAME: &'static str = "LevelArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![param("level", ValueKind::Integer, 3)]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ClashArgs {
    dry_run: bool,
    dry: bool,
}

impl ArgsSchema for ClashArgs {
    const NAME: &'static str = "ClashArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            param("dry_run", ValueKind::Boolean, false),
            param("dry", ValueKind::Boolean, false).long("--dry_run"),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserArgs {
    username: String,
    admin: bool,
}

impl ArgsSchema for UserArgs {
    const NAME: &'static str = "UserArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("username", ValueKind::String)
                .long("--user")
                .short("-u"),
            param("admin", ValueKind::Boolean, false),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FilesArgs {
    file: String,
    verbose: bool,
    #[serde(skip)]
    extra: ExtraArgs,
}

impl ArgsSchema for FilesArgs {
    const NAME: &'static str = "FilesArgs";
    const CAPTURES_EXTRA: bool = true;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("file", ValueKind::String).help("Input file"),
            param("verbose", ValueKind::Boolean, false),
        ]
    }

    fn extra_args_mut(&mut self) -> Option<&mut ExtraArgs> {
        Some(&mut self.extra)
    }
}

impl ExtraArgsCapable for FilesArgs {
    fn extra_args(&self) -> &ExtraArgs {
        &self.extra
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DefaultArgs {
    verbose: bool,
    #[serde(skip)]
    extra: ExtraArgs,
}

impl ArgsSchema for DefaultArgs {
    const NAME: &'static str = "DefaultArgs";
    const CAPTURES_EXTRA: bool = true;

    fn fields() -> Vec<FieldDescriptor> {
        vec![param("verbose", ValueKind::Boolean, false).short("-v")]
    }

    fn extra_args_mut(&mut self) -> Option<&mut ExtraArgs> {
        Some(&mut self.extra)
    }
}

impl ExtraArgsCapable for DefaultArgs {
    fn extra_args(&self) -> &ExtraArgs {
        &self.extra
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HelpFieldArgs {
    help: bool,
}

impl ArgsSchema for HelpFieldArgs {
    const NAME: &'static str = "HelpFieldArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![param("help", ValueKind::Boolean, false)]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HelpAliasArgs {
    show: bool,
}

impl ArgsSchema for HelpAliasArgs {
    const NAME: &'static str = "HelpAliasArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![param("show", ValueKind::Boolean, false).long("--help")]
    }
}

fn greet(log: &mut Log, args: GreetArgs) -> bool {
    for _ in 0..args.count {
        log.push(format!("Hello, {}!", args.name));
    }
    true
}

fn files(log: &mut Log, args: FilesArgs) {
    log.push(format!("file={} verbose={}", args.file, args.verbose));
    log.push(format!("positional={:?}", args.get_positional()));
    log.push(format!("remainder={:?}", args.get_remainder_list()));
    log.push(format!("joined={}", args.get_remainder()));
}

fn default_command(log: &mut Log, args: DefaultArgs) {
    log.push(format!("default verbose={}", args.verbose));
    log.push(format!("positional={:?}", args.get_positional()));
}

fn slow_greet(log: &mut Log, args: GreetArgs) -> HandlerFuture<'_, i64> {
    Box::pin(async move {
        tokio::task::yield_now().await;
        log.push(format!("async {}", args.name));
        args.count
    })
}

fn failing_fetch(_log: &mut Log, _args: GreetArgs) -> HandlerFuture<'_, anyhow::Result<()>> {
    Box::pin(async { Err::<(), _>(anyhow::anyhow!("connection refused")) })
}

// ---------------------------------------------------------------------------
// Greet scenario
// ---------------------------------------------------------------------------

#[test]
fn greet_runs_handler_with_validated_args() {
    let (mut cli, out) = build(|b| b.command("run_greet", greet));

    let code = cli.dispatch(["prog", "greet", "--name", "Ada", "--count", "2"]);

    assert_eq!(code, 0);
    assert_eq!(cli.state().calls, ["Hello, Ada!", "Hello, Ada!"]);
    assert_eq!(
        out.text(),
        "Starting <greet>\nArgs\n\tname  : Ada\n\tcount : 2\nDone <greet>\n"
    );
}

#[test]
fn greet_uses_declared_defaults() {
    let (mut cli, _out) = build(|b| b.command("run_greet", greet));

    assert_eq!(cli.dispatch(["prog", "greet"]), 0);
    assert_eq!(cli.state().calls, ["Hello, World!"]);
}

#[test]
fn handler_results_map_to_exit_codes() {
    let (mut cli, out) = build(|b| {
        b.command("run_yes", |_: &mut Log, _: GreetArgs| true)
            .command("run_unit", |_: &mut Log, _: GreetArgs| ())
            .command("run_no", |_: &mut Log, _: GreetArgs| false)
            .command("run_code", |_: &mut Log, args: GreetArgs| args.count)
            .command("run_float", |_: &mut Log, _: GreetArgs| 2.9_f64)
            .command("run_none", |_: &mut Log, _: GreetArgs| None::<i32>)
            .command("run_text", |_: &mut Log, _: GreetArgs| String::from("Hello"))
    });

    assert_eq!(cli.dispatch(["prog", "yes"]), 0);
    assert_eq!(cli.dispatch(["prog", "unit"]), 0);
    assert_eq!(cli.dispatch(["prog", "no"]), 1);
    assert_eq!(cli.dispatch(["prog", "code", "--count", "7"]), 7);
    assert_eq!(cli.dispatch(["prog", "float"]), 2);
    assert_eq!(cli.dispatch(["prog", "none"]), 0);

    out.clear();
    assert_eq!(cli.dispatch(["prog", "text"]), 1);
    assert!(out.text().ends_with("Done <text>\n"));
}

#[test]
fn handler_errors_and_panics_exit_one_with_failed_banner() {
    let (mut cli, out) = build(|b| {
        b.command("run_broken", |_: &mut Log, _: GreetArgs| -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        })
        .command("run_crash", |_: &mut Log, _: GreetArgs| -> bool { panic!("handler crashed") })
    });

    assert_eq!(cli.dispatch(["prog", "broken"]), 1);
    assert!(out.text().ends_with("Failed <broken>\n"));

    out.clear();
    assert_eq!(cli.dispatch(["prog", "crash"]), 1);
    assert!(out.text().starts_with("Starting <crash>"));
    assert!(out.text().ends_with("Failed <crash>\n"));
}

// ---------------------------------------------------------------------------
// Schema resolution
// ---------------------------------------------------------------------------

#[test]
fn declared_type_resolves_regardless_of_parameter_name() {
    let (mut cli, _out) = build(|b| {
        b.command("run_first", |log: &mut Log, a: GreetArgs| log.push(a.name))
            .command("run_second", |log: &mut Log, totally_unrelated_name: GreetArgs| {
                log.push(totally_unrelated_name.name)
            })
    });

    assert_eq!(cli.schema_for("first"), Some("GreetArgs"));
    assert_eq!(cli.schema_for("second"), Some("GreetArgs"));
    assert_eq!(cli.dispatch(["prog", "second", "--name", "Bo"]), 0);
    assert_eq!(cli.state().calls, ["Bo"]);
}

#[test]
fn declared_type_wins_over_convention_schema() {
    let (mut cli, _out) = build(|b| {
        b.schema::<GreetArgs>()
            .command("run_greet", |log: &mut Log, args: LevelArgs| {
                log.push(format!("level={}", args.level))
            })
    });

    assert_eq!(cli.schema_for("greet"), Some("LevelArgs"));
    assert_eq!(cli.dispatch(["prog", "greet", "--level", "5"]), 0);
    assert_eq!(cli.state().calls, ["level=5"]);
    assert_eq!(cli.dispatch(["prog", "greet", "--name", "Ada"]), 2);
}

#[test]
fn schema_conflict_logs_one_warning() {
    const CONFLICT: &str = "Declared argument type differs from convention-named schema";
    let logs = LogCapture::default();

    logs.record(|| {
        build(|b| {
            b.schema::<GreetArgs>()
                .command("run_greet", |_: &mut Log, _: LevelArgs| ())
        })
    });
    assert_eq!(logs.count(CONFLICT), 1);

    let logs = LogCapture::default();
    logs.record(|| build(|b| b.schema::<GreetArgs>().command("run_greet", greet)));
    assert_eq!(logs.count(CONFLICT), 0);
}

#[test]
fn untyped_handlers_resolve_by_convention_then_common() {
    let (mut cli, _out) = build(|b| {
        b.schema::<GreetArgs>()
            .common::<LevelArgs>()
            .command_dyn("run_greet", |log: &mut Log, args: DynArgs| {
                log.push(format!("{}:{}", args.schema_name(), args.get::<String>("name").unwrap_or_default()));
                assert_eq!(args.downcast_ref::<GreetArgs>().map(|a| a.count), Some(1));
            })
            .command_dyn("run_other", |log: &mut Log, args: DynArgs| {
                log.push(format!("{}:{}", args.schema_name(), args.get::<i64>("level").unwrap_or_default()));
            })
    });

    assert_eq!(cli.schema_for("greet"), Some("GreetArgs"));
    assert_eq!(cli.schema_for("other"), Some("LevelArgs"));
    assert_eq!(cli.dispatch(["prog", "greet", "--name", "Cy"]), 0);
    assert_eq!(cli.dispatch(["prog", "other"]), 0);
    assert_eq!(cli.state().calls, ["GreetArgs:Cy", "LevelArgs:3"]);
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[test]
fn boolean_flags_take_no_value() {
    let (mut cli, _out) = build(|b| b.command("run_files", files));

    assert_eq!(cli.dispatch(["prog", "files", "--file", "a.txt", "--verbose", "extra"]), 0);
    assert_eq!(cli.state().calls[0], "file=a.txt verbose=true");
    assert_eq!(cli.state().calls[1], r#"positional=["extra"]"#);

    cli.state_mut().calls.clear();
    assert_eq!(cli.dispatch(["prog", "files", "--file", "a.txt"]), 0);
    assert_eq!(cli.state().calls[0], "file=a.txt verbose=false");
}

#[test]
fn aliases_map_back_to_field_names() {
    let record = |log: &mut Log, args: UserArgs| log.push(format!("{} admin={}", args.username, args.admin));
    let (mut cli, _out) = build(|b| b.command("run_user", record));

    assert_eq!(cli.dispatch(["prog", "user", "--user", "ada"]), 0);
    assert_eq!(cli.dispatch(["prog", "user", "-u", "bob", "--admin"]), 0);
    assert_eq!(cli.state().calls, ["ada admin=false", "bob admin=true"]);

    assert_eq!(cli.dispatch(["prog", "user", "--username", "cy"]), 2);
}

#[test]
fn missing_required_flag_is_a_parse_error_without_banners() {
    let (mut cli, out) = build(|b| b.command("run_files", files));

    assert_eq!(cli.dispatch(["prog", "files"]), 2);
    assert!(out.text().is_empty());
    assert!(cli.state().calls.is_empty());
}

#[test]
fn invalid_values_fail_before_the_handler() {
    let (mut cli, out) = build(|b| b.command("run_greet", greet));

    assert_eq!(cli.dispatch(["prog", "greet", "--count", "many"]), 2);
    assert!(out.text().is_empty());

    // Parses, but the schema rejects it.
    assert_eq!(cli.dispatch(["prog", "greet", "--count", "-1"]), 1);
    assert!(out.text().is_empty());
    assert!(cli.state().calls.is_empty());
}

// ---------------------------------------------------------------------------
// Positional and remainder capture
// ---------------------------------------------------------------------------

#[test]
fn remainder_is_passed_through_verbatim() {
    let (mut cli, _out) = build(|b| b.command("run_files", files));

    let code = cli.dispatch([
        "prog", "files", "--file", "a", "p1", "--", "--raw", "x=1", "-v", "two words", "--",
    ]);

    assert_eq!(code, 0);
    let calls = &cli.state().calls;
    assert_eq!(calls[1], r#"positional=["p1"]"#);
    assert_eq!(calls[2], r#"remainder=["--raw", "x=1", "-v", "two words", "--"]"#);
    assert_eq!(calls[3], "joined=--raw x=1 -v two words --");
}

#[test]
fn schemas_without_capture_drop_extra_tokens() {
    let (mut cli, _out) = build(|b| {
        b.schema::<GreetArgs>()
            .command_dyn("run_greet", |log: &mut Log, args: DynArgs| {
                log.push(format!("extra={}", args.extra_args().is_some()));
            })
            .command_dyn("run_files", |log: &mut Log, args: DynArgs| {
                let extra = args.extra_args().cloned().unwrap_or_default();
                log.push(format!("{:?} {:?}", extra.get_positional(), extra.get_remainder_list()));
            })
            .schema::<FilesArgs>()
    });

    assert_eq!(cli.dispatch(["prog", "greet", "stray", "--", "tail"]), 0);
    assert_eq!(cli.dispatch(["prog", "files", "--file", "f", "p", "--", "t"]), 0);
    assert_eq!(cli.state().calls, ["extra=false", r#"["p"] ["t"]"#]);
}

#[test]
fn default_command_never_captures_positionals() {
    let (mut cli, _out) = build(|b| {
        b.command("run_default", default_command)
            .command("run_files", files)
    });

    assert_eq!(cli.dispatch(["prog", "--verbose", "stray", "tokens"]), 0);
    assert_eq!(cli.state().calls, ["default verbose=true", "positional=[]"]);

    cli.state_mut().calls.clear();
    assert_eq!(cli.dispatch(["prog", "default", "stray"]), 0);
    assert_eq!(cli.state().calls, ["default verbose=false", "positional=[]"]);

    cli.state_mut().calls.clear();
    assert_eq!(cli.dispatch(["prog", "files", "--file", "f", "p1", "p2"]), 0);
    assert_eq!(cli.state().calls[1], r#"positional=["p1", "p2"]"#);
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn help_wins_over_missing_required_flags() {
    let (mut cli, out) = build(|b| {
        b.command("run_files", files)
            .about("files", "Inspect files")
            .command("run_greet", greet)
    });

    assert_eq!(cli.dispatch(["prog", "files", "--verbose", "--help"]), 0);
    let help = out.text();
    assert!(help.contains("Usage: prog files"));
    assert!(help.contains("--file <string>"));
    assert!(help.contains("Inspect files"));
    assert!(!help.contains("--name"));
    assert!(cli.state().calls.is_empty());
}

#[test]
fn help_ignores_tokens_after_separator() {
    let (mut cli, out) = build(|b| b.command("run_files", files));

    assert_eq!(cli.dispatch(["prog", "files", "--file", "f", "--", "--help"]), 0);
    assert!(!out.text().contains("Usage:"));
    assert_eq!(cli.state().calls[2], r#"remainder=["--help"]"#);
}

#[test]
fn full_help_lists_patterns_and_commands() {
    let (mut cli, out) = build(|b| {
        b.command("run_greet", greet)
            .about("greet", "Say hello")
            .command("run_files", files)
    });

    assert_eq!(cli.dispatch(["prog", "--help"]), 0);
    let help = out.text();
    assert!(help.contains("AutoCLI patterns"));
    assert!(help.contains("Commands:"));
    assert!(help.contains("Say hello"));
    assert!(help.contains("--- greet ---"));
    assert!(help.contains("--- files ---"));

    out.clear();
    assert_eq!(cli.dispatch(["prog"]), 0);
    assert!(out.text().contains("AutoCLI patterns"));
}

#[test]
fn top_level_help_describes_default_command() {
    let (mut cli, out) = build(|b| {
        b.command("run_default", default_command)
            .command("run_greet", greet)
    });

    assert_eq!(cli.dispatch(["prog", "--help"]), 0);
    let help = out.text();
    assert!(help.contains("--verbose"));
    assert!(!help.contains("AutoCLI patterns"));
}

#[test]
fn unknown_subcommand_without_default_is_a_usage_error() {
    let (mut cli, out) = build(|b| b.command("run_greet", greet));

    assert_eq!(cli.dispatch(["prog", "grete"]), 2);
    assert!(out.text().is_empty());
}

// ---------------------------------------------------------------------------
// Build-time validation
// ---------------------------------------------------------------------------

#[test]
fn reserved_help_names_are_rejected_at_build() {
    let err = AutoCli::builder(())
        .command("run_bad", |_: &mut (), _: HelpFieldArgs| ())
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::ReservedHelpField);

    let err = AutoCli::builder(())
        .command("run_bad", |_: &mut (), _: HelpAliasArgs| ())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ReservedHelpFlag(_)));
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn flags_sharing_a_parser_id_are_rejected_at_build() {
    let err = AutoCli::builder(())
        .command("run_clash", |_: &mut (), _: ClashArgs| ())
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateFlag("--dry_run".to_string()));
}

#[test]
fn introspection_lists_commands_in_order() {
    let (cli, _out) = build(|b| {
        b.command("run_greet", greet)
            .about("greet", "Say hello")
            .command_dyn("run_file_ops", |_: &mut Log, _: DynArgs| ())
            .command("run_default", default_command)
    });

    assert_eq!(
        cli.subcommands(),
        vec![("greet", Some("Say hello")), ("file-ops", None), ("default", None)]
    );
    assert_eq!(cli.schema_for("file_ops"), Some("CommonArgs"));
    assert_eq!(cli.schema_for("missing"), None);
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

#[test]
fn prepare_runs_after_validation_before_handler() {
    let (mut cli, out) = build(|b| {
        b.command("run_greet", greet)
            .prepare(|log: &mut Log, args: &PreparedArgs<'_>| {
                let typed = args.downcast_ref::<GreetArgs>().map(|a| a.name.clone());
                log.push(format!("prepare {} {:?}", args.command(), typed));
            })
    });

    assert_eq!(cli.dispatch(["prog", "greet", "--name", "Di"]), 0);
    assert_eq!(cli.state().calls, [r#"prepare greet Some("Di")"#, "Hello, Di!"]);
    assert!(out.text().starts_with("Starting <greet>"));

    // No prepare call when validation fails.
    cli.state_mut().calls.clear();
    assert_eq!(cli.dispatch(["prog", "greet", "--count", "-3"]), 1);
    assert!(cli.state().calls.is_empty());
}

#[test]
#[allow(deprecated)]
fn pre_common_is_skipped_when_prepare_exists() {
    let (mut cli, _out) = build(|b| {
        b.command("run_greet", greet)
            .pre_common(|log: &mut Log, _: &PreparedArgs<'_>| log.push("pre_common"))
            .prepare(|log: &mut Log, _: &PreparedArgs<'_>| log.push("prepare"))
    });

    assert_eq!(cli.dispatch(["prog", "greet", "--count", "0"]), 0);
    assert_eq!(cli.state().calls, ["prepare"]);
}

#[test]
#[allow(deprecated)]
fn pre_common_runs_on_every_dispatch() {
    let (mut cli, _out) = build(|b| {
        b.command("run_greet", greet)
            .pre_common(|log: &mut Log, args: &PreparedArgs<'_>| {
                log.push(format!("pre_common {}", args.get::<i64>("count").unwrap_or(-1)))
            })
    });

    assert_eq!(cli.dispatch(["prog", "greet", "--count", "0"]), 0);
    assert_eq!(cli.dispatch(["prog", "greet", "--count", "0"]), 0);
    assert_eq!(cli.state().calls, ["pre_common 0", "pre_common 0"]);
}

#[test]
#[allow(deprecated)]
fn pre_common_deprecation_is_logged_once() {
    let logs = LogCapture::default();
    let (mut cli, _out) = build(|b| {
        b.command("run_greet", greet)
            .pre_common(|log: &mut Log, _: &PreparedArgs<'_>| log.push("pre_common"))
    });

    logs.record(|| {
        assert_eq!(cli.dispatch(["prog", "greet", "--count", "0"]), 0);
        assert_eq!(cli.dispatch(["prog", "greet", "--count", "0"]), 0);
    });

    assert_eq!(cli.state().calls, ["pre_common", "pre_common"]);
    assert_eq!(logs.count("pre_common() is deprecated"), 1);
}

// ---------------------------------------------------------------------------
// Async handlers
// ---------------------------------------------------------------------------

#[test]
fn async_handlers_run_to_completion() {
    let (mut cli, out) = build(|b| {
        b.command_async("run_slow", slow_greet)
            .command_async("run_fetch", failing_fetch)
    });

    assert_eq!(cli.dispatch(["prog", "slow", "--name", "Ed", "--count", "4"]), 4);
    assert_eq!(cli.state().calls, ["async Ed"]);
    assert!(out.text().ends_with("Done <slow>\n"));

    out.clear();
    assert_eq!(cli.dispatch(["prog", "fetch"]), 1);
    assert!(out.text().ends_with("Failed <fetch>\n"));
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

#[test]
fn quiet_mode_suppresses_banners_only() {
    let out = SharedBuffer::default();
    let mut cli = AutoCli::builder(Log::default())
        .program("prog")
        .config(CliConfig::quiet())
        .output(out.clone())
        .command("run_greet", greet)
        .build()
        .expect("cli should build");

    assert_eq!(cli.dispatch(["prog", "greet"]), 0);
    assert!(out.text().is_empty());

    assert_eq!(cli.dispatch(["prog", "greet", "--help"]), 0);
    assert!(out.text().contains("Usage: prog greet"));
}

#[test]
fn schema_without_fields_prints_no_args() {
    let (mut cli, out) = build(|b| b.command_dyn("run_ping", |_: &mut Log, _: DynArgs| ()));

    assert_eq!(cli.dispatch(["prog", "ping"]), 0);
    assert_eq!(out.text(), "Starting <ping>\nNo args\nDone <ping>\n");
}
