//! Demo application exercising every registration style.
//!
//! ```text
//! autocli-demo greet --name Ada --count 2
//! autocli-demo file -f notes.txt --mode lines extra.txt -- --verbatim tail
//! autocli-demo fetch --url https://example.com --delay-ms 5
//! autocli-demo status --code 3
//! autocli-demo --verbose
//! ```
//!
//! Set `AUTOCLI_CONFIG` to a YAML file (`quiet: true`) to override the
//! environment-derived console settings. Logging follows `RUST_LOG`.

use std::time::Duration;

use anyhow::Context;
use autocli::{AutoCli, CliConfig, DynArgs, HandlerFuture, PreparedArgs};
use autocli_core::{
    ArgsSchema, ExtraArgs, ExtraArgsCapable, FieldDescriptor, ValueKind, param,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "AUTOCLI_CONFIG";

#[derive(Debug, Default)]
struct DemoState {
    last_command: Option<String>,
    verbose: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct GreetArgs {
    name: String,
    count: i64,
    loud: bool,
}

impl ArgsSchema for GreetArgs {
    const NAME: &'static str = "GreetArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            param("name", ValueKind::String, "World")
                .short("-n")
                .help("Who to greet"),
            param("count", ValueKind::Integer, 1).help("How many times"),
            param("loud", ValueKind::Boolean, false).help("Shout the greeting"),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        if self.count < 0 {
            return Err(format!("count must not be negative, got {}", self.count));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FileArgs {
    filename: String,
    mode: String,
    #[serde(skip)]
    extra: ExtraArgs,
}

impl ArgsSchema for FileArgs {
    const NAME: &'static str = "FileArgs";
    const CAPTURES_EXTRA: bool = true;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("filename", ValueKind::String)
                .long("--file")
                .short("-f")
                .help("File to inspect"),
            param("mode", ValueKind::String, "bytes")
                .choices(["bytes", "lines"])
                .help("What to count"),
        ]
    }

    fn extra_args_mut(&mut self) -> Option<&mut ExtraArgs> {
        Some(&mut self.extra)
    }
}

impl ExtraArgsCapable for FileArgs {
    fn extra_args(&self) -> &ExtraArgs {
        &self.extra
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FetchArgs {
    url: String,
    delay_ms: i64,
}

impl ArgsSchema for FetchArgs {
    const NAME: &'static str = "FetchArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("url", ValueKind::String).help("Address to fetch"),
            param("delay_ms", ValueKind::Integer, 10),
        ]
    }
}

/// Resolved by naming convention for the `status` command.
#[derive(Debug, Serialize, Deserialize)]
struct StatusArgs {
    code: i64,
}

impl ArgsSchema for StatusArgs {
    const NAME: &'static str = "StatusArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![param("code", ValueKind::Integer, 0).help("Exit code to return")]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DefaultArgs {
    verbose: bool,
}

impl ArgsSchema for DefaultArgs {
    const NAME: &'static str = "DefaultArgs";

    fn fields() -> Vec<FieldDescriptor> {
        vec![param("verbose", ValueKind::Boolean, false).short("-v")]
    }
}

fn greet(_state: &mut DemoState, args: GreetArgs) -> bool {
    for _ in 0..args.count {
        let line = format!("Hello, {}!", args.name);
        if args.loud {
            println!("{}", line.to_uppercase());
        } else {
            println!("{line}");
        }
    }
    true
}

fn file(state: &mut DemoState, args: FileArgs) -> anyhow::Result<bool> {
    let content = std::fs::read_to_string(&args.filename)
        .with_context(|| format!("failed to read {}", args.filename))?;
    let count = match args.mode.as_str() {
        "lines" => content.lines().count(),
        _ => content.len(),
    };
    println!("{}: {count} {}", args.filename, args.mode);
    if state.verbose || !args.get_positional().is_empty() {
        println!("positional: {:?}", args.get_positional());
    }
    if !args.get_remainder_list().is_empty() {
        println!("remainder: {}", args.get_remainder());
    }
    Ok(count > 0)
}

fn fetch(state: &mut DemoState, args: FetchArgs) -> HandlerFuture<'_, anyhow::Result<i64>> {
    Box::pin(async move {
        let delay = u64::try_from(args.delay_ms).context("delay must not be negative")?;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        info!(url = %args.url, "Fetched");
        println!(
            "fetched {} for {}",
            args.url,
            state.last_command.as_deref().unwrap_or("?")
        );
        Ok::<_, anyhow::Error>(0)
    })
}

fn status(_state: &mut DemoState, args: DynArgs) -> i64 {
    match args.downcast_ref::<StatusArgs>() {
        Some(status) => status.code,
        None => args.get::<i64>("code").unwrap_or(1),
    }
}

fn default(_state: &mut DemoState, args: DefaultArgs) {
    if args.verbose {
        println!("No command given. Commands: greet, file, fetch, status");
    } else {
        println!("No command given. Try --help.");
    }
}

fn prepare(state: &mut DemoState, args: &PreparedArgs<'_>) {
    state.last_command = Some(args.command().to_string());
    state.verbose = args.get::<bool>("verbose").unwrap_or(false);
}

fn load_config() -> anyhow::Result<CliConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => CliConfig::load(&path)
            .with_context(|| format!("failed to load {}", path.to_string_lossy())),
        None => Ok(CliConfig::from_env()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    };

    let built = AutoCli::builder(DemoState::default())
        .program("autocli-demo")
        .config(config)
        .schema::<StatusArgs>()
        .command("run_greet", greet)
        .about("greet", "Print a greeting")
        .command("run_file", file)
        .about("file", "Count bytes or lines in a file")
        .command_async("run_fetch", fetch)
        .about("fetch", "Pretend to fetch a URL")
        .command_dyn("run_status", status)
        .about("status", "Exit with the given code")
        .command("run_default", default)
        .about("default", "Runs when no command is given")
        .prepare(prepare)
        .build();

    match built {
        Ok(mut cli) => cli.run(),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
