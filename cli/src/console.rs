//! Lifecycle banners and help output.

use std::fmt;
use std::io::Write;

use autocli_core::display_value;
use colored::Colorize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::CliConfig;

/// Output sink for banners and help text.
pub(crate) struct Console {
    config: CliConfig,
    out: Box<dyn Write>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Console {
    pub(crate) fn new(config: CliConfig, out: Box<dyn Write>) -> Self {
        Self { config, out }
    }

    pub(crate) fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Writes help text. Not affected by quiet mode.
    pub(crate) fn help(&mut self, text: &str) {
        self.emit(format_args!("{}", text.trim_end()));
    }

    pub(crate) fn starting(&mut self, command: &str, values: &Map<String, Value>) {
        if self.config.quiet {
            return;
        }
        let banner = self.paint(&format!("Starting <{command}>"), Tone::Start);
        self.emit(format_args!("{banner}"));
        for line in args_block(values) {
            self.emit(format_args!("{line}"));
        }
    }

    pub(crate) fn done(&mut self, command: &str) {
        if self.config.quiet {
            return;
        }
        let banner = self.paint(&format!("Done <{command}>"), Tone::Done);
        self.emit(format_args!("{banner}"));
    }

    pub(crate) fn failed(&mut self, command: &str) {
        if self.config.quiet {
            return;
        }
        let banner = self.paint(&format!("Failed <{command}>"), Tone::Failed);
        self.emit(format_args!("{banner}"));
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.config.color {
            return text.to_string();
        }
        match tone {
            Tone::Start => text.cyan().bold().to_string(),
            Tone::Done => text.green().bold().to_string(),
            Tone::Failed => text.red().bold().to_string(),
        }
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            debug!(error = %err, "Failed to write console output");
        }
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Start,
    Done,
    Failed,
}

/// Lines of the "Args" block: one aligned `key: value` line per field.
fn args_block(values: &Map<String, Value>) -> Vec<String> {
    if values.is_empty() {
        return vec!["No args".to_string()];
    }
    let width = values.keys().map(String::len).max().unwrap_or(0) + 1;
    let mut lines = Vec::with_capacity(values.len() + 1);
    lines.push("Args".to_string());
    for (key, value) in values {
        lines.push(format!("\t{key:<width$}: {}", display_value(value)));
    }
    lines
}
