//! tool-routing - Route agent tool calls to better tools
//!
//! # Usage
//!
//! ```bash
//! # As a PreToolUse hook (reads the tool call as JSON on stdin)
//! echo '{"tool_name":"WebFetch","tool_input":{"url":"https://acme.atlassian.net/x"}}' \
//!     | tool-routing check
//!
//! # Authoring
//! tool-routing list
//! tool-routing test
//! tool-routing integration-test --list > plan.json
//! tool-routing integration-test --evaluate --tests plan.json --report report.json
//! ```

use clap::Parser;
use log::{warn, LevelFilter};
use simplelog::WriteLogger;
use std::io;

use tool_routing::cli::{self, Cli, Command};
use tool_routing::config::Settings;
use tool_routing::discovery::CommandHost;

fn main() {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    // The hook's stderr is shown to the agent, so keep it clean unless debugging
    let level = match (&cli.command, settings.debug) {
        (_, true) => LevelFilter::Debug,
        (Command::Check, false) => LevelFilter::Off,
        _ => LevelFilter::Warn,
    };
    let _ = WriteLogger::init(level, simplelog::Config::default(), io::stderr());

    if let Some(error) = &settings.config_error {
        warn!("ignoring settings file: {}", error);
    }

    let host = CommandHost::from_settings(&settings);
    let code = cli::run(
        &cli.command,
        &settings,
        &host,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );

    std::process::exit(code);
}
