//! pnr-repl - CLI

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pnr_repl::host::{register_host, registered_hosts, GenericHost};
use pnr_repl::repl::console::get_console;
use pnr_repl::repl::{open_session, ReplError};
use pnr_repl::util::config::{
    load_user_config, save_user_config, ConsoleKind, EditMode, ReplConfig, UserConfig,
};
use pnr_repl::util::dirs::AppDirs;
use pnr_repl::util::logger::{self, LogLevel};
use pnr_repl::{session_config, ScriptEngine, HOST_UNAVAILABLE_EXIT_CODE, NAME, VERSION};

/// Interactive scripting console for place-and-route designs
#[derive(Parser, Debug)]
#[command(name = "pnr-repl")]
#[command(version = VERSION)]
#[command(about, long_about = None)]
struct Args {
    /// Host module to attach to
    #[arg(long, default_value = "generic")]
    host: String,

    /// Architecture name of the built-in host
    #[arg(long, default_value = "generic")]
    arch: String,

    /// Console front end
    #[arg(long, value_enum)]
    console: Option<ConsoleKind>,

    /// Key bindings
    #[arg(long, value_enum)]
    edit_mode: Option<EditMode>,

    /// History file (default: <state dir>/history)
    #[arg(long, value_name = "FILE", conflicts_with = "no_history")]
    history_file: Option<PathBuf>,

    /// Do not load or save history
    #[arg(long)]
    no_history: bool,

    /// Maximum retained history entries
    #[arg(long, value_name = "N")]
    history_size: Option<usize>,

    /// Configuration file (default: <config dir>/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a script file
    #[arg(long = "exec", value_name = "FILE")]
    exec: Option<PathBuf>,

    /// Run code given on the command line
    #[arg(short = 'c', value_name = "CODE")]
    code: Option<String>,

    /// Enter the interactive loop after --exec / -c
    #[arg(short, long)]
    interactive: bool,

    /// List the available hosts and exit
    #[arg(long)]
    list_hosts: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Command-line values win over the configuration file
    fn apply(
        &self,
        config: &mut ReplConfig,
    ) {
        if let Some(console) = self.console {
            config.console = console;
        }
        if let Some(edit_mode) = self.edit_mode {
            config.edit_mode = edit_mode;
        }
        if let Some(path) = &self.history_file {
            config.history_file = Some(path.clone());
        }
        if let Some(size) = self.history_size {
            config.history_size = size;
        }
    }

    fn scripted(&self) -> bool {
        self.exec.is_some() || self.code.is_some()
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::init_with_level(LogLevel::from_verbosity(args.verbose));
    tracing::debug!("{} {} on {}", NAME, VERSION, std::env::consts::OS);

    let dirs = AppDirs::resolve(NAME);
    let config_path = args.config.clone().unwrap_or_else(|| dirs.config_file());
    let mut config = load_user_config(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?
        .repl;
    args.apply(&mut config);

    if args.write_config {
        save_user_config(&config_path, &UserConfig { repl: config })
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        println!("{}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if let Err(e) = dirs.ensure_exists() {
        tracing::warn!("cannot create application directories: {}", e);
    }

    register_host(Arc::new(GenericHost::new("generic", &args.arch)));

    if args.list_hosts {
        for name in registered_hosts() {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let console = get_console(config.console, &config).context("Failed to open console")?;
    let mut session = session_config(&config, &dirs);
    if args.no_history {
        session = session.with_history_file(None);
    }

    let mut repl = match open_session(ScriptEngine::new(), console, &args.host, None, session) {
        Ok(repl) => repl,
        // already reported through the console
        Err(ReplError::Host(_)) => return Ok(ExitCode::from(HOST_UNAVAILABLE_EXIT_CODE)),
        Err(e) => return Err(e).context("Failed to start session"),
    };

    repl.run_startup(&config.startup);

    let mut failed = false;
    if let Some(path) = &args.exec {
        match repl.run_file(path) {
            Ok(()) => {}
            Err(ReplError::Statement(_)) => failed = true,
            Err(e) => return Err(e).with_context(|| format!("Failed to run: {}", path.display())),
        }
    }
    if let Some(code) = &args.code {
        if !failed {
            failed = repl.run_code(code).is_err();
        }
    }

    if args.scripted() && !args.interactive {
        return Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    repl.exec().context("Console failed")?;
    Ok(ExitCode::SUCCESS)
}
