//! Command-line interface for cmdr.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::template::Param;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Executable to run (positional).
    pub program: Option<String>,
    /// Argument template for the program.
    pub arg_template: Option<String>,
    /// Catalog template to run instead of a program.
    pub name: Option<String>,
    /// Parameters in the order given.
    pub params: Vec<Param>,
    /// Working directory override.
    pub working_dir: Option<PathBuf>,
    /// User to run as.
    pub user: Option<String>,
    /// Deliver the result asynchronously.
    pub asynchronous: bool,
    /// Start detached and print only the pid.
    pub background: bool,
    /// Terminate the child after this long.
    pub timeout: Option<Duration>,
    /// Print the result as JSON.
    pub json: bool,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('A') | Long("args") => {
                result.arg_template = Some(parser.value()?.parse()?);
            }
            Short('n') | Long("name") => {
                result.name = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("param") => {
                let value: String = parser.value()?.parse()?;
                let (name, val) = value
                    .split_once('=')
                    .filter(|(name, _)| !name.is_empty())
                    .ok_or_else(|| ArgsError::InvalidValue("param", value.clone()))?;
                result.params.push(Param::named(name, val));
            }
            Short('a') | Long("arg") => {
                let value: String = parser.value()?.parse()?;
                result.params.push(Param::bare(value));
            }
            Short('d') | Long("dir") => {
                result.working_dir = Some(parser.value()?.parse()?);
            }
            Short('u') | Long("user") => {
                result.user = Some(parser.value()?.parse()?);
            }
            Long("async") => {
                result.asynchronous = true;
            }
            Long("background") => {
                result.background = true;
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                let secs: u64 = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("timeout", value))?;
                result.timeout = Some(Duration::from_secs(secs));
            }
            Short('j') | Long("json") => {
                result.json = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) if result.program.is_none() => {
                result.program = Some(val.string()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"cmdr {version}
Run parameterized command templates with captured output

USAGE:
    cmdr [OPTIONS] <PROGRAM>
    cmdr [OPTIONS] -n <NAME>

OPTIONS:
    -A, --args <TEMPLATE>   Argument template, e.g. '-l {{{{WHAT}}}} [{{{{EVER}}}}]'
    -n, --name <NAME>       Run a template from the config file catalog
    -p, --param <N=VALUE>   Fill placeholder {{{{N}}}} (repeatable)
    -a, --arg <VALUE>       Append a bare argument (repeatable)
    -d, --dir <DIR>         Working directory for the command
    -u, --user <USER>       Run the command as USER (requires root)
        --async             Deliver the result asynchronously
        --background        Start detached and print only the pid
    -t, --timeout <SECS>    Terminate the command after SECS seconds
    -j, --json              Print the result as JSON
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    CMDR_LOG_LEVEL          Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # List Rust sources in the current directory
    cmdr ls -A '-l {{{{WHAT}}}}' -p 'WHAT=*.rs'

    # Run a catalog entry with a deadline
    cmdr -c /etc/cmdr.json -n backup -p DEST=/mnt/tape -t 600
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("cmdr {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
