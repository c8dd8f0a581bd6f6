use std::ffi::OsString;
use std::path::PathBuf;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// A .http file, or a directory whose .http files are all loaded
    #[clap(value_name = "PATH")]
    path: PathBuf,

    /// Config file
    /// Optional. Overrides HTTUI_CONFIG_PATH and the default ~/.httui/config.
    #[clap(short = 'c', long, value_name = "FILE", help = "config file path")]
    config: Option<String>,

    /// Parse only and print the requests as JSON
    #[clap(long, help = "Parse the input, print the requests as JSON and exit")]
    check: bool,

    /// Require a Host line after every request line
    #[clap(long, help = "Require a Host line after every request line")]
    require_host: bool,

    /// Verbose mode
    /// Optional. Write debug logs to the log file.
    #[clap(short = 'v', long, help = "Write debug logs to the log file")]
    verbose: bool,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    path: PathBuf,
    config: Option<String>,
    check: bool,
    require_host: bool,
    verbose: bool,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            path: args.path,
            config: args.config,
            check: args.check,
            require_host: args.require_host,
            verbose: args.verbose,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn config(&self) -> Option<&String> {
        self.config.as_ref()
    }

    pub fn check(&self) -> bool {
        self.check
    }

    pub fn require_host(&self) -> bool {
        self.require_host
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
