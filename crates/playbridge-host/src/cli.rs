use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

/// Native-messaging host that opens browser URLs in an external media player.
///
/// Started by the browser with one framed request on stdin.
#[derive(Debug, Default, Parser)]
#[command(name = "playbridge", version)]
pub struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, env = "PLAYBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Arguments supplied by the browser (manifest path and extension id,
    /// or extension origin and parent window).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub browser_args: Vec<String>,
}

impl Cli {
    /// Parse the process arguments without ever exiting on bad input,
    /// since usage text on stdout would corrupt the messaging pipe.
    /// `--help` and `--version` still print and exit.
    pub fn parse_lenient() -> (Self, Option<clap::Error>) {
        Self::parse_lenient_from(env::args_os())
    }

    pub fn parse_lenient_from<I, T>(args: I) -> (Self, Option<clap::Error>)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => (cli, None),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                let fallback = Self {
                    config: env::var_os("PLAYBRIDGE_CONFIG").map(PathBuf::from),
                    browser_args: Vec::new(),
                };
                (fallback, Some(e))
            }
        }
    }
}
