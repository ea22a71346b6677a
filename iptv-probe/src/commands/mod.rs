#[cfg(feature = "browser")]
mod browser;
mod generate;
#[cfg(feature = "browser")]
mod probe;
#[cfg(feature = "browser")]
mod update;

pub use generate::Generate;

#[cfg(feature = "browser")]
pub use probe::Probe;
#[cfg(feature = "browser")]
pub use update::Update;

use clap::{ArgAction, ColorChoice, Parser, Subcommand};

/// Detect HLS streams loaded by web pages and build IPTV playlists from them.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// When to output colored text.
    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Increase logging verbosity, repeat for more details.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[cfg(feature = "browser")]
    Probe(Probe),
    #[cfg(feature = "browser")]
    Update(Update),
    Generate(Generate),
}

impl Commands {
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            #[cfg(feature = "browser")]
            Commands::Probe(args) => args.execute(),
            #[cfg(feature = "browser")]
            Commands::Update(args) => args.execute(),
            Commands::Generate(args) => args.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let args =
            Args::try_parse_from(["iptv-probe", "generate", "-vv", "--color", "never"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(!args.quiet);
        assert!(matches!(args.color, ColorChoice::Never));
        assert!(matches!(args.command, Commands::Generate(_)));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["iptv-probe", "generate", "-q", "-v"]).is_err());
    }
}
