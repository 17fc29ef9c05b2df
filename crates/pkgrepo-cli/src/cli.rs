use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use pkgrepo_config::ConflictPolicy;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the catalog of a repository directory
    #[command(arg_required_else_help = true)]
    Create {
        /// Repository root containing the package archives
        #[arg(required = true, value_hint = ValueHint::DirPath)]
        root: PathBuf,

        /// What to do with duplicate origins, dependencies or files: skip, abort or replace
        #[arg(required = false, long)]
        conflict_policy: Option<ConflictPolicy>,

        /// Do not show the progress spinner
        #[arg(required = false, long)]
        no_progress: bool,
    },

    /// Generate a default config file
    #[clap(name = "defconfig")]
    DefConfig {
        /// Where to write the config file
        #[arg(required = false, short, long, default_value = "pkgrepo.toml", value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let args = Args::try_parse_from([
            "pkgrepo",
            "-vv",
            "create",
            "/srv/packages",
            "--conflict-policy",
            "abort",
            "--config",
            "/etc/pkgrepo.toml",
        ])
        .unwrap();

        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("/etc/pkgrepo.toml")));
        match args.command {
            Commands::Create {
                root,
                conflict_policy,
                no_progress,
            } => {
                assert_eq!(root, PathBuf::from("/srv/packages"));
                assert_eq!(conflict_policy, Some(ConflictPolicy::Abort));
                assert!(!no_progress);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        assert!(Args::try_parse_from([
            "pkgrepo",
            "create",
            "/srv/packages",
            "--conflict-policy",
            "merge",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_defconfig() {
        let args = Args::try_parse_from(["pkgrepo", "defconfig"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::DefConfig { ref output } if output == &PathBuf::from("pkgrepo.toml")
        ));
    }
}
