//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download French public-health open datasets.
///
/// Fetches drug registries, prescription statistics, establishment
/// directories, geographic codes, and payment disclosures to local disk,
/// skipping files that are already current.
#[derive(Parser, Debug)]
#[command(name = "sante-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Specific datasets to download (default: all)
    #[arg(short, long, num_args = 1.., value_name = "NAME")]
    pub datasets: Vec<String>,

    /// List available datasets and exit
    #[arg(long)]
    pub list: bool,

    /// Directory to store downloaded datasets (overrides DATA_RAW_DIR)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Overall request timeout in seconds (overrides DOWNLOAD_TIMEOUT_SECONDS)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub timeout: Option<u64>,

    /// Disable per-file progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["sante-dl"]).unwrap();
        assert!(args.datasets.is_empty());
        assert!(!args.list);
        assert!(args.output_dir.is_none());
        assert!(args.timeout.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_datasets_accepts_multiple_names() {
        let args = Args::try_parse_from(["sante-dl", "--datasets", "bdpm", "rpps"]).unwrap();
        assert_eq!(args.datasets, vec!["bdpm".to_string(), "rpps".to_string()]);
    }

    #[test]
    fn test_cli_list_flag() {
        let args = Args::try_parse_from(["sante-dl", "--list"]).unwrap();
        assert!(args.list);
    }

    #[test]
    fn test_cli_output_dir_flag() {
        let args = Args::try_parse_from(["sante-dl", "-o", "/tmp/raw"]).unwrap();
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/raw")));
    }

    #[test]
    fn test_cli_timeout_range_rejects_zero() {
        let result = Args::try_parse_from(["sante-dl", "--timeout", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["sante-dl", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["sante-dl", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["sante-dl", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
