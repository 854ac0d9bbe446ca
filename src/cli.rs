//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Options that are environment-specific can also be provided via environment
//! variables.

use clap::Parser;

/// Command-line arguments for probable_lineups.
///
/// # Examples
///
/// ```sh
/// # Built-in Serie A profile, page written to ./index.html
/// probable_lineups
///
/// # Custom profile, JSON copy, four fetches in flight
/// probable_lineups -c profiles/news.yaml -o site/news.html -j ./json --concurrency 4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the generated HTML page
    #[arg(short, long, default_value = "index.html")]
    pub output: String,

    /// Optional output directory for a JSON copy of the report
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Optional path to a source profile (YAML); defaults to the built-in Serie A profile
    #[arg(short, long, env = "LINEUPS_PROFILE")]
    pub config: Option<String>,

    /// Maximum number of pages fetched at the same time
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[arg(
        long,
        env = "LINEUPS_USER_AGENT",
        default_value = concat!("probable_lineups/", env!("CARGO_PKG_VERSION"))
    )]
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["probable_lineups"]);

        assert_eq!(cli.output, "index.html");
        assert!(cli.json_output_dir.is_none());
        assert_eq!(cli.concurrency, 1);
        assert_eq!(cli.timeout_secs, 30);
        assert!(cli.user_agent.starts_with("probable_lineups/"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "probable_lineups",
            "-o",
            "/tmp/site/index.html",
            "-j",
            "/tmp/json",
            "-c",
            "profiles/news.yaml",
        ]);

        assert_eq!(cli.output, "/tmp/site/index.html");
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
        assert_eq!(cli.config.as_deref(), Some("profiles/news.yaml"));
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "probable_lineups",
            "--concurrency",
            "8",
            "--timeout-secs",
            "5",
            "--user-agent",
            "test-agent",
        ]);

        assert_eq!(cli.concurrency, 8);
        assert_eq!(cli.timeout_secs, 5);
        assert_eq!(cli.user_agent, "test-agent");
    }
}
