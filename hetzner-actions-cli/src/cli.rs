//! Command line definition.

use clap::{Parser, Subcommand};
use hetzner_actions_waiter::{WaitOptions, DEFAULT_ENDPOINT};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "hetzner-actions", version, about = "Wait for Hetzner Cloud actions to finish")]
pub struct Cli {
    /// Hetzner Cloud API token
    #[arg(long, env = "HCLOUD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Hetzner Cloud API endpoint
    #[arg(long, env = "HCLOUD_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Maximum time in seconds to wait for all actions combined
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Delay in milliseconds between two status lookups
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Retry failed status lookups until the timeout instead of failing
    #[arg(long)]
    pub ignore_lookup_errors: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a server and wait until it is provisioned
    CreateServer {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "cx22")]
        server_type: String,
        #[arg(long, default_value = "ubuntu-24.04")]
        image: String,
        #[arg(long)]
        location: Option<String>,
    },
    /// Wait for existing actions, in the order given
    Wait {
        #[arg(required = true)]
        action_ids: Vec<u64>,
    },
}

impl Cli {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_ignore_lookup_errors(self.ignore_lookup_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["hetzner-actions", "--token", "t", "wait", "1"])
            .expect("should parse");
        assert_eq!(cli.wait_options(), WaitOptions::default());
        assert_eq!(cli.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_wait_requires_action_ids() {
        let result = Cli::try_parse_from(["hetzner-actions", "--token", "t", "wait"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let result = Cli::try_parse_from([
            "hetzner-actions",
            "--token",
            "t",
            "--poll-interval-ms",
            "0",
            "wait",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_options() {
        let cli = Cli::try_parse_from([
            "hetzner-actions",
            "--token",
            "t",
            "--timeout",
            "5",
            "--poll-interval-ms",
            "250",
            "--ignore-lookup-errors",
            "wait",
            "3",
            "4",
        ])
        .expect("should parse");

        let options = cli.wait_options();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.poll_interval, Duration::from_millis(250));
        assert!(options.ignore_lookup_errors);
        match cli.command {
            Command::Wait { action_ids } => assert_eq!(action_ids, vec![3, 4]),
            Command::CreateServer { .. } => panic!("Expected wait command"),
        }
    }
}
