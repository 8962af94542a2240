//! Command-line argument surface

use crate::connection::{ConnectionConfig, RetryPolicy};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "rc-console",
    version,
    about = "Streams a robot controller's TCP log output to the console"
)]
pub struct Args {
    /// Always try to reconnect
    #[arg(short, long)]
    pub infinite: bool,

    /// How many times to try to reconnect
    #[arg(short, long, default_value_t = 1)]
    pub attempts: u32,

    /// IP of the robot controller
    #[arg(long, default_value = "192.168.49.1")]
    pub ip: String,

    /// Port listening on the robot controller
    #[arg(short, long, default_value_t = 8333)]
    pub port: u16,
}

impl Args {
    /// Build the connection configuration these arguments describe.
    /// `--infinite` wins over `--attempts`.
    pub fn to_config(&self) -> ConnectionConfig {
        let retry = if self.infinite {
            RetryPolicy::Infinite
        } else {
            RetryPolicy::Bounded(self.attempts)
        };

        ConnectionConfig {
            host: self.ip.clone(),
            port: self.port,
            retry,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contract() {
        let args = Args::try_parse_from(["rc-console"]).unwrap();
        assert!(!args.infinite);
        assert_eq!(args.attempts, 1);
        assert_eq!(args.ip, "192.168.49.1");
        assert_eq!(args.port, 8333);
        assert_eq!(args.to_config().retry, RetryPolicy::Bounded(1));
    }

    #[test]
    fn test_infinite_flag_wins_over_attempts() {
        let args = Args::try_parse_from(["rc-console", "-i", "-a", "5"]).unwrap();
        assert_eq!(args.to_config().retry, RetryPolicy::Infinite);
    }

    #[test]
    fn test_short_and_long_flags() {
        let args = Args::try_parse_from([
            "rc-console",
            "--ip",
            "10.0.0.2",
            "-p",
            "9000",
            "--attempts",
            "3",
        ])
        .unwrap();

        assert_eq!(args.ip, "10.0.0.2");
        assert_eq!(args.port, 9000);
        assert_eq!(args.attempts, 3);
        assert_eq!(args.to_config().retry, RetryPolicy::Bounded(3));
    }
}
