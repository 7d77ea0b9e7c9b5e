use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bt_core::config::{DEFAULT_BIND, DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT};
use bt_core::{ApiResponse, ScraperConfig, ServerConfig};
use bt_scraper::{BulletinScraper, Scraper};
use chrono::Utc;
use clap::Parser;
use tracing::{info, Level};

/// A `--timeout` value such as `45`, `30s`, `1m30s` or `2h`. A bare number
/// is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

const DURATION_TOO_LARGE: &str = "Duration too large";

fn unit_seconds(unit: char) -> std::result::Result<u64, String> {
    match unit {
        's' => Ok(1),
        'm' => Ok(60),
        'h' => Ok(3600),
        _ => Err(format!("Invalid duration unit: {}", unit)),
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let mut total: u64 = 0;
        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Expected a number at `{}`", rest));
            }
            let value: u64 = rest[..digits]
                .parse()
                .map_err(|_| DURATION_TOO_LARGE.to_string())?;
            rest = &rest[digits..];

            let unit = match rest.chars().next() {
                Some(c) => {
                    rest = &rest[c.len_utf8()..];
                    unit_seconds(c)?
                }
                None => 1,
            };
            rest = rest.trim_start();

            total = value
                .checked_mul(unit)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(|| DURATION_TOO_LARGE.to_string())?;
        }

        if total == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrapes the bulletin page and serves it with a refresh button", long_about = None)]
struct Cli {
    /// Page to scrape
    #[arg(long, global = true, default_value = DEFAULT_SOURCE_URL)]
    source_url: String,
    /// User-Agent sent to the source page
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    /// Timeout for outbound requests (e.g. 30s, 1m, 1m30s)
    #[arg(long, global = true, default_value = "30s")]
    timeout: HumanDuration,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server with the display page and the scrape endpoint
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        /// Base URL the display page uses to reach the endpoint, when it is
        /// not the bound address (e.g. behind a proxy)
        #[arg(long)]
        public_url: Option<String>,
    },
    /// Scrape once and print the endpoint JSON
    Scrape {
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig::default()
            .with_source_url(self.source_url.clone())
            .with_user_agent(self.user_agent.clone())
            .with_timeout(self.timeout.0)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    bt_scraper::init_logging(cli.log_level);

    let scraper = BulletinScraper::new(&cli.scraper_config())?;
    info!("🦗 Scraper initialized for {}", scraper.source_url());

    match cli.command {
        Commands::Serve { bind, public_url } => {
            let config = ServerConfig::new(&bind)?.with_public_url(public_url);
            bt_web::serve(config, Arc::new(scraper), cli.timeout.0).await?;
        }
        Commands::Scrape { pretty } => {
            let timestamp = Utc::now();
            let response = match scraper.scrape_at(timestamp).await {
                Ok(result) => ApiResponse::success(result),
                Err(e) => {
                    let response = ApiResponse::failure(&timestamp, e.to_string());
                    println!("{}", serde_json::to_string(&response)?);
                    return Err(e.into());
                }
            };
            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_human_duration() {
        assert_eq!("30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(30));
        assert_eq!("1m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("2h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(7200));
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert!("".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("m".parse::<HumanDuration>().is_err());
        assert_eq!("1m 30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
    }

    #[test]
    fn test_human_duration_overflow() {
        assert_eq!(
            "6000000000000000h".parse::<HumanDuration>(),
            Err(DURATION_TOO_LARGE.to_string())
        );
        assert_eq!(
            "18446744073709551615s1s".parse::<HumanDuration>(),
            Err(DURATION_TOO_LARGE.to_string())
        );
        assert_eq!(
            "99999999999999999999999".parse::<HumanDuration>(),
            Err(DURATION_TOO_LARGE.to_string())
        );
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["bt", "serve"]).unwrap();
        assert_eq!(cli.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(cli.timeout.0, Duration::from_secs(30));
        assert_eq!(cli.log_level, Level::INFO);
        match cli.command {
            Commands::Serve { bind, public_url } => {
                assert_eq!(bind, DEFAULT_BIND);
                assert!(public_url.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bt",
            "scrape",
            "--pretty",
            "--source-url",
            "http://127.0.0.1:4000/cat/57",
            "--timeout",
            "5s",
        ])
        .unwrap();
        let config = cli.scraper_config();
        assert_eq!(config.source_url, "http://127.0.0.1:4000/cat/57");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(matches!(cli.command, Commands::Scrape { pretty: true }));
    }
}
