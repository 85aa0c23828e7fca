use std::{collections::BTreeMap, process::ExitCode, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use nsone_zones::{
    ClientConfig, NsOneClient, Zone, ZoneMode, ZoneSecondaryServer, config::DEFAULT_BASE_URL,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// NS1 API key
    #[arg(long, value_name = "KEY", env = "NSONE_API_KEY", hide_env_values = true)]
    api_key: String,
    /// NS1 API base URL
    #[arg(long, value_name = "URL", env = "NSONE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout_secs: u64,
    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all zones
    List,
    /// Show a single zone
    Get { zone: String },
    /// Create a zone
    Create {
        zone: String,
        #[command(flatten)]
        settings: ZoneSettings,
    },
    /// Change an existing zone
    Update {
        zone: String,
        #[command(flatten)]
        settings: ZoneSettings,
    },
    /// Delete a zone and all of its records
    Delete { zone: String },
}

#[derive(Args, Debug, Default)]
struct ZoneSettings {
    /// Make the zone a secondary of this primary IP
    #[arg(long, value_name = "IP", conflicts_with_all = ["link", "notify"])]
    secondary_of: Option<String>,
    /// Port of the upstream primary (with --secondary-of)
    #[arg(long, value_name = "PORT", requires = "secondary_of")]
    primary_port: Option<u16>,
    /// Link the zone to another zone
    #[arg(long, value_name = "ZONE", conflicts_with = "notify")]
    link: Option<String>,
    /// Secondary server to replicate to (repeat for multiple values)
    #[arg(long, value_name = "IP[:PORT]")]
    notify: Vec<String>,
    #[arg(long, value_name = "SECS")]
    ttl: Option<u32>,
    #[arg(long, value_name = "SECS")]
    nx_ttl: Option<u32>,
    #[arg(long, value_name = "SECS")]
    refresh: Option<u32>,
    #[arg(long, value_name = "SECS")]
    retry: Option<u32>,
    #[arg(long, value_name = "SECS")]
    expiry: Option<u32>,
    /// SOA contact address
    #[arg(long, value_name = "EMAIL")]
    hostmaster: Option<String>,
    /// Metadata entry (repeat for multiple values)
    #[arg(long, value_name = "KEY=VALUE")]
    meta: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = ClientConfig::new(cli.api_key)
        .with_base_url(cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = NsOneClient::new(&config).context("failed to set up NS1 client")?;

    match cli.command {
        Command::List => {
            let zones = client.list_zones().await.context("failed to list zones")?;
            print_json(&zones)?;
        }
        Command::Get { zone } => {
            let found = client
                .get_zone(&zone)
                .await
                .with_context(|| format!("failed to fetch zone {zone}"))?;
            if !found.is_found() {
                eprintln!("zone {zone} not found");
                return Ok(ExitCode::FAILURE);
            }
            print_json(&found)?;
        }
        Command::Create { zone, settings } => {
            let mut new_zone = Zone::new(&zone);
            apply_settings(&mut new_zone, &settings)?;
            client
                .create_zone(&new_zone)
                .await
                .with_context(|| format!("failed to create zone {zone}"))?;
            info!("created zone {zone}");
        }
        Command::Update { zone, settings } => {
            let mut existing = client
                .get_zone(&zone)
                .await
                .with_context(|| format!("failed to fetch zone {zone}"))?;
            if !existing.is_found() {
                bail!("zone {zone} does not exist");
            }
            apply_settings(&mut existing, &settings)?;
            client
                .update_zone(&existing)
                .await
                .with_context(|| format!("failed to update zone {zone}"))?;
            info!("updated zone {zone}");
        }
        Command::Delete { zone } => {
            client
                .delete_zone(&zone)
                .await
                .with_context(|| format!("failed to delete zone {zone}"))?;
            info!("deleted zone {zone}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn apply_settings(zone: &mut Zone, settings: &ZoneSettings) -> Result<()> {
    if let Some(target) = &settings.link {
        // linking drops every other setting
        zone.link_to(target);
        return Ok(());
    }

    if let Some(ip) = &settings.secondary_of {
        zone.make_secondary(ip);
        if let (Some(port), ZoneMode::Secondary(secondary)) =
            (settings.primary_port, &mut zone.mode)
        {
            secondary.primary_port = Some(port);
        }
    } else if !settings.notify.is_empty() {
        let servers = settings
            .notify
            .iter()
            .map(|s| {
                parse_secondary_server(s).with_context(|| format!("invalid --notify value '{s}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        zone.make_primary(servers);
    }

    let timers = [
        (settings.ttl, &mut zone.ttl),
        (settings.nx_ttl, &mut zone.nx_ttl),
        (settings.refresh, &mut zone.refresh),
        (settings.retry, &mut zone.retry),
        (settings.expiry, &mut zone.expiry),
    ];
    for (value, field) in timers {
        if value.is_some() {
            *field = value;
        }
    }
    if let Some(hostmaster) = &settings.hostmaster {
        zone.hostmaster = Some(hostmaster.clone());
    }
    if !settings.meta.is_empty() {
        let meta = zone.meta.get_or_insert_with(BTreeMap::new);
        for entry in &settings.meta {
            let (key, value) = entry
                .split_once('=')
                .with_context(|| format!("invalid --meta value '{entry}', expected KEY=VALUE"))?;
            meta.insert(key.trim().to_string(), value.to_string());
        }
    }
    Ok(())
}

fn parse_secondary_server(input: &str) -> Result<ZoneSecondaryServer> {
    let input = input.trim();
    if input.is_empty() {
        bail!("address cannot be empty");
    }
    // bracketed IPv6 with port: [2001:db8::1]:5353
    if let Some(rest) = input.strip_prefix('[') {
        let (ip, port) = rest.split_once("]:").context("expected [IP]:PORT")?;
        return Ok(ZoneSecondaryServer::new(ip).with_port(port.parse()?));
    }
    match input.rsplit_once(':') {
        Some((ip, port)) if !ip.contains(':') => {
            Ok(ZoneSecondaryServer::new(ip).with_port(port.parse()?))
        }
        _ => Ok(ZoneSecondaryServer::new(input)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
    println!("{out}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,nsone_zones=debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notify_targets() {
        assert_eq!(
            parse_secondary_server("192.0.2.10").unwrap(),
            ZoneSecondaryServer::new("192.0.2.10")
        );
        assert_eq!(
            parse_secondary_server("192.0.2.10:5353").unwrap(),
            ZoneSecondaryServer::new("192.0.2.10").with_port(5353)
        );
        assert_eq!(
            parse_secondary_server("2001:db8::1").unwrap(),
            ZoneSecondaryServer::new("2001:db8::1")
        );
        assert_eq!(
            parse_secondary_server("[2001:db8::1]:5353").unwrap(),
            ZoneSecondaryServer::new("2001:db8::1").with_port(5353)
        );
        assert!(parse_secondary_server("192.0.2.10:http").is_err());
    }

    #[test]
    fn settings_switch_to_secondary_with_port() {
        let mut zone = Zone::new("example.com");
        let settings = ZoneSettings {
            secondary_of: Some("198.51.100.7".into()),
            primary_port: Some(5353),
            ttl: Some(600),
            ..ZoneSettings::default()
        };

        apply_settings(&mut zone, &settings).unwrap();

        let secondary = zone.secondary().unwrap();
        assert_eq!(secondary.primary_ip.as_deref(), Some("198.51.100.7"));
        assert_eq!(secondary.primary_port, Some(5353));
        assert_eq!(zone.ttl, Some(600));
    }

    #[test]
    fn settings_link_ignores_timers() {
        let mut zone = Zone::new("example.net");
        zone.ttl = Some(3600);
        let settings = ZoneSettings {
            link: Some("example.com".into()),
            ttl: Some(60),
            ..ZoneSettings::default()
        };

        apply_settings(&mut zone, &settings).unwrap();

        assert_eq!(zone.link(), Some("example.com"));
        assert_eq!(zone.ttl, None);
    }

    #[test]
    fn settings_reject_bad_meta() {
        let mut zone = Zone::new("example.com");
        let settings = ZoneSettings {
            meta: vec!["novalue".into()],
            ..ZoneSettings::default()
        };
        assert!(apply_settings(&mut zone, &settings).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
