use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Port used for zone transfers when none is given.
pub const DEFAULT_XFR_PORT: u16 = 53;

/// One downstream secondary in a zone's `primary.secondaries` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSecondaryServer {
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub notify: bool,
}

impl ZoneSecondaryServer {
    /// Secondary on the default port that is sent NOTIFY messages.
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port: None,
            notify: true,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

/// A zone's `primary` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZonePrimary {
    #[serde(default)]
    pub enabled: bool,
    // always sent as an array; the service rejects null here
    #[serde(default, deserialize_with = "null_as_empty")]
    pub secondaries: Vec<ZoneSecondaryServer>,
}

/// A zone's `secondary` block: the upstream primary it transfers from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneSecondary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Unix time of the last completed transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_xfr: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_port: Option<u16>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

impl ZoneSecondary {
    pub fn last_transfer(&self) -> Option<DateTime<Utc>> {
        self.last_xfr
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// Summary of a record in the zone. Only ever returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneRecord {
    #[serde(default, alias = "Domain", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_answers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
}

/// Which role the zone plays. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneMode {
    /// Authoritative, optionally replicated to the listed secondaries.
    Primary(ZonePrimary),
    /// Replicates from an external primary.
    Secondary(ZoneSecondary),
    /// Serves the configuration of another zone (the target's name).
    Linked(String),
}

impl Default for ZoneMode {
    fn default() -> Self {
        ZoneMode::Primary(ZonePrimary {
            enabled: true,
            secondaries: Vec::new(),
        })
    }
}

/// An NS1 `/zones` resource.
///
/// On the wire the mode is spread over the `primary`, `secondary` and `link`
/// keys; see [`ZoneMode`] for the in-memory form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ZoneWire", into = "ZoneWire")]
pub struct Zone {
    pub id: Option<String>,
    /// Domain name of the zone, e.g. `example.com`.
    pub zone: String,
    pub ttl: Option<u32>,
    pub nx_ttl: Option<u32>,
    pub retry: Option<u32>,
    pub refresh: Option<u32>,
    pub expiry: Option<u32>,
    pub dns_servers: Option<Vec<String>>,
    pub networks: Option<Vec<u32>>,
    pub network_pools: Option<Vec<String>>,
    pub hostmaster: Option<String>,
    pub pool: Option<String>,
    pub meta: Option<BTreeMap<String, String>>,
    pub records: Option<Vec<ZoneRecord>>,
    pub serial: Option<u32>,
    pub mode: ZoneMode,
}

impl Zone {
    /// New primary zone, enabled, with no secondaries.
    pub fn new(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            ..Self::default()
        }
    }

    /// Value returned by a lookup the service answered with 404: no name,
    /// no id.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// `false` for the value produced by [`Zone::not_found`]: no name and no
    /// (or an empty) id.
    pub fn is_found(&self) -> bool {
        !self.zone.is_empty() || self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Switch to primary mode, replicating to `secondaries`.
    pub fn make_primary(&mut self, secondaries: impl IntoIterator<Item = ZoneSecondaryServer>) {
        self.mode = ZoneMode::Primary(ZonePrimary {
            enabled: true,
            secondaries: secondaries.into_iter().collect(),
        });
    }

    /// Switch to secondary mode, transferring from `ip` on port 53.
    pub fn make_secondary(&mut self, ip: impl Into<String>) {
        self.mode = ZoneMode::Secondary(ZoneSecondary {
            enabled: true,
            primary_ip: Some(ip.into()),
            primary_port: Some(DEFAULT_XFR_PORT),
            ..ZoneSecondary::default()
        });
    }

    /// Link this zone to `target` and drop every setting the link replaces.
    pub fn link_to(&mut self, target: impl Into<String>) {
        self.meta = None;
        self.ttl = None;
        self.nx_ttl = None;
        self.retry = None;
        self.refresh = None;
        self.expiry = None;
        self.dns_servers = None;
        self.networks = None;
        self.network_pools = None;
        self.hostmaster = None;
        self.pool = None;
        self.mode = ZoneMode::Linked(target.into());
    }

    pub fn mode(&self) -> &ZoneMode {
        &self.mode
    }

    pub fn primary(&self) -> Option<&ZonePrimary> {
        match &self.mode {
            ZoneMode::Primary(p) => Some(p),
            _ => None,
        }
    }

    pub fn secondary(&self) -> Option<&ZoneSecondary> {
        match &self.mode {
            ZoneMode::Secondary(s) => Some(s),
            _ => None,
        }
    }

    pub fn link(&self) -> Option<&str> {
        match &self.mode {
            ZoneMode::Linked(target) => Some(target),
            _ => None,
        }
    }
}

// Flat shape of the JSON document. Every optional key is omitted when None.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ZoneWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nx_ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "null_as_empty")]
    zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary: Option<ZonePrimary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dns_servers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    networks: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network_pools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hostmaster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary: Option<ZoneSecondary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    records: Option<Vec<ZoneRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    serial: Option<u32>,
}

impl From<ZoneWire> for Zone {
    fn from(w: ZoneWire) -> Self {
        let primary_enabled = w.primary.as_ref().is_some_and(|p| p.enabled);
        let mode = match (w.link, w.secondary, w.primary) {
            (Some(target), _, _) => ZoneMode::Linked(target),
            (None, Some(secondary), _) if !primary_enabled => ZoneMode::Secondary(secondary),
            (None, _, Some(primary)) => ZoneMode::Primary(primary),
            (None, _, None) => ZoneMode::default(),
        };

        Zone {
            id: w.id,
            zone: w.zone,
            ttl: w.ttl,
            nx_ttl: w.nx_ttl,
            retry: w.retry,
            refresh: w.refresh,
            expiry: w.expiry,
            dns_servers: w.dns_servers,
            networks: w.networks,
            network_pools: w.network_pools,
            hostmaster: w.hostmaster,
            pool: w.pool,
            meta: w.meta,
            records: w.records,
            serial: w.serial,
            mode,
        }
    }
}

impl From<Zone> for ZoneWire {
    fn from(z: Zone) -> Self {
        let (primary, secondary, link) = match z.mode {
            ZoneMode::Primary(p) => (Some(p), None, None),
            // the service expects an explicitly disabled primary block
            ZoneMode::Secondary(s) => (Some(ZonePrimary::default()), Some(s), None),
            ZoneMode::Linked(target) => (None, None, Some(target)),
        };

        ZoneWire {
            id: z.id,
            ttl: z.ttl,
            nx_ttl: z.nx_ttl,
            retry: z.retry,
            zone: z.zone,
            refresh: z.refresh,
            expiry: z.expiry,
            primary,
            dns_servers: z.dns_servers,
            networks: z.networks,
            network_pools: z.network_pools,
            hostmaster: z.hostmaster,
            pool: z.pool,
            meta: z.meta,
            secondary,
            link,
            records: z.records,
            serial: z.serial,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
