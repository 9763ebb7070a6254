use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use reqwest::Url;
use crate::config::env::*;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub site_url: Url,
    pub admins: AdminList,
    pub realtime: RealtimeConfig,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Url,
    pub max_connections: u32
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub url: Url,
    pub anon_key: String,
}

#[derive(Clone, Copy, Debug)]
pub struct RealtimeConfig {
    pub capacity: usize,
    pub reconnect_delay: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

/// Emails of the users allowed to manage notices. Empty means any authenticated user.
#[derive(Clone, Debug, Default)]
pub struct AdminList(Arc<HashSet<String>>);

impl AdminList {
    pub fn parse(value: &str) -> Self {
        let emails = value.split(',')
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self(Arc::new(emails))
    }

    pub fn allows(&self, email: Option<&str>) -> bool {
        if self.0.is_empty() {
            return true
        }
        email
            .map(|email| self.0.contains(&email.to_lowercase()))
            .unwrap_or(false)
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_addr = SocketAddr::from(([0, 0, 0, 0], 8080));
        let listen_addr = get_env_value_or_default("LISTEN_ADDR", default_addr);
        let site_url = get_env_value_or_default("SITE_URL", Url::parse("http://localhost:3000")?);
        let admins: String = get_optional_env_value("NOTICEBOARD_ADMINS");
        let defaults = RealtimeConfig::default();
        let capacity = get_env_value_or_default("REALTIME_CAPACITY", defaults.capacity);
        let reconnect_delay = get_env_value_or_default("REALTIME_RECONNECT_DELAY_SECS", defaults.reconnect_delay.as_secs());
        Ok(Self {
            listen_addr,
            site_url,
            admins: AdminList::parse(&admins),
            realtime: RealtimeConfig {
                capacity: capacity.max(1),
                reconnect_delay: Duration::from_secs(reconnect_delay),
            },
        })
    }

    /// An absolute URL of a page of the site, used as a redirect target in emails.
    pub fn site_page(&self, path: &str) -> anyhow::Result<Url> {
        Ok(self.site_url.join(path)?)
    }
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: get_env_mandatory_value("DATABASE_URL")?,
            max_connections: get_env_value_or_default("DATABASE_MAX_CONNECTIONS", 10)
        })
    }
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: get_env_mandatory_value("SUPABASE_URL")?,
            anon_key: get_env_mandatory_value("SUPABASE_ANON_KEY")?,
        })
    }
}
