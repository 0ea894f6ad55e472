use crate::deduplication::DEFAULT_CAPACITY;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON over a long-lived HTTP response.
    Http,
    WebSocket,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub url: String,
    pub transport: Transport,
    pub bearer_token: Option<String>,
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum KeywordMode {
    /// Static list from configuration.
    Standalone { trademarks: Vec<String>, wordlist: Vec<String> },
    /// Trademarks and keywords live in the record store.
    RecordStore,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_email: String,
    pub smtp_password: String,
    pub dest_email: String,
    pub subject: String,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub webhook_url: String,
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    pub test_only: bool,
}

/// Every setting the listener needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub stream: StreamConfig,
    pub keywords: KeywordMode,
    pub store: Option<StoreConfig>,
    /// `None` when mail is disabled.
    pub mail: Option<MailConfig>,
    /// `None` when chat notifications are disabled.
    pub chat: Option<ChatConfig>,
    pub dedup_capacity: usize,
    pub sink_timeout: Duration,
    pub permalink_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let url = env.required("STREAM_URL")?;
        let transport = transport_for(&url)?;
        let stream = StreamConfig {
            transport,
            url,
            bearer_token: env.get("STREAM_BEARER_TOKEN"),
            retry_delay: Duration::from_secs(env.parse("STREAM_RETRY_DELAY_SECS", 5)?),
            connect_timeout: Duration::from_secs(env.parse("STREAM_CONNECT_TIMEOUT_SECS", 30)?),
        };

        let store = match (env.get("SUPABASE_URL"), env.get("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(service_key)) => Some(StoreConfig { url, service_key }),
            _ => None,
        };

        let keywords = if env.flag("STANDALONE") {
            let trademarks: Vec<String> = env
                .required("TRADEMARKS")?
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            if trademarks.is_empty() {
                return Err(ConfigError::Missing("TRADEMARKS"));
            }
            KeywordMode::Standalone {
                trademarks,
                wordlist: env
                    .required("WORDLIST")?
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            }
        } else {
            if store.is_none() {
                return Err(ConfigError::Missing("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY"));
            }
            KeywordMode::RecordStore
        };

        let mail = if env.flag("MAIL_ENABLED") {
            Some(MailConfig {
                smtp_server: env.required("SMTP_SERVER")?,
                smtp_port: env.parse("SMTP_PORT", 465)?,
                smtp_email: env.required("SMTP_EMAIL")?,
                smtp_password: env.required("SMTP_PASSWORD")?,
                dest_email: env.required("DEST_EMAIL")?,
                subject: env.get("SUBJECT_EMAIL").unwrap_or_else(|| "Trademark alert".into()),
            })
        } else {
            None
        };

        let chat = if env.flag("NOTIFICATIONS_ENABLED") {
            Some(ChatConfig {
                webhook_url: env.required("CHAT_WEBHOOK_URL")?,
                channel: env.get("CHAT_CHANNEL").unwrap_or_else(|| "#trademark-alerts".into()),
                username: env.get("CHAT_USERNAME").unwrap_or_else(|| "Trademark Monitor".into()),
                icon_emoji: env.get("CHAT_ICON_EMOJI").unwrap_or_else(|| ":mag:".into()),
                test_only: env.flag("CHAT_TEST_ONLY"),
            })
        } else {
            None
        };

        Ok(Self {
            port: env.parse("PORT", 3003)?,
            stream,
            keywords,
            store,
            mail,
            chat,
            dedup_capacity: env.parse("DEDUP_CAPACITY", DEFAULT_CAPACITY)?,
            sink_timeout: Duration::from_secs(env.parse("SINK_TIMEOUT_SECS", 10)?),
            permalink_base: env
                .get("PERMALINK_BASE")
                .unwrap_or_else(|| "https://twitter.com".into()),
        })
    }
}

fn transport_for(url: &str) -> Result<Transport, ConfigError> {
    let scheme = url.split("://").next().unwrap_or_default().to_ascii_lowercase();
    match scheme.as_str() {
        "http" | "https" => Ok(Transport::Http),
        "ws" | "wss" => Ok(Transport::WebSocket),
        _ => Err(ConfigError::Invalid {
            key: "STREAM_URL",
            value: url.to_string(),
        }),
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }

    fn parse<T: std::str::FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }
}
