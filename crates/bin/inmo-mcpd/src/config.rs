use clap::{Parser, builder::BoolishValueParser};
use inmo_core::store::notion::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use inmo_core::store::NotionConfig;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_COLLECTIONS_PATH: &str = "collections.json";
const DEFAULT_COLLECTION: &str = "seguimientos";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "inmo-mcpd", version, about = "inmo-mcp daemon.")]
#[allow(clippy::struct_excessive_bools)]
struct CliArgs {
    #[arg(long = "collections", env = "INMO_COLLECTIONS_PATH", default_value = DEFAULT_COLLECTIONS_PATH)]
    collections_path: PathBuf,

    #[arg(long, env = "INMO_HUB_PAGE_ID")]
    hub_page_id: Option<String>,

    #[arg(long, env = "INMO_DEFAULT_COLLECTION", default_value = DEFAULT_COLLECTION)]
    default_collection: String,

    #[arg(long, env = "INMO_NOTION_TOKEN", hide_env_values = true)]
    notion_token: Option<String>,

    #[arg(long, env = "INMO_NOTION_BASE_URL", default_value = DEFAULT_BASE_URL)]
    notion_base_url: String,

    #[arg(long, env = "INMO_NOTION_VERSION", default_value = DEFAULT_API_VERSION)]
    notion_version: String,

    #[arg(
        long,
        env = "INMO_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS
    )]
    http_timeout_secs: u64,

    #[arg(
        long = "in-memory",
        env = "INMO_STORE_IN_MEMORY",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    store_in_memory: bool,

    #[arg(
        long,
        env = "INMO_SERIALIZE_WRITES",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    serialize_writes: bool,

    #[arg(
        long = "stdio",
        env = "INMO_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "INMO_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "INMO_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "INMO_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct InmoConfig {
    pub collections_path: PathBuf,
    pub hub_page_id: String,
    pub default_collection: String,
    pub notion_token: Option<String>,
    pub notion_base_url: String,
    pub notion_version: String,
    pub http_timeout: Duration,
    pub store_in_memory: bool,
    pub serialize_writes: bool,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub log_filter: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl InmoConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Store client settings; `None` when running on the in-memory store.
    pub fn notion_config(&self) -> Option<NotionConfig> {
        if self.store_in_memory {
            return None;
        }
        let token = self.notion_token.as_ref()?;
        Some(
            NotionConfig::new(token.clone())
                .with_base_url(self.notion_base_url.clone())
                .with_api_version(self.notion_version.clone())
                .with_timeout(self.http_timeout),
        )
    }
}

impl TryFrom<CliArgs> for InmoConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let hub_page_id = args
            .hub_page_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingSetting("INMO_HUB_PAGE_ID"))?;
        let notion_token = args.notion_token.filter(|value| !value.trim().is_empty());

        if !args.store_in_memory && notion_token.is_none() {
            return Err(ConfigError::MissingSetting("INMO_NOTION_TOKEN"));
        }

        if args.default_collection.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "INMO_DEFAULT_COLLECTION",
                value: args.default_collection,
            });
        }

        if args.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "INMO_HTTP_TIMEOUT_SECS",
                value: args.http_timeout_secs.to_string(),
            });
        }

        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::InvalidSetting {
                name: "INMO_MCP_SERVE",
                value: "false (with stdio disabled, no transport is enabled)".to_string(),
            });
        }

        Ok(Self {
            collections_path: args.collections_path,
            hub_page_id,
            default_collection: args.default_collection.trim().to_string(),
            notion_token,
            notion_base_url: args.notion_base_url,
            notion_version: args.notion_version,
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            store_in_memory: args.store_in_memory,
            serialize_writes: args.serialize_writes,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            log_filter: args.log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            collections_path: PathBuf::from(DEFAULT_COLLECTIONS_PATH),
            hub_page_id: Some("hub-page".to_string()),
            default_collection: DEFAULT_COLLECTION.to_string(),
            notion_token: Some("secret".to_string()),
            notion_base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_API_VERSION.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            store_in_memory: false,
            serialize_writes: false,
            enable_stdio: false,
            mcp_serve: true,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    #[test]
    fn builds_notion_config_from_defaults() {
        let config = InmoConfig::try_from(base_args()).expect("config should parse");
        let notion = config.notion_config().expect("remote store configured");

        assert_eq!(notion.base_url, "https://api.notion.com");
        assert_eq!(notion.api_version, "2022-06-28");
        assert_eq!(notion.timeout, Duration::from_secs(30));
    }

    #[test]
    fn requires_token_unless_in_memory() {
        let mut args = base_args();
        args.notion_token = Some("  ".to_string());
        let err = InmoConfig::try_from(args).err().expect("token required");
        assert!(matches!(err, ConfigError::MissingSetting("INMO_NOTION_TOKEN")));

        let mut args = base_args();
        args.notion_token = None;
        args.store_in_memory = true;
        let config = InmoConfig::try_from(args).expect("in-memory needs no token");
        assert!(config.notion_config().is_none());
    }

    #[test]
    fn requires_hub_page_id() {
        let mut args = base_args();
        args.hub_page_id = None;
        let err = InmoConfig::try_from(args).err().expect("hub required");
        assert_eq!(err.to_string(), "missing required setting: INMO_HUB_PAGE_ID");
    }

    #[test]
    fn rejects_configuration_without_transport() {
        let mut args = base_args();
        args.mcp_serve = false;
        let err = InmoConfig::try_from(args).err().expect("no transport");
        assert!(matches!(err, ConfigError::InvalidSetting { name: "INMO_MCP_SERVE", .. }));
    }
}
