// API client module: a small blocking HTTP client for the Discord
// endpoints the dumper needs (the caller's guild list and a single
// guild's detail). Everything else runs synchronously; only the emote
// download fan-out in `archive` is async.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

const DISCORD_API: &str = "https://discord.com/api/v8";
const DISCORD_CDN: &str = "https://cdn.discordapp.com";

/// Fixed user-agent sent with every request, API and CDN alike.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; CrOS x86_64 8172.45.0) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/51.0.2704.64 Safari/537.36";

/// Errors from the Discord API calls. `Unauthorized` is fatal: the
/// token is bad and no further call can succeed. Everything else is
/// transport or decoding trouble surfaced to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("the API rejected the supplied token (401 unauthorized)")]
    Unauthorized,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to decode guild response")]
    Decode(#[from] serde_json::Error),
}

/// A guild as returned by the API. The guild-list endpoint omits the
/// emote array, so it defaults to empty there.
#[derive(Debug, Clone, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emojis: Vec<Emote>,
}

/// A custom emote entry inside a guild's `emojis` array.
#[derive(Debug, Clone, Deserialize)]
pub struct Emote {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

/// A single guild fetch: the typed guild plus the raw response value,
/// kept around so `--json` mode can dump the response unaltered.
#[derive(Debug)]
pub struct GuildDetail {
    pub guild: Guild,
    pub raw: serde_json::Value,
}

/// Blocking client holding the reqwest client, the API and CDN base
/// URLs and the user token sent as the Authorization header.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    cdn_url: String,
}

impl ApiClient {
    /// Create a client against the default Discord endpoints, with
    /// `DISCORD_API_URL` / `DISCORD_CDN_URL` environment overrides.
    pub fn from_env(token: &str) -> Result<Self> {
        let base_url = std::env::var("DISCORD_API_URL").unwrap_or_else(|_| DISCORD_API.into());
        let cdn_url = std::env::var("DISCORD_CDN_URL").unwrap_or_else(|_| DISCORD_CDN.into());
        Self::new(token, base_url, cdn_url)
    }

    /// Create a client against explicit base URLs.
    pub fn new(token: &str, base_url: String, cdn_url: String) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(token).context("Token is not a valid header value")?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            http,
            base_url,
            cdn_url,
        })
    }

    /// CDN base URL emote images are fetched from.
    pub fn cdn_url(&self) -> &str {
        &self.cdn_url
    }

    /// Fetch the list of guilds the token's user belongs to.
    ///
    /// A 401 means the token is bad and comes back as
    /// `ApiError::Unauthorized`. Any other non-200 status is logged
    /// and yields an empty list rather than an error.
    pub fn list_guilds(&self) -> Result<Vec<Guild>, ApiError> {
        let url = format!("{}/users/@me/guilds", self.base_url);
        let res = self.http.get(&url).send()?;
        match res.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::OK => Ok(res.json()?),
            status => {
                warn!(%status, "unexpected status loading guild list");
                Ok(Vec::new())
            }
        }
    }

    /// Fetch one guild by id. Any non-200 status (unknown guild, no
    /// access) is logged and returns `None`; the caller skips it.
    pub fn get_guild(&self, guild_id: &str) -> Result<Option<GuildDetail>, ApiError> {
        let url = format!("{}/guilds/{}", self.base_url, guild_id);
        let res = self.http.get(&url).send()?;
        if res.status() != StatusCode::OK {
            warn!(status = %res.status(), guild_id, "failed to fetch guild, skipping");
            return Ok(None);
        }
        let raw: serde_json::Value = res.json()?;
        let guild: Guild = serde_json::from_value(raw.clone())?;
        Ok(Some(GuildDetail { guild, raw }))
    }
}
