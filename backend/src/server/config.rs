//! Server settings, session validation, and the assembled server config.
//!
//! Settings load through OrthoConfig from `QUESTLOG_*` environment
//! variables or the matching command-line flags. Session toggles are then
//! checked against the build mode: debug builds warn and fall back to
//! defaults, release builds refuse to start on a missing or weak setting.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

use questlog::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const SAME_SITE_EXPECTED: &str = "Strict|Lax|None";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "QUESTLOG")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub session_cookie_secure: Option<bool>,
    /// `SameSite` policy for session cookies.
    pub session_same_site: Option<String>,
    /// Permit a generated session key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| ConfigError::Invalid {
            name: "QUESTLOG_BIND_ADDR",
            value: raw.to_owned(),
            expected: "host:port",
        })
    }

    /// Path of the session key file.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH))
    }
}

/// Build mode used when validating session settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and warn.
    Debug,
    /// Release builds require explicit, valid settings.
    Release,
}

impl BuildMode {
    /// Determine the mode from `cfg!(debug_assertions)`.
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating server settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting release builds require was not supplied.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A setting holds a value outside its accepted set.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than release builds accept.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without secure cookies.
    #[error("QUESTLOG_SESSION_SAME_SITE=None requires QUESTLOG_SESSION_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    /// Release builds never run on a generated key.
    #[error("QUESTLOG_SESSION_ALLOW_EPHEMERAL must be false in release builds")]
    EphemeralNotAllowed,
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie.
    pub same_site: SameSite,
}

/// Validate the session portion of `settings` for `mode`.
pub fn session_settings(
    settings: &ServerSettings,
    mode: BuildMode,
) -> Result<SessionSettings, ConfigError> {
    let cookie_secure = cookie_secure(settings, mode)?;
    let same_site = same_site(settings, mode, cookie_secure)?;
    if settings.session_allow_ephemeral && !mode.is_debug() {
        return Err(ConfigError::EphemeralNotAllowed);
    }
    let key = session_key(&settings.session_key_file(), mode, settings.session_allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn cookie_secure(settings: &ServerSettings, mode: BuildMode) -> Result<bool, ConfigError> {
    match settings.session_cookie_secure {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!("QUESTLOG_SESSION_COOKIE_SECURE not set; defaulting to secure");
            Ok(true)
        }
        None => Err(ConfigError::Missing {
            name: "QUESTLOG_SESSION_COOKIE_SECURE",
        }),
    }
}

fn same_site(
    settings: &ServerSettings,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, ConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = settings.session_same_site.as_deref() else {
        if mode.is_debug() {
            warn!("QUESTLOG_SESSION_SAME_SITE not set; using default");
            return Ok(fallback);
        }
        return Err(ConfigError::Missing {
            name: "QUESTLOG_SESSION_SAME_SITE",
        });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SameSite=None without secure cookies; browsers may reject the session");
            Ok(SameSite::None)
        }
        "none" => Err(ConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value, "invalid QUESTLOG_SESSION_SAME_SITE; using default");
            Ok(fallback)
        }
        _ => Err(ConfigError::Invalid {
            name: "QUESTLOG_SESSION_SAME_SITE",
            value: value.to_owned(),
            expected: SAME_SITE_EXPECTED,
        }),
    }
}

fn session_key(path: &PathBuf, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, ConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(ConfigError::KeyTooShort {
                    path: path.clone(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(ConfigError::KeyRead {
            path: path.clone(),
            source,
        }),
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from validated session settings.
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database pool so the Diesel adapters back every port.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    const VARS: [&str; 7] = [
        "QUESTLOG_BIND_ADDR",
        "QUESTLOG_DATABASE_URL",
        "QUESTLOG_DB_MAX_CONNECTIONS",
        "QUESTLOG_SESSION_KEY_FILE",
        "QUESTLOG_SESSION_COOKIE_SECURE",
        "QUESTLOG_SESSION_SAME_SITE",
        "QUESTLOG_SESSION_ALLOW_EPHEMERAL",
    ];

    fn load() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("questlog")]).expect("settings should load")
    }

    fn settings() -> ServerSettings {
        ServerSettings {
            bind_addr: None,
            database_url: None,
            db_max_connections: None,
            session_key_file: Some(std::env::temp_dir().join(format!("missing-{}", Uuid::new_v4()))),
            session_cookie_secure: Some(true),
            session_same_site: Some("Strict".to_owned()),
            session_allow_ephemeral: false,
        }
    }

    fn key_file(len: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("questlog-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write key file");
        path
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        let loaded = load();
        assert_eq!(
            loaded.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal address")
        );
        assert!(loaded.database_url.is_none());
        assert!(!loaded.session_allow_ephemeral);
        assert_eq!(loaded.session_key_file(), PathBuf::from(SESSION_KEY_DEFAULT_PATH));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("QUESTLOG_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("QUESTLOG_DATABASE_URL", Some("postgres://localhost/questlog".to_owned())),
            ("QUESTLOG_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("QUESTLOG_SESSION_COOKIE_SECURE", Some("false".to_owned())),
            ("QUESTLOG_SESSION_SAME_SITE", Some("Lax".to_owned())),
        ]);
        let loaded = load();
        assert_eq!(loaded.bind_addr().expect("address").port(), 9090);
        assert_eq!(loaded.database_url.as_deref(), Some("postgres://localhost/questlog"));
        assert_eq!(loaded.db_max_connections, Some(4));
        assert_eq!(loaded.session_cookie_secure, Some(false));
    }

    #[rstest]
    fn malformed_bind_addresses_are_rejected() {
        let mut loaded = settings();
        loaded.bind_addr = Some("not-an-address".to_owned());
        assert!(matches!(
            loaded.bind_addr(),
            Err(ConfigError::Invalid { name: "QUESTLOG_BIND_ADDR", .. })
        ));
    }

    #[rstest]
    fn release_builds_require_a_readable_key() {
        let error = session_settings(&settings(), BuildMode::Release)
            .err()
            .expect("missing key file");
        assert!(matches!(error, ConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn release_builds_reject_short_keys() {
        let mut loaded = settings();
        let path = key_file(16);
        loaded.session_key_file = Some(path.clone());
        let error = session_settings(&loaded, BuildMode::Release)
            .err()
            .expect("short key");
        std::fs::remove_file(&path).expect("cleanup");
        assert!(matches!(error, ConfigError::KeyTooShort { length: 16, .. }));
    }

    #[rstest]
    fn release_builds_accept_complete_settings() {
        let mut loaded = settings();
        let path = key_file(SESSION_KEY_MIN_LEN);
        loaded.session_key_file = Some(path.clone());
        let session = session_settings(&loaded, BuildMode::Release).expect("valid settings");
        std::fs::remove_file(&path).expect("cleanup");
        assert!(session.cookie_secure);
        assert_eq!(session.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_builds_refuse_ephemeral_keys() {
        let mut loaded = settings();
        loaded.session_allow_ephemeral = true;
        assert!(matches!(
            session_settings(&loaded, BuildMode::Release),
            Err(ConfigError::EphemeralNotAllowed)
        ));
    }

    #[rstest]
    fn release_builds_need_secure_cookies_for_same_site_none() {
        let mut loaded = settings();
        loaded.session_cookie_secure = Some(false);
        loaded.session_same_site = Some("None".to_owned());
        assert!(matches!(
            session_settings(&loaded, BuildMode::Release),
            Err(ConfigError::InsecureSameSiteNone)
        ));
    }

    #[rstest]
    #[case(None, SameSite::Lax)]
    #[case(Some("bogus"), SameSite::Lax)]
    #[case(Some("STRICT"), SameSite::Strict)]
    fn debug_builds_fall_back_and_generate_keys(
        #[case] raw: Option<&str>,
        #[case] expected: SameSite,
    ) {
        let mut loaded = settings();
        loaded.session_cookie_secure = None;
        loaded.session_same_site = raw.map(str::to_owned);
        let session = session_settings(&loaded, BuildMode::Debug).expect("debug defaults");
        assert!(session.cookie_secure);
        assert_eq!(session.same_site, expected);
    }
}
