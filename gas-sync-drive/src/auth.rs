//! OAuth2 credential provider with per-alias token persistence.
//!
//! # Storage layout
//!
//! ```text
//! ~/.gas-sync/
//!   client_secret.json   (user-provided OAuth client, "installed" flavor)
//!   credentials.json     (alias → stored token map — mode 0600)
//! ```
//!
//! The interactive consent flow is split so callers own the prompting:
//! [`Authenticator::consent_url`] produces the URL to visit and
//! [`Authenticator::install_code`] exchanges the pasted verification code.
//! [`CredentialProvider::resolve`] serves cached handles, refreshing expired
//! access tokens when a refresh token is stored.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use gas_sync_core::types::Alias;
use gas_sync_core::{AuthHandle, CredentialProvider, GatewayError};

use crate::error::gateway_err;

/// Directory under the user's home holding client secret and tokens.
pub const CONFIG_DIR_NAME: &str = ".gas-sync";

const CLIENT_SECRET_FILE: &str = "client_secret.json";
const CREDENTIALS_FILE: &str = "credentials.json";

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/drive.metadata",
    "https://www.googleapis.com/auth/drive.scripts",
];

/// Refresh this far ahead of the recorded expiry.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

// ---------------------------------------------------------------------------
// On-disk records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub installed: InstalledSecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl InstalledSecret {
    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(OOB_REDIRECT)
    }
}

/// One persisted token set for an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => at - ChronoDuration::seconds(EXPIRY_MARGIN_SECONDS) <= now,
            None => false,
        }
    }
}

type TokenSet = BTreeMap<Alias, StoredToken>;

/// Wire shape of the token endpoint's response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    /// Refresh responses omit the refresh token; carry the prior one along.
    fn into_stored(self, fallback_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            expires_at: self
                .expires_in
                .map(|seconds| Utc::now() + ChronoDuration::seconds(seconds)),
            token_type: self.token_type.unwrap_or_else(default_token_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Authenticator
// ---------------------------------------------------------------------------

/// Credential provider backed by `~/.gas-sync/`.
///
/// Constructed once per process run; both caches (stored tokens and
/// resolved handles) live inside and are shared through the provider.
#[derive(Debug)]
pub struct Authenticator {
    config_dir: PathBuf,
    secret: ClientSecret,
    agent: ureq::Agent,
    tokens: Mutex<TokenSet>,
    handles: Mutex<HashMap<Alias, AuthHandle>>,
}

impl Authenticator {
    /// Open the default `~/.gas-sync/` configuration.
    pub fn open() -> Result<Self, GatewayError> {
        let home = dirs::home_dir()
            .ok_or_else(|| GatewayError::Config("cannot determine home directory".to_string()))?;
        Self::open_at(home.join(CONFIG_DIR_NAME))
    }

    /// Open an explicit configuration directory (tests use a tempdir).
    pub fn open_at(config_dir: PathBuf) -> Result<Self, GatewayError> {
        std::fs::create_dir_all(&config_dir).map_err(|err| {
            GatewayError::Config(format!(
                "cannot create {}: {err}",
                config_dir.display()
            ))
        })?;
        let secret = load_client_secret(&config_dir)?;
        let tokens = load_tokens(&config_dir);
        Ok(Self {
            config_dir,
            secret,
            agent: ureq::AgentBuilder::new().build(),
            tokens: Mutex::new(tokens),
            handles: Mutex::new(HashMap::new()),
        })
    }

    /// Aliases with stored tokens.
    pub fn aliases(&self) -> Result<Vec<Alias>, GatewayError> {
        Ok(lock(&self.tokens)?.keys().cloned().collect())
    }

    /// The consent URL the user must visit to authorize this client.
    pub fn consent_url(&self) -> Result<String, GatewayError> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.secret.installed.client_id.as_str()),
                ("redirect_uri", self.secret.installed.redirect_uri()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|err| GatewayError::Config(format!("cannot build consent url: {err}")))?;
        Ok(url.into())
    }

    /// Exchange a pasted verification code and persist the token under
    /// `alias`.
    pub fn install_code(&self, alias: &Alias, code: &str) -> Result<(), GatewayError> {
        let token = self.exchange_code(code.trim())?;
        let mut tokens = lock(&self.tokens)?;
        tokens.insert(alias.clone(), token);
        self.persist(&tokens)?;
        lock(&self.handles)?.remove(alias);
        Ok(())
    }

    /// Drop stored credentials for an alias.
    pub fn forget(&self, alias: &Alias) -> Result<(), GatewayError> {
        let mut tokens = lock(&self.tokens)?;
        tokens.remove(alias);
        self.persist(&tokens)?;
        lock(&self.handles)?.remove(alias);
        Ok(())
    }

    fn exchange_code(&self, code: &str) -> Result<StoredToken, GatewayError> {
        let response = self
            .agent
            .post(TOKEN_ENDPOINT)
            .send_form(&[
                ("code", code),
                ("client_id", self.secret.installed.client_id.as_str()),
                ("client_secret", self.secret.installed.client_secret.as_str()),
                ("redirect_uri", self.secret.installed.redirect_uri()),
                ("grant_type", "authorization_code"),
            ])
            .map_err(gateway_err)?;
        let payload: TokenResponse = response
            .into_json()
            .map_err(|err| GatewayError::Payload(err.to_string()))?;
        Ok(payload.into_stored(None))
    }

    fn refresh_grant(&self, refresh_token: &str) -> Result<StoredToken, GatewayError> {
        let response = self
            .agent
            .post(TOKEN_ENDPOINT)
            .send_form(&[
                ("refresh_token", refresh_token),
                ("client_id", self.secret.installed.client_id.as_str()),
                ("client_secret", self.secret.installed.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .map_err(gateway_err)?;
        let payload: TokenResponse = response
            .into_json()
            .map_err(|err| GatewayError::Payload(err.to_string()))?;
        Ok(payload.into_stored(Some(refresh_token.to_string())))
    }

    /// Atomically rewrite `credentials.json` (mode 0600).
    fn persist(&self, tokens: &TokenSet) -> Result<(), GatewayError> {
        let path = self.config_dir.join(CREDENTIALS_FILE);
        let tmp = self.config_dir.join(format!("{CREDENTIALS_FILE}.tmp"));
        let json = serde_json::to_string_pretty(tokens)
            .map_err(|err| GatewayError::Config(format!("cannot serialize tokens: {err}")))?;
        let write = || -> std::io::Result<()> {
            std::fs::write(&tmp, json.as_bytes())?;
            set_file_permissions(&tmp)?;
            std::fs::rename(&tmp, &path)
        };
        write().map_err(|err| {
            GatewayError::Config(format!("cannot persist {}: {err}", path.display()))
        })
    }
}

impl CredentialProvider for Authenticator {
    fn resolve(&self, alias: &Alias) -> Result<AuthHandle, GatewayError> {
        if let Some(handle) = lock(&self.handles)?.get(alias) {
            return Ok(handle.clone());
        }

        let mut tokens = lock(&self.tokens)?;
        let stored = tokens.get(alias).cloned().ok_or_else(|| {
            GatewayError::Credential {
                alias: alias.clone(),
                message: "no stored token; run `gas-sync authorize -u <alias>` first".to_string(),
            }
        })?;

        let token = if stored.is_expired(Utc::now()) {
            let refresh_token = stored.refresh_token.clone().ok_or_else(|| {
                GatewayError::Credential {
                    alias: alias.clone(),
                    message: "access token expired and no refresh token stored; re-run authorize"
                        .to_string(),
                }
            })?;
            log::debug!("refreshing expired access token for alias '{alias}'");
            let fresh = self.refresh_grant(&refresh_token)?;
            tokens.insert(alias.clone(), fresh.clone());
            self.persist(&tokens)?;
            fresh
        } else {
            stored
        };

        let handle = AuthHandle::new(token.access_token);
        lock(&self.handles)?.insert(alias.clone(), handle.clone());
        Ok(handle)
    }
}

// ---------------------------------------------------------------------------
// Loading helpers
// ---------------------------------------------------------------------------

fn load_client_secret(config_dir: &Path) -> Result<ClientSecret, GatewayError> {
    let path = config_dir.join(CLIENT_SECRET_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(GatewayError::Config(format!(
                "no OAuth client credentials at {}; create one in the cloud console \
                 and save it there",
                path.display()
            )));
        }
        Err(err) => {
            return Err(GatewayError::Config(format!(
                "cannot read {}: {err}",
                path.display()
            )));
        }
    };
    serde_json::from_str(&contents).map_err(|err| {
        GatewayError::Config(format!("invalid {}: {err}", path.display()))
    })
}

/// Missing or unparsable credentials are treated as an empty token set; the
/// user just has to authorize again.
fn load_tokens(config_dir: &Path) -> TokenSet {
    let path = config_dir.join(CREDENTIALS_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => return TokenSet::new(),
    };
    match serde_json::from_str(&contents) {
        Ok(tokens) => tokens,
        Err(err) => {
            log::warn!("ignoring unparsable {}: {err}", path.display());
            TokenSet::new()
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<MutexGuard<'a, T>, GatewayError> {
    mutex
        .lock()
        .map_err(|_| GatewayError::Config("credential cache lock poisoned".to_string()))
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SECRET: &str = r#"{
        "installed": {
            "client_id": "id-123.apps.example.com",
            "client_secret": "hunter2",
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]
        }
    }"#;

    fn config_dir_with_secret() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CLIENT_SECRET_FILE), SECRET).expect("write secret");
        dir
    }

    fn token(access: &str) -> StoredToken {
        StoredToken {
            access_token: access.to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(Utc::now() + ChronoDuration::hours(1)),
            token_type: default_token_type(),
        }
    }

    #[test]
    fn open_without_client_secret_is_a_config_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = Authenticator::open_at(dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains(CLIENT_SECRET_FILE));
    }

    #[test]
    fn open_with_invalid_client_secret_is_a_config_error() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CLIENT_SECRET_FILE), "{]").expect("write");
        let err = Authenticator::open_at(dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn unparsable_credentials_fall_back_to_empty_token_set() {
        let dir = config_dir_with_secret();
        std::fs::write(dir.path().join(CREDENTIALS_FILE), "garbage").expect("write");
        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        assert!(auth.aliases().expect("aliases").is_empty());
    }

    #[test]
    fn aliases_reflect_stored_tokens() {
        let dir = config_dir_with_secret();
        let mut tokens = TokenSet::new();
        tokens.insert(Alias::from("default"), token("a"));
        tokens.insert(Alias::from("work"), token("b"));
        std::fs::write(
            dir.path().join(CREDENTIALS_FILE),
            serde_json::to_string(&tokens).expect("serialize"),
        )
        .expect("write");

        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        assert_eq!(
            auth.aliases().expect("aliases"),
            vec![Alias::from("default"), Alias::from("work")]
        );
    }

    #[test]
    fn resolve_returns_cached_handle_for_valid_token() {
        let dir = config_dir_with_secret();
        let mut tokens = TokenSet::new();
        tokens.insert(Alias::from("default"), token("access-1"));
        std::fs::write(
            dir.path().join(CREDENTIALS_FILE),
            serde_json::to_string(&tokens).expect("serialize"),
        )
        .expect("write");

        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        let handle = auth.resolve(&Alias::from("default")).expect("resolve");
        assert_eq!(handle.bearer(), "access-1");

        // Second resolution serves the process-wide cache.
        let again = auth.resolve(&Alias::from("default")).expect("resolve again");
        assert_eq!(again.bearer(), "access-1");
    }

    #[test]
    fn resolve_unknown_alias_is_a_credential_error() {
        let dir = config_dir_with_secret();
        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        let err = auth.resolve(&Alias::from("nobody")).unwrap_err();
        assert!(matches!(err, GatewayError::Credential { .. }));
    }

    #[test]
    fn expired_token_without_refresh_is_a_credential_error() {
        let dir = config_dir_with_secret();
        let mut tokens = TokenSet::new();
        tokens.insert(
            Alias::from("default"),
            StoredToken {
                access_token: "stale".to_string(),
                refresh_token: None,
                expires_at: Some(Utc::now() - ChronoDuration::hours(1)),
                token_type: default_token_type(),
            },
        );
        std::fs::write(
            dir.path().join(CREDENTIALS_FILE),
            serde_json::to_string(&tokens).expect("serialize"),
        )
        .expect("write");

        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        let err = auth.resolve(&Alias::from("default")).unwrap_err();
        assert!(matches!(err, GatewayError::Credential { .. }));
    }

    #[test]
    fn forget_removes_alias_and_persists() {
        let dir = config_dir_with_secret();
        let mut tokens = TokenSet::new();
        tokens.insert(Alias::from("default"), token("a"));
        std::fs::write(
            dir.path().join(CREDENTIALS_FILE),
            serde_json::to_string(&tokens).expect("serialize"),
        )
        .expect("write");

        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        auth.forget(&Alias::from("default")).expect("forget");
        assert!(auth.aliases().expect("aliases").is_empty());

        let reopened = Authenticator::open_at(dir.path().to_path_buf()).expect("reopen");
        assert!(reopened.aliases().expect("aliases").is_empty());
    }

    #[test]
    fn consent_url_carries_client_and_scopes() {
        let dir = config_dir_with_secret();
        let auth = Authenticator::open_at(dir.path().to_path_buf()).expect("open");
        let url = auth.consent_url().expect("url");
        assert!(url.starts_with(AUTH_ENDPOINT));
        assert!(url.contains("client_id=id-123.apps.example.com"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("drive.scripts"));
    }

    #[test]
    fn expiry_honors_margin() {
        let now = Utc::now();
        let just_inside = StoredToken {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Some(now + ChronoDuration::seconds(EXPIRY_MARGIN_SECONDS + 30)),
            token_type: default_token_type(),
        };
        assert!(!just_inside.is_expired(now));

        let inside_margin = StoredToken {
            expires_at: Some(now + ChronoDuration::seconds(EXPIRY_MARGIN_SECONDS - 30)),
            ..just_inside.clone()
        };
        assert!(inside_margin.is_expired(now));
    }

    #[test]
    fn stored_token_round_trips_without_optional_fields() {
        let raw = r#"{"access_token": "a"}"#;
        let token: StoredToken = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(token.token_type, "Bearer");
        assert!(token.refresh_token.is_none());
        assert!(!token.is_expired(Utc::now()));
    }
}
