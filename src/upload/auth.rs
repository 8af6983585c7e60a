use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SiftError;

/// Only library additions are requested; nothing here can read the library.
const SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.appendonly";

/// Tokens this close to expiry are refreshed instead of used.
const EXPIRY_SKEW_SECS: i64 = 60;

/// The "installed application" client secret issued by the API console.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientSecret {
    pub installed: InstalledClient,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InstalledClient {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Access/refresh token pair persisted between runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Usable without a refresh round trip.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_SKEW_SECS) > now
    }
}

/// What the token endpoint returns for both grant types.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Where the client secret is expected (user config directory).
pub fn default_secret_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sift").join("client_secret.json"))
}

/// Where the token lands between runs (user data directory).
pub fn default_token_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("sift").join("token.json"))
}

/// Produces access tokens: stored, refreshed, or interactively granted,
/// in that order of preference.
pub struct Authenticator {
    client: reqwest::blocking::Client,
    secret: ClientSecret,
    token_path: PathBuf,
}

impl Authenticator {
    pub fn new(secret_path: &Path, token_path: PathBuf) -> Result<Self, SiftError> {
        let secret = load_client_secret(secret_path)?;
        Ok(Self {
            client: reqwest::blocking::Client::new(),
            secret,
            token_path,
        })
    }

    /// Produce a usable access token. When the interactive flow is needed,
    /// `notify_consent_url` receives the URL the user must open; this call
    /// then blocks until the browser redirect arrives.
    pub fn obtain(&self, notify_consent_url: impl Fn(&str)) -> Result<String, SiftError> {
        if let Some(stored) = self.load_token() {
            if stored.is_fresh(Utc::now()) {
                debug!("Using stored access token");
                return Ok(stored.access_token);
            }
            if let Some(refresh_token) = stored.refresh_token.as_deref() {
                match self.refresh(refresh_token) {
                    Ok(token) => return Ok(token.access_token),
                    Err(e) => warn!("Token refresh failed, reauthorizing: {}", e),
                }
            }
        }
        let token = self.authorize_interactive(notify_consent_url)?;
        Ok(token.access_token)
    }

    fn load_token(&self) -> Option<StoredToken> {
        let raw = std::fs::read_to_string(&self.token_path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable token file: {}", e);
                None
            }
        }
    }

    fn store_token(&self, token: &StoredToken) -> Result<(), SiftError> {
        let store_err = |e: std::io::Error| SiftError::TokenStore {
            path: self.token_path.clone(),
            source: e,
        };
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent).map_err(store_err)?;
        }
        let json = serde_json::to_string_pretty(token).map_err(|e| SiftError::CredentialParse {
            path: self.token_path.clone(),
            source: e,
        })?;
        std::fs::write(&self.token_path, json).map_err(store_err)
    }

    /// Trade the refresh token for a new access token. The response usually
    /// omits the refresh token, so the old one is carried over.
    fn refresh(&self, refresh_token: &str) -> Result<StoredToken, SiftError> {
        debug!("Refreshing access token");
        let params = [
            ("client_id", self.secret.installed.client_id.as_str()),
            ("client_secret", self.secret.installed.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let parsed = self.token_request(&params)?;

        let token = StoredToken {
            access_token: parsed.access_token,
            refresh_token: parsed
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };
        self.store_token(&token)?;
        Ok(token)
    }

    /// Full authorization-code flow: bind a loopback listener, hand the
    /// consent URL to the caller, wait for the single redirect, exchange
    /// the code, persist the result.
    fn authorize_interactive(&self, notify: impl Fn(&str)) -> Result<StoredToken, SiftError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .map_err(|e| SiftError::Auth(format!("could not bind loopback listener: {}", e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| SiftError::Auth(format!("no local address: {}", e)))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}", port);

        let consent_url = reqwest::Url::parse_with_params(
            &self.secret.installed.auth_uri,
            &[
                ("client_id", self.secret.installed.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| SiftError::Auth(format!("invalid auth_uri: {}", e)))?;

        info!("Waiting for authorization in the browser");
        notify(consent_url.as_str());

        let code = wait_for_redirect(&listener)?;

        let params = [
            ("client_id", self.secret.installed.client_id.as_str()),
            ("client_secret", self.secret.installed.client_secret.as_str()),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let parsed = self.token_request(&params)?;

        let token = StoredToken {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        };
        self.store_token(&token)?;
        info!("Authorization complete");
        Ok(token)
    }

    fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, SiftError> {
        let response = self
            .client
            .post(&self.secret.installed.token_uri)
            .form(params)
            .send()
            .map_err(|e| SiftError::TokenRequest { source: e })?;

        if !response.status().is_success() {
            return Err(SiftError::TokenRejected {
                status: response.status().as_u16(),
            });
        }
        response
            .json()
            .map_err(|e| SiftError::TokenRequest { source: e })
    }
}

fn load_client_secret(path: &Path) -> Result<ClientSecret, SiftError> {
    let raw = std::fs::read_to_string(path).map_err(|e| SiftError::CredentialRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&raw).map_err(|e| SiftError::CredentialParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Accept the one redirect the consent screen sends back and pull the
/// authorization code out of its query string. A small page is served so
/// the browser tab does not hang.
fn wait_for_redirect(listener: &TcpListener) -> Result<String, SiftError> {
    let (mut stream, _) = listener
        .accept()
        .map_err(|e| SiftError::Auth(format!("redirect never arrived: {}", e)))?;

    let mut request_line = String::new();
    {
        let mut reader = BufReader::new(&stream);
        reader
            .read_line(&mut request_line)
            .map_err(|e| SiftError::Auth(format!("could not read redirect: {}", e)))?;
    }

    let code = parse_code(&request_line);

    let body = if code.is_some() {
        "Authorization received. You can close this tab and return to Sift."
    } else {
        "Authorization failed. You can close this tab."
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());

    code.ok_or_else(|| SiftError::Auth("redirect carried no authorization code".to_string()))
}

/// Extract the (percent-decoded) `code` parameter from the request line of
/// the loopback redirect.
fn parse_code(request_line: &str) -> Option<String> {
    let target = request_line.split_whitespace().nth(1)?;
    let url = reqwest::Url::parse(&format!("http://127.0.0.1{}", target)).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
}
