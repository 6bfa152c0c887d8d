use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use log::debug;
use maplit::hashmap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stack_string::{format_sstr, StackString};
use std::collections::HashMap;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

use health_lib::{errors::HealthError as Error, health_config::HealthConfig};

pub const FITNESS_BODY_WRITE_SCOPE: &str = "https://www.googleapis.com/auth/fitness.body.write";

/// Supplies the authorization code the operator obtains by visiting
/// `auth_url`.
#[allow(async_fn_in_trait)]
pub trait AuthCodeProvider {
    async fn get_auth_code(&self, auth_url: &Url) -> Result<StackString, Error>;
}

/// Prints the url and reads the code from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl AuthCodeProvider for ConsolePrompt {
    async fn get_auth_code(&self, auth_url: &Url) -> Result<StackString, Error> {
        let mut out = stdout();
        out.write_all(format_sstr!("Visit the URL for the auth dialog: {auth_url}\n").as_bytes())
            .await?;
        out.write_all(b"Enter the code: ").await?;
        out.flush().await?;

        let mut line = String::new();
        BufReader::new(stdin()).read_line(&mut line).await?;
        let code = line.trim();
        if code.is_empty() {
            return Err(Error::StaticCustomError("No authorization code entered"));
        }
        Ok(code.into())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: StackString,
    pub token_type: StackString,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<StackString>,
    #[serde(default)]
    pub scope: Option<StackString>,
}

impl AccessToken {
    #[must_use]
    pub fn bearer(access_token: &str) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".into(),
            expires_in: None,
            refresh_token: None,
            scope: None,
        }
    }

    #[must_use]
    pub fn auth_header(&self) -> StackString {
        format_sstr!("Bearer {}", self.access_token)
    }
}

/// Authorization code flow against Google's oauth endpoints, client
/// credentials are sent in the token request body.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    client: Client,
    client_id: StackString,
    client_secret: StackString,
    auth_url: Url,
    token_url: Url,
    redirect_url: StackString,
}

impl GoogleOAuth {
    /// # Errors
    /// Return error if a configured url doesn't parse or the http client can't
    /// be built
    pub fn new(
        config: &HealthConfig,
        client_id: StackString,
        client_secret: StackString,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: Client::builder().build()?,
            client_id,
            client_secret,
            auth_url: Url::parse(config.google_auth_url.as_str())?,
            token_url: Url::parse(config.google_token_url.as_str())?,
            redirect_url: config.google_redirect_url.clone(),
        })
    }

    fn get_random_string() -> StackString {
        let random_bytes: [u8; 16] = rand::random();
        URL_SAFE_NO_PAD.encode(random_bytes).into()
    }

    #[must_use]
    pub fn get_auth_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", self.client_id.as_str())
            .append_pair("redirect_uri", self.redirect_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", FITNESS_BODY_WRITE_SCOPE)
            .append_pair("state", state);
        url
    }

    pub fn get_token_form<'a>(&'a self, code: &'a str) -> HashMap<&'static str, &'a str> {
        hashmap! {
            "grant_type" => "authorization_code",
            "code" => code,
            "redirect_uri" => self.redirect_url.as_str(),
            "client_id" => self.client_id.as_str(),
            "client_secret" => self.client_secret.as_str(),
        }
    }

    /// # Errors
    /// Return error if the token endpoint rejects the code or the response
    /// can't be decoded
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error> {
        let data = self.get_token_form(code);
        debug!("POST {}", self.token_url);
        let resp = self
            .client
            .post(self.token_url.clone())
            .form(&data)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            resp.json().await.map_err(Into::into)
        } else {
            Err(Error::ApiError {
                status: status.as_u16(),
                body: resp.text().await?.into(),
            })
        }
    }

    /// Show the authorization url through `provider`, then trade the code it
    /// returns for an access token.
    /// # Errors
    /// Return error if the provider fails or the exchange fails
    pub async fn authorize<P: AuthCodeProvider>(&self, provider: &P) -> Result<AccessToken, Error> {
        let state = Self::get_random_string();
        let auth_url = self.get_auth_url(state.as_str());
        let code = provider.get_auth_code(&auth_url).await?;
        self.exchange_code(code.as_str()).await
    }
}
