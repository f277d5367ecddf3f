//! OAuth flows on the client

use super::credentials::{write_client_file, write_token_file};
use super::types::{AppRegistration, LoginRequest, TokenResponse};
use crate::client::Mastodon;
use crate::config::protocolize;
use crate::decode::Value;
use crate::error::{Error, Result};
use crate::params::Params;
use crate::types::Method;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct AppResponse {
    client_id: String,
    client_secret: String,
}

impl Mastodon {
    /// Register a new application on the instance at `api_base_url`
    ///
    /// Returns the client id and secret. Registration does not need an
    /// existing client, so this is an associated function.
    pub async fn create_app(
        api_base_url: &str,
        registration: &AppRegistration,
        timeout: Duration,
    ) -> Result<(String, String)> {
        let url = format!("{}/api/v1/apps", protocolize(api_base_url));
        let mut form = vec![
            ("client_name", registration.client_name.clone()),
            ("scopes", registration.scopes.join(" ")),
            ("redirect_uris", registration.redirect_uris.clone()),
        ];
        if let Some(website) = &registration.website {
            form.push(("website", website.clone()));
        }

        debug!("Registering app '{}' at {}", registration.client_name, url);
        let response = reqwest::Client::new()
            .post(&url)
            .timeout(timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::transport("Could not complete request", e))?;
        let app: AppResponse = response
            .json()
            .await
            .map_err(|e| Error::transport("Could not complete request", e))?;

        if let Some(path) = &registration.to_file {
            write_client_file(path, &app.client_id, &app.client_secret)?;
        }

        Ok((app.client_id, app.client_secret))
    }

    /// URL the user visits to grant this client access
    ///
    /// Falls back to the configured client id when `client_id` is `None`.
    pub fn auth_request_url(
        &self,
        client_id: Option<&str>,
        redirect_uri: &str,
        scopes: &[&str],
    ) -> String {
        let client_id = client_id
            .or(self.http.credentials().client_id.as_deref())
            .unwrap_or_default();
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &scopes.join(" "))
            .finish();
        format!("{}/oauth/authorize?{query}", self.api_base_url())
    }

    /// Obtain an access token and install it on this client
    ///
    /// Fails with [`Error::IllegalArgument`] when the grant is refused and
    /// with [`Error::Api`] when the granted scopes differ from the requested
    /// ones. Returns the access token.
    pub async fn log_in(&mut self, request: LoginRequest) -> Result<String> {
        use super::types::Grant;

        let mut params = match &request.grant {
            Grant::Password { username, password } => Params::new()
                .set("username", username.as_str())
                .set("password", password.as_str()),
            Grant::AuthorizationCode { code } => Params::new().set("code", code.as_str()),
            Grant::RefreshToken { refresh_token } => {
                Params::new().set("refresh_token", refresh_token.as_str())
            }
        };
        params = params
            .set("grant_type", request.grant.grant_type())
            .set("redirect_uri", request.redirect_uri.as_str())
            .set_opt("client_id", self.http.credentials().client_id.clone())
            .set_opt("client_secret", self.http.credentials().client_secret.clone())
            .set("scope", request.scopes.join(" "));

        let context = request.grant.failure_context();
        let token = self
            .http
            .execute(Method::POST, "/oauth/token", &params, &[], false)
            .await
            .and_then(|value| parse_token(&value))
            .map_err(|e| Error::illegal_argument(format!("{context}: {e}")))?;

        let credentials = self.http.credentials_mut();
        credentials.set_access_token(Some(token.access_token.clone()));
        credentials.set_refresh_token(token.refresh_token.clone());
        credentials.set_token_expires_in(token.expires_in.unwrap_or(0));

        let mut requested = request.scopes.clone();
        requested.sort();
        let granted = token.granted_scopes();
        if requested != granted {
            return Err(Error::api(
                200,
                "OK",
                format!(
                    "Granted scopes \"{}\" differ from requested scopes \"{}\".",
                    granted.join(" "),
                    requested.join(" ")
                ),
            ));
        }

        if let Some(path) = &request.to_file {
            write_token_file(path, &token.access_token)?;
        }

        info!("Logged in with {} grant", request.grant.grant_type());
        Ok(token.access_token)
    }

    /// Whether the locally tracked token expiry has passed
    pub fn token_expired(&self) -> bool {
        self.http.credentials().token_expired()
    }

    /// Refresh token from the last login, if the server issued one
    pub fn refresh_token(&self) -> Option<&str> {
        self.http.credentials().refresh_token()
    }
}

fn parse_token(value: &Value) -> Result<TokenResponse> {
    value
        .as_record()
        .ok_or_else(|| Error::Other(format!("expected a token object, got {}", value.kind())))?
        .deserialize()
}
