use crate::components::endpoints::GOOGLE_SCOPES;
use crate::error::{auth_error, AppResult, Error};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// How long to wait for the browser to come back
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Consent page URL for the authorization-code flow
pub fn authorization_url(auth_url: &str, client_id: &str, redirect_uri: &str, state: &str) -> AppResult<Url> {
    let mut url = Url::parse(auth_url).map_err(|e| auth_error(&format!("Failed to parse URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", &GOOGLE_SCOPES.join(" "))
        .append_pair("state", state);

    Ok(url)
}

/// What the browser brought back to the loopback listener
#[derive(Debug, PartialEq)]
pub enum Callback {
    Code(String),
    /// Not the redirect (favicon and the like)
    Unrelated,
}

/// Pull the authorization code out of a redirect request path
pub fn parse_callback(request_path: &str, expected_state: &str) -> AppResult<Callback> {
    let url = Url::parse(&format!("http://localhost{}", request_path))
        .map_err(|e| auth_error(&format!("Unreadable callback: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(auth_error(&format!("Consent was not granted: {}", error)));
    }

    let Some(code) = code else {
        return Ok(Callback::Unrelated);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in OAuth callback"));
    }

    Ok(Callback::Code(code))
}

/// Listen on the loopback port until the redirect arrives and return the code
pub async fn wait_for_code(port: u16, expected_state: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || receive_code(port, &expected_state))
        .await
        .map_err(|e| Error::Other(format!("OAuth listener task failed: {}", e)))?
}

fn receive_code(port: u16, expected_state: &str) -> AppResult<String> {
    let server = tiny_http::Server::http(("127.0.0.1", port))
        .map_err(|e| auth_error(&format!("Failed to listen on port {}: {}", port, e)))?;
    info!("Waiting for authorization callback on port {}", port);

    let deadline = Instant::now() + CALLBACK_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(auth_error("Timed out waiting for the browser to finish signing in"));
        }

        let Some(request) = server.recv_timeout(remaining)? else {
            continue;
        };

        match parse_callback(request.url(), expected_state) {
            Ok(Callback::Code(code)) => {
                let response =
                    tiny_http::Response::from_string("Authorization successful! You can close this window.");
                request.respond(response)?;
                return Ok(code);
            }
            Ok(Callback::Unrelated) => {
                debug!("Ignoring request to {}", request.url());
                request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)))?;
            }
            Err(e) => {
                let response = tiny_http::Response::from_string(format!("Authorization failed: {}", e));
                request.respond(response)?;
                return Err(e);
            }
        }
    }
}
