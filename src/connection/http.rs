use crate::configuration::constants::defaults;
use bytes::Bytes;
use reqwest::blocking::{Client, Response};
use reqwest::{Error, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Admin credential pair for the authenticated areas of the target server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: String, password: String) -> Self {
        Self { user, password }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user: defaults::ADMIN_USER.to_owned(),
            password: defaults::ADMIN_PASSWORD.to_owned(),
        }
    }
}

/// Status code and raw payload of a completed request. The payload is kept
/// as opaque bytes; callers decide whether it is structured.
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    payload: Bytes,
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Blocking HTTP client bound to a single target host and port. All suite
/// traffic goes through this wrapper so that timing and payload handling
/// stay in one place.
pub struct RemoteClient {
    base: String,
    client: Client,
    credentials: Credentials,
}

impl RemoteClient {
    pub fn new(host: &str, port: u16, credentials: Credentials) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base: format!("http://{}:{}", host, port),
            client,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse, Error> {
        let now = Instant::now();
        let response = self.client.get(self.url(path)).query(query).send()?;
        Self::finish("GET", path, response, now)
    }

    pub fn post_form(&self, path: &str, params: &[(&str, &str)]) -> Result<HttpResponse, Error> {
        let now = Instant::now();
        let response = self.client.post(self.url(path)).form(params).send()?;
        Self::finish("POST", path, response, now)
    }

    pub fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse, Error> {
        let now = Instant::now();
        let response = self.client.delete(self.url(path)).query(query).send()?;
        Self::finish("DELETE", path, response, now)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn finish(
        method: &str,
        path: &str,
        response: Response,
        started: Instant,
    ) -> Result<HttpResponse, Error> {
        let status = response.status();
        let payload = response.bytes()?;
        debug!(
            "{} {} -> {} ({} bytes) in {} ms",
            method,
            path,
            status,
            payload.len(),
            started.elapsed().as_millis()
        );
        Ok(HttpResponse { status, payload })
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_json_payload_is_parsed_into_requested_shape() {
        let response = HttpResponse {
            status: StatusCode::OK,
            payload: Bytes::from_static(b"{\"success\":true}"),
        };
        let parsed: serde_json::Value = response.json().unwrap();

        assert_eq!(parsed["success"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_malformed_payload_is_a_parse_error() {
        let response = HttpResponse {
            status: StatusCode::OK,
            payload: Bytes::from_static(b"<html>not json</html>"),
        };
        let parsed: Result<serde_json::Value, _> = response.json();

        assert!(parsed.is_err());
    }
}
