//! Client for the mood API
//!
//! Three read-only endpoints, each a single blocking request: no retries,
//! no backoff, no caching. Failures come back as [`ApiError`]; the dashboard
//! logs and discards them.

pub mod mock;
pub mod types;

use crate::config::ApiConfig;
use mock::MockSource;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use types::{CountryDetail, GlobalMood, SpikeList};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {status}: {path}")]
    Status { status: u16, path: String },

    #[error("network error on {path}: {message}")]
    Transport { path: String, message: String },

    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("country not found: {0}")]
    NotFound(String),
}

/// The three reads the dashboard needs
pub trait MoodApi {
    fn fetch_global_mood(&self) -> Result<GlobalMood, ApiError>;
    fn fetch_country_detail(&self, country_code: &str) -> Result<CountryDetail, ApiError>;
    fn fetch_spikes(&self) -> Result<SpikeList, ApiError>;
}

/// Path of the detail endpoint; the code is trimmed, upper-cased and escaped
pub fn country_path(country_code: &str) -> String {
    let code = country_code.trim().to_uppercase();
    format!("/mood/country/{}", urlencoding::encode(&code))
}

/// HTTP implementation backed by a `ureq` agent
pub struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: builder.build(),
        }
    }

    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self.agent.get(&url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => ApiError::Status {
                status,
                path: path.to_string(),
            },
            ureq::Error::Transport(t) => ApiError::Transport {
                path: path.to_string(),
                message: t.to_string(),
            },
        })?;

        response.into_json::<T>().map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl MoodApi for HttpClient {
    fn fetch_global_mood(&self) -> Result<GlobalMood, ApiError> {
        self.get("/mood/global")
    }

    fn fetch_country_detail(&self, country_code: &str) -> Result<CountryDetail, ApiError> {
        self.get(&country_path(country_code))
    }

    fn fetch_spikes(&self) -> Result<SpikeList, ApiError> {
        self.get("/spikes")
    }
}

/// Pick the data source the configuration asks for
pub fn connect(config: &ApiConfig) -> Box<dyn MoodApi> {
    if config.use_mock {
        debug!("using mock data source");
        Box::new(MockSource::new())
    } else {
        let timeout = config.timeout_secs.map(Duration::from_secs);
        Box::new(HttpClient::new(&config.url, timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single canned HTTP response and hand back the request line
    fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn country_path_uppercases_and_escapes() {
        assert_eq!(country_path("us"), "/mood/country/US");
        assert_eq!(country_path(" gb "), "/mood/country/GB");
        assert_eq!(country_path("a/b"), "/mood/country/A%2FB");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = HttpClient::new("http://localhost:8000/", None);
        assert_eq!(client.url("/spikes"), "http://localhost:8000/spikes");
    }

    #[test]
    fn fetches_global_mood() {
        let body = r##"{"updated_at": "2025-06-01T12:00:00", "countries": [
            {"country_code": "BR", "country_name": "Brazil", "mood_score": 0.62,
             "mood_label": "Happy", "color_code": "#22c55e", "date": "2025-06-01"}]}"##;
        let (base, server) = serve_once("200 OK", body);
        let client = HttpClient::new(&base, Some(Duration::from_secs(5)));
        let global = client.fetch_global_mood().unwrap();
        assert_eq!(global.countries[0].country_code, "BR");
        assert_eq!(server.join().unwrap(), "GET /mood/global HTTP/1.1");
    }

    #[test]
    fn detail_request_uses_uppercased_code() {
        let body = r##"{"country_code": "JP", "country_name": "Japan", "mood_score": 0.1,
            "mood_label": "Calm", "color_code": "#38bdf8", "trend": [], "spike_active": true}"##;
        let (base, server) = serve_once("200 OK", body);
        let client = HttpClient::new(&base, Some(Duration::from_secs(5)));
        let detail = client.fetch_country_detail("jp").unwrap();
        assert!(detail.spike_active);
        assert_eq!(server.join().unwrap(), "GET /mood/country/JP HTTP/1.1");
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (base, server) = serve_once("404 Not Found", r#"{"detail": "Country not found"}"#);
        let client = HttpClient::new(&base, Some(Duration::from_secs(5)));
        let err = client.fetch_country_detail("zz").unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, ref path } if path == "/mood/country/ZZ"));
        assert_eq!(err.to_string(), "API error 404: /mood/country/ZZ");
        server.join().unwrap();
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", "not json");
        let client = HttpClient::new(&base, Some(Duration::from_secs(5)));
        let err = client.fetch_spikes().unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = HttpClient::new(&format!("http://127.0.0.1:{}", port), Some(Duration::from_secs(2)));
        assert!(matches!(client.fetch_spikes(), Err(ApiError::Transport { .. })));
    }

    #[test]
    fn connect_honours_mock_flag() {
        let config = ApiConfig {
            use_mock: true,
            ..ApiConfig::default()
        };
        let api = connect(&config);
        assert!(!api.fetch_global_mood().unwrap().countries.is_empty());
    }
}
