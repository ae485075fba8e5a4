//! HTTP exchange with the NASC server.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use tracing::debug;

/// Path every NASC request is posted to.
pub const NASC_PATH: &str = "/ac";

/// Client certificate presented to the server, both parts DER-encoded.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientCertificate {
    pub certificate: Vec<u8>,
    /// PKCS#1 RSA private key
    pub private_key: Vec<u8>,
}

impl core::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("certificate", &format_args!("{} bytes", self.certificate.len()))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ClientCertificate {
    pub fn is_empty(&self) -> bool {
        self.certificate.is_empty() || self.private_key.is_empty()
    }

    /// Certificate and key as one PEM bundle.
    pub fn to_pem(&self) -> Vec<u8> {
        let mut pem = String::new();
        push_pem_block(&mut pem, "CERTIFICATE", &self.certificate);
        push_pem_block(&mut pem, "RSA PRIVATE KEY", &self.private_key);
        pem.into_bytes()
    }
}

fn push_pem_block(out: &mut String, label: &str, der: &[u8]) {
    let encoded = base64::engine::general_purpose::STANDARD.encode(der);
    out.push_str("-----BEGIN ");
    out.push_str(label);
    out.push_str("-----\n");
    for line in encoded.as_bytes().chunks(64) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(label);
    out.push_str("-----\n");
}

/// A fully assembled NASC request.
#[derive(Debug, Clone)]
pub struct NascRequest {
    /// Server host name, without scheme
    pub host: String,
    pub headers: Vec<(&'static str, String)>,
    /// `application/x-www-form-urlencoded` body
    pub body: String,
    pub certificate: ClientCertificate,
}

impl NascRequest {
    pub fn url(&self) -> String {
        format!("https://{}{}", self.host, NASC_PATH)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw server answer.
#[derive(Debug, Clone, Default)]
pub struct NascResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Performs the HTTP exchange for a NASC request.
#[async_trait]
pub trait NascTransport: Send + Sync {
    async fn post(&self, request: &NascRequest) -> Result<NascResponse, TransportError>;
}

/// HTTPS transport presenting the request's client certificate.
///
/// The server certificate is not verified; NASC servers present certificates chained to the
/// console's own root.
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    timeout: Duration,
}

impl HttpsTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self, certificate: &ClientCertificate) -> Result<reqwest::Client, TransportError> {
        let identity =
            reqwest::Identity::from_pem(&certificate.to_pem()).map_err(TransportError::Identity)?;
        reqwest::Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .danger_accept_invalid_certs(true)
            .connect_timeout(self.timeout)
            .timeout(self.timeout)
            .build()
            .map_err(TransportError::Client)
    }
}

impl Default for HttpsTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl NascTransport for HttpsTransport {
    async fn post(&self, request: &NascRequest) -> Result<NascResponse, TransportError> {
        let client = self.client(&request.certificate)?;

        let mut builder = client.post(request.url());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        debug!(url = %request.url(), "posting NASC request");
        let response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(TransportError::Request)?
            .to_vec();

        Ok(NascResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Error performing the HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Client certificate or key could not be loaded
    #[error("invalid client identity")]
    Identity(#[source] reqwest::Error),

    /// HTTP client could not be configured
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Request could not be sent or the response not read
    #[error("request failed")]
    Request(#[source] reqwest::Error),

    /// Server could not be reached
    #[error("server unreachable: {0}")]
    Unreachable(String),
}
