//! NASC login request assembly and response interpretation.

use tracing::{debug, info};

use crate::{
    codec::decode_form,
    params::NascParams,
    transport::{ClientCertificate, NascRequest, NascResponse, NascTransport, TransportError},
};

/// Server result code for a successful login.
pub const RESULT_SUCCESS: i32 = 1;

/// Builds and performs one NASC request.
#[derive(Debug, Clone)]
pub struct NascClient {
    host: String,
    certificate: ClientCertificate,
    params: NascParams,
}

impl NascClient {
    pub fn new(host: impl Into<String>, certificate: ClientCertificate) -> Self {
        Self {
            host: host.into(),
            certificate,
            params: NascParams::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Encodes and appends a request parameter.
    pub fn set_parameter(&mut self, key: &str, value: impl AsRef<[u8]>) {
        self.params.set(key, value);
    }

    pub fn params(&self) -> &NascParams {
        &self.params
    }

    /// Assembles the HTTP request.
    ///
    /// `X-GameId` and `User-Agent` are derived from the `gameid` and `fpdver` parameters when
    /// present.
    pub fn build_request(&self) -> NascRequest {
        let mut headers = Vec::with_capacity(3);
        if let Some(game_id) = self.params.get("gameid") {
            headers.push(("X-GameId", game_id));
        }
        if let Some(fpd_version) = self.params.get("fpdver") {
            headers.push(("User-Agent", format!("CTR FPD/00{fpd_version}")));
        }
        headers.push((
            "Content-Type",
            "application/x-www-form-urlencoded".to_owned(),
        ));

        NascRequest {
            host: self.host.clone(),
            headers,
            body: self.params.to_form(),
            certificate: self.certificate.clone(),
        }
    }

    /// Sends the login request and interprets the answer.
    pub async fn perform(&self, transport: &dyn NascTransport) -> Result<NascLogin, NascFailure> {
        if self.certificate.is_empty() {
            return Err(NascFailure::new(0, None, NascError::MissingCertificate));
        }

        let request = self.build_request();
        info!(host = %self.host, "performing NASC request");
        debug!(body = %request.body, "NASC request body");

        let response = transport.post(&request).await.map_err(|source| {
            NascFailure::new(
                0,
                None,
                NascError::Transport {
                    host: self.host.clone(),
                    source,
                },
            )
        })?;

        parse_response(&self.host, &response)
    }
}

/// Interprets a NASC server answer.
pub fn parse_response(host: &str, response: &NascResponse) -> Result<NascLogin, NascFailure> {
    let status = response.status;
    if status != 200 {
        return Err(NascFailure::new(
            0,
            Some(status),
            NascError::BadStatus {
                host: host.to_owned(),
                status,
            },
        ));
    }

    let is_form = response
        .content_type
        .as_deref()
        .is_some_and(|value| !value.is_empty() && !value.starts_with("text/plain"));
    if !is_form {
        return Err(NascFailure::new(0, Some(status), NascError::UnknownBody));
    }

    let params = NascParams::from_encoded(decode_form(&response.body));

    let return_code: i32 = params
        .get_parsed("returncd")
        .ok_or_else(|| NascFailure::new(0, Some(status), NascError::MissingField("returncd")))?;
    let result = return_code as u8;
    if return_code != RESULT_SUCCESS {
        return Err(NascFailure::new(
            result,
            Some(status),
            NascError::LoginFailed(return_code),
        ));
    }

    let fail = |error| NascFailure::new(result, Some(status), error);

    let locator = params
        .get("locator")
        .ok_or_else(|| fail(NascError::MissingField("locator")))?;
    let (server_address, port) = locator
        .split_once(':')
        .ok_or_else(|| fail(NascError::MissingPortDelimiter))?;
    let server_port = port.trim().parse().unwrap_or_default();

    // The token is handed to the game server as-is
    let auth_token = params
        .get_raw("token")
        .ok_or_else(|| fail(NascError::MissingField("token")))?
        .to_owned();

    let server_time = params
        .get_parsed("datetime")
        .ok_or_else(|| fail(NascError::MissingField("datetime")))?;

    Ok(NascLogin {
        result,
        http_status: status,
        server_address: server_address.to_owned(),
        server_port,
        auth_token,
        server_time,
    })
}

/// Successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NascLogin {
    /// Server result code, always 1
    pub result: u8,
    pub http_status: u16,
    pub server_address: String,
    pub server_port: u16,
    pub auth_token: String,
    /// Server time in seconds
    pub server_time: u64,
}

/// Failed login with whatever the server reported before the failure.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct NascFailure {
    /// Server result code, 0 if none was received
    pub result: u8,
    /// HTTP status, if a response was received
    pub http_status: Option<u16>,
    #[source]
    pub error: NascError,
}

impl NascFailure {
    fn new(result: u8, http_status: Option<u16>, error: NascError) -> Self {
        Self {
            result,
            http_status,
            error,
        }
    }
}

/// Reason a NASC login failed.
#[derive(Debug, thiserror::Error)]
pub enum NascError {
    #[error("missing or invalid client certificate or key")]
    MissingCertificate,

    #[error("request to \"{host}\" failed")]
    Transport {
        host: String,
        #[source]
        source: TransportError,
    },

    #[error("request to \"{host}\" returned status {status}")]
    BadStatus { host: String, status: u16 },

    #[error("unknown response body from NASC server")]
    UnknownBody,

    #[error("NASC response missing \"{0}\"")]
    MissingField(&'static str),

    #[error("NASC response \"locator\" missing port delimiter")]
    MissingPortDelimiter,

    #[error("NASC login failed with code 002-{0:04}")]
    LoginFailed(i32),
}
