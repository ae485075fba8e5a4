//! # frd-nasc
//! Client for the NASC game-server authentication endpoint.
//!
//! A login is a single HTTPS `POST /ac` carrying a form body whose values are Base64-encoded
//! with a URL-safe alphabet. The server answers with a form body of the same encoding; the
//! result code, game server locator, token and server time are extracted from it.
//!
//! Modules:
//! - `codec`: NASC Base64 and form body encoding
//! - `params`: ordered request parameter set
//! - `transport`: the HTTP exchange, behind the [`NascTransport`] trait
//! - `client`: request assembly and response interpretation
//!
//! # References
//! - [3dbrew NASC](https://www.3dbrew.org/wiki/NASC)

pub mod client;
pub mod codec;
pub mod params;
pub mod transport;

pub use self::{
    client::{NascClient, NascError, NascFailure, NascLogin},
    params::NascParams,
    transport::{
        ClientCertificate, HttpsTransport, NascRequest, NascResponse, NascTransport,
        TransportError,
    },
};
