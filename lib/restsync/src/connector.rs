//! HTTPS connector for the default transport.

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;

/// Connector accepting both `http://` and `https://` URLs.
///
/// TLS uses rustls with the Mozilla root store; HTTP/1.1 and HTTP/2 are
/// negotiated via ALPN.
#[must_use]
pub(crate) fn https_connector() -> HttpsConnector<HttpConnector> {
    let roots: rustls::RootCertStore = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build()
}
