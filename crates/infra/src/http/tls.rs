//! rustls client configuration for outbound calls
//!
//! The client carries its own rustls config so that the session store can
//! report when the TLS handshake starts; see
//! [`HandshakeTimingStore`](super::timing::HandshakeTimingStore).

use std::sync::Arc;

use carrierlink_domain::{GatewayError, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{ClientSessionMemoryCache, Resumption};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use super::timing::HandshakeTimingStore;

const SESSION_CACHE_SIZE: usize = 256;

/// Build the rustls config used by [`HttpClient`](super::HttpClient).
///
/// Trust anchors come from the platform store. With `accept_invalid_certs`
/// the server certificate is not checked at all, only the handshake
/// signatures.
///
/// # Errors
/// Returns `GatewayError::Config` if the crypto provider rejects the default
/// protocol versions.
pub fn client_config(accept_invalid_certs: bool) -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| GatewayError::Config(format!("unsupported TLS configuration: {e}")))?;

    let mut config = if accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
            .with_no_client_auth()
    } else {
        builder.with_root_certificates(native_roots()).with_no_client_auth()
    };

    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    config.resumption = Resumption::store(Arc::new(HandshakeTimingStore::new(Arc::new(
        ClientSessionMemoryCache::new(SESSION_CACHE_SIZE),
    ))));
    Ok(config)
}

fn native_roots() -> RootCertStore {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "Failed to load a platform root certificate");
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
    tracing::debug!(added, ignored, "Loaded platform trust anchors");
    if added == 0 {
        tracing::warn!("No platform trust anchors found; https upstreams will fail verification");
    }
    roots
}

/// Accepts any server certificate while still checking handshake signatures
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}
