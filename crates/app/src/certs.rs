use std::path::Path;

use bytes::Bytes;
use eyre::WrapErr;

use slalink_config::ProviderConfig;

/// DER attestation certificates a provider registers with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Certificates {
    pub server: Bytes,
    pub app: Bytes,
}

/// Reads the certificates named in `config`. Missing paths yield empty
/// certificates.
pub fn load_certificates(config: &ProviderConfig) -> eyre::Result<Certificates> {
    Ok(Certificates {
        server: read_optional(config.server_cert_path.as_deref())?,
        app: read_optional(config.app_cert_path.as_deref())?,
    })
}

fn read_optional(path: Option<&Path>) -> eyre::Result<Bytes> {
    let Some(path) = path else {
        return Ok(Bytes::new());
    };

    let der = std::fs::read(path)
        .wrap_err_with(|| format!("Failed to read certificate at {}", path.display()))?;

    Ok(Bytes::from(der))
}
