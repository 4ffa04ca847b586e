#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The scalar is zero or not below the curve order.
    #[error("Invalid key material")]
    InvalidKeyMaterial,

    /// The counterparty's public point is malformed, off the curve, or the identity.
    #[error("Invalid counterpart key: {0}")]
    InvalidCounterpartKey(&'static str),

    /// The envelope's tag did not verify under the shared secret.
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Encryption failed")]
    Encryption,

    #[error("Invalid signature")]
    InvalidSignature,
}
