use bytes::Bytes;

mod error;
pub use error::CodecError;

pub mod rlp;
pub use rlp::{Item, RlpError};

mod wire;
pub use wire::WireCodec;

mod usage;
pub use usage::UsageReportCodec;

pub trait Codec<T>: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn decode(&self, bytes: Bytes) -> Result<T, Self::Error>;
    fn encode(&self, msg: &T) -> Result<Bytes, Self::Error>;
}
