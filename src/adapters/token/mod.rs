//! Token codec adapters.

mod hmac_codec;

pub use hmac_codec::HmacTokenCodec;
