//! Generic serialize/deserialize entry points
//!
//! ## Format
//!
//! ```text
//! prefix(1) + body
//! ```
//!
//! The prefix selects the codec on the way back in, so `deserialize` needs no
//! encoding argument. Anything implementing serde's traits can go through
//! here; buffer-backed records pick their wire shape from the codec's
//! `is_human_readable` flag.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, warn};

use crate::config::SerializationConfig;
use crate::encoding::SerializationType;
use crate::error::{SerializationError, SerializationResult};
use crate::hooks::is_malformed_message;

/// Serialize a value with the given encoding, using default limits.
pub fn serialize<T>(value: &T, encoding: SerializationType) -> SerializationResult<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    MessageCodec::default().encode_as(value, encoding)
}

/// Deserialize a value from a prefixed message, using default limits.
pub fn deserialize<T>(bytes: &[u8]) -> SerializationResult<T>
where
    T: DeserializeOwned,
{
    MessageCodec::default().decode(bytes)
}

/// Serialize/deserialize dispatch bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    config: SerializationConfig,
}

impl MessageCodec {
    /// Create a codec with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails
    /// [`SerializationConfig::validate`].
    pub fn new(config: SerializationConfig) -> SerializationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this codec enforces.
    pub fn config(&self) -> &SerializationConfig {
        &self.config
    }

    /// Serialize with the configured default encoding.
    pub fn encode<T>(&self, value: &T) -> SerializationResult<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        self.encode_as(value, self.config.encoding)
    }

    /// Serialize with an explicit encoding.
    ///
    /// Encoding stops as soon as the output would pass `max_message_bytes`;
    /// `MessageTooLarge::actual` is then the size reached at that point.
    pub fn encode_as<T>(&self, value: &T, encoding: SerializationType) -> SerializationResult<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let mut out = BoundedWriter::new(self.config.max_message_bytes);
        out.write_all(&[encoding.prefix()])
            .map_err(|_| self.too_large(out.overflow.unwrap_or(1)))?;

        let encoded = match encoding {
            SerializationType::MsgPack => {
                rmp_serde::encode::write(&mut out, value).map_err(SerializationError::MsgPackEncode)
            }
            SerializationType::Json => {
                serde_json::to_writer(&mut out, value).map_err(SerializationError::JsonEncode)
            }
        };
        if let Some(actual) = out.overflow {
            return Err(self.too_large(actual));
        }
        encoded?;

        debug!(encoding = %encoding, bytes = out.buf.len(), "Encoded message");
        Ok(out.buf)
    }

    /// Deserialize a prefixed message.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge` if the input exceeds `max_message_bytes`
    /// - `EmptyMessage` / `UnknownPrefix` if the prefix is missing or unknown
    /// - `MalformedInput` if a reconstruction hook rejected an element
    /// - `MsgPackDecode` / `JsonDecode` for any other codec failure
    pub fn decode<T>(&self, bytes: &[u8]) -> SerializationResult<T>
    where
        T: DeserializeOwned,
    {
        self.check_size(bytes.len())?;

        let (&prefix, body) = bytes.split_first().ok_or(SerializationError::EmptyMessage)?;
        let encoding = SerializationType::from_prefix(prefix).ok_or_else(|| {
            warn!(prefix = prefix, "Rejected message with unknown prefix");
            SerializationError::UnknownPrefix(prefix)
        })?;

        debug!(encoding = %encoding, bytes = bytes.len(), "Decoding message");
        let decoded = match encoding {
            SerializationType::MsgPack => rmp_serde::from_slice(body).map_err(classify_msgpack),
            SerializationType::Json => serde_json::from_slice(body).map_err(classify_json),
        };
        if let Err(SerializationError::MalformedInput { detail, .. }) = &decoded {
            warn!(encoding = %encoding, detail = %detail, "Rejected malformed input");
        }
        decoded
    }

    fn check_size(&self, actual: usize) -> SerializationResult<()> {
        if actual > self.config.max_message_bytes {
            return Err(self.too_large(actual));
        }
        Ok(())
    }

    fn too_large(&self, actual: usize) -> SerializationError {
        let max = self.config.max_message_bytes;
        warn!(actual, max, "Message exceeds size limit");
        SerializationError::MessageTooLarge { actual, max }
    }
}

/// Output buffer that refuses writes past a byte limit.
struct BoundedWriter {
    buf: Vec<u8>,
    max: usize,
    /// Size the output would have reached when a write was refused.
    overflow: Option<usize>,
}

impl BoundedWriter {
    fn new(max: usize) -> Self {
        Self {
            buf: Vec::new(),
            max,
            overflow: None,
        }
    }
}

impl Write for BoundedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let needed = self.buf.len().saturating_add(data.len());
        if needed > self.max {
            self.overflow = Some(needed);
            return Err(io::Error::new(io::ErrorKind::Other, "message size limit reached"));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn classify_msgpack(err: rmp_serde::decode::Error) -> SerializationError {
    match err {
        rmp_serde::decode::Error::Syntax(detail) if is_malformed_message(&detail) => {
            SerializationError::MalformedInput {
                encoding: SerializationType::MsgPack,
                detail,
            }
        }
        other => SerializationError::MsgPackDecode(other),
    }
}

fn classify_json(err: serde_json::Error) -> SerializationError {
    let detail = err.to_string();
    if err.is_data() && is_malformed_message(&detail) {
        SerializationError::MalformedInput {
            encoding: SerializationType::Json,
            detail,
        }
    } else {
        SerializationError::JsonDecode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::malformed_element;
    use serde::de::{Deserializer, SeqAccess, Unexpected, Visitor};
    use serde::Deserialize;
    use std::fmt;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: u64,
        name: String,
        tags: Vec<u8>,
    }

    fn sample() -> Sample {
        Sample {
            id: 42,
            name: "sample".to_string(),
            tags: vec![1, 2, 3],
        }
    }

    /// Accepts a list of even numbers; rejects the first odd one as malformed.
    #[derive(Debug)]
    struct EvenList(Vec<u64>);

    impl<'de> Deserialize<'de> for EvenList {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct EvenVisitor;

            impl<'de> Visitor<'de> for EvenVisitor {
                type Value = EvenList;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a list of even numbers")
                }

                fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<EvenList, A::Error> {
                    let mut out = Vec::new();
                    while let Some(n) = seq.next_element::<u64>()? {
                        if n % 2 != 0 {
                            return Err(malformed_element(out.len(), Unexpected::Unsigned(n)));
                        }
                        out.push(n);
                    }
                    Ok(EvenList(out))
                }
            }

            deserializer.deserialize_seq(EvenVisitor)
        }
    }

    #[test]
    fn test_roundtrip_both_encodings() {
        for encoding in SerializationType::ALL {
            let bytes = serialize(&sample(), encoding).unwrap();
            assert_eq!(bytes[0], encoding.prefix());
            let decoded: Sample = deserialize(&bytes).unwrap();
            assert_eq!(decoded, sample());
        }
    }

    #[test]
    fn test_json_body_is_text() {
        let bytes = serialize(&vec![1u8, 2, 3], SerializationType::Json).unwrap();
        assert_eq!(&bytes[1..], b"[1,2,3]");
    }

    #[test]
    fn test_empty_message() {
        let err = deserialize::<Sample>(&[]).unwrap_err();
        assert!(matches!(err, SerializationError::EmptyMessage));
    }

    #[test]
    fn test_unknown_prefix() {
        let err = deserialize::<Sample>(b"X[1,2]").unwrap_err();
        assert!(matches!(err, SerializationError::UnknownPrefix(b'X')));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let bytes = serialize(&"text", SerializationType::Json).unwrap();
        let err = deserialize::<Sample>(&bytes).unwrap_err();
        assert!(matches!(err, SerializationError::JsonDecode(_)));

        let bytes = serialize(&"text", SerializationType::MsgPack).unwrap();
        let err = deserialize::<Sample>(&bytes).unwrap_err();
        assert!(matches!(err, SerializationError::MsgPackDecode(_)));
    }

    #[test]
    fn test_malformed_element_classified_json() {
        let bytes = serialize(&vec![2u64, 4, 5], SerializationType::Json).unwrap();
        let err = deserialize::<EvenList>(&bytes).unwrap_err();
        match err {
            SerializationError::MalformedInput { encoding, detail } => {
                assert_eq!(encoding, SerializationType::Json);
                assert!(detail.contains("index 2"));
            }
            other => panic!("Expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_element_classified_msgpack() {
        let bytes = serialize(&vec![3u64], SerializationType::MsgPack).unwrap();
        let err = deserialize::<EvenList>(&bytes).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_valid_custom_hook() {
        let bytes = serialize(&vec![2u64, 4], SerializationType::Json).unwrap();
        let list: EvenList = deserialize(&bytes).unwrap();
        assert_eq!(list.0, vec![2, 4]);
    }

    #[test]
    fn test_codec_default_encoding() {
        let codec = MessageCodec::new(SerializationConfig {
            encoding: SerializationType::Json,
            ..SerializationConfig::default()
        })
        .unwrap();
        let bytes = codec.encode(&sample()).unwrap();
        assert_eq!(bytes[0], b'J');
        let decoded: Sample = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_codec_limit_on_encode() {
        let codec = MessageCodec::new(SerializationConfig {
            max_message_bytes: 8,
            ..SerializationConfig::default()
        })
        .unwrap();
        let err = codec.encode_as(&vec![0u8; 64], SerializationType::MsgPack).unwrap_err();
        match err {
            SerializationError::MessageTooLarge { actual, max } => {
                assert!(actual > 8);
                assert_eq!(max, 8);
            }
            other => panic!("Expected MessageTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_codec_limit_on_decode() {
        let bytes = serialize(&vec![0u8; 64], SerializationType::Json).unwrap();
        let codec = MessageCodec::new(SerializationConfig {
            max_message_bytes: 16,
            ..SerializationConfig::default()
        })
        .unwrap();
        let err = codec.decode::<Vec<u8>>(&bytes).unwrap_err();
        assert!(matches!(err, SerializationError::MessageTooLarge { .. }));
    }

    #[test]
    fn test_codec_rejects_invalid_config() {
        let err = MessageCodec::new(SerializationConfig {
            max_message_bytes: 0,
            ..SerializationConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SerializationError::InvalidConfig(_)));
    }

    #[test]
    fn test_codec_encode_stops_at_limit() {
        let codec = MessageCodec::new(SerializationConfig {
            max_message_bytes: 64,
            ..SerializationConfig::default()
        })
        .unwrap();
        for encoding in SerializationType::ALL {
            let err = codec.encode_as(&vec![200u8; 1 << 20], encoding).unwrap_err();
            match err {
                SerializationError::MessageTooLarge { actual, max } => {
                    assert_eq!(max, 64);
                    assert!(actual > 64);
                    assert!(actual < 1 << 20, "{} encoded {} bytes before stopping", encoding, actual);
                }
                other => panic!("Expected MessageTooLarge, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_codec_encode_exactly_at_limit() {
        let bytes = serialize(&sample(), SerializationType::Json).unwrap();
        let codec = MessageCodec::new(SerializationConfig {
            max_message_bytes: bytes.len(),
            ..SerializationConfig::default()
        })
        .unwrap();
        assert_eq!(codec.encode_as(&sample(), SerializationType::Json).unwrap(), bytes);
    }

    #[test]
    fn test_codec_limit_is_inclusive() {
        let bytes = serialize(&1u8, SerializationType::MsgPack).unwrap();
        let codec = MessageCodec::new(SerializationConfig {
            max_message_bytes: bytes.len(),
            ..SerializationConfig::default()
        })
        .unwrap();
        assert_eq!(codec.decode::<u8>(&bytes).unwrap(), 1);
    }
}
