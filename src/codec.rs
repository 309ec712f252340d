use std::{
    fmt::{self, Display},
    marker::PhantomData,
};

use serde::{de::DeserializeOwned, Serialize};
use smartstring::alias::String;

/// Translates set members to and from the strings held by the store.
///
/// `encode` and `decode` must be deterministic and mutually inverse:
/// `decode(encode(x))` must equal `x` under the member type's equality.
/// The set cannot check this property itself; a codec that breaks it
/// silently corrupts the mirrored collection. `encode` should also be
/// injective, or distinct members may collapse into one stored entry.
pub trait Codec {
    /// The member type this codec handles.
    type Value;

    fn encode(&self, value: &Self::Value) -> String;

    fn decode(&self, raw: &str) -> Result<Self::Value, DecodeError>;
}

/// A stored entry that could not be turned back into a member.
///
/// Loading never skips entries: one bad entry fails the whole load, since
/// silently dropping data would be worse than a visible failure.
#[derive(Debug)]
pub struct DecodeError {
    /// The raw stored entry that failed to decode.
    pub entry: String,
    /// Codec-specific description of the failure.
    pub reason: String,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot decode stored entry {:?}: {}",
            self.entry, self.reason
        )
    }
}

impl std::error::Error for DecodeError {}

/// Identity codec for sets of plain strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringCodec;

impl Codec for StringCodec {
    type Value = String;

    fn encode(&self, value: &String) -> String {
        value.clone()
    }

    fn decode(&self, raw: &str) -> Result<String, DecodeError> {
        Ok(raw.into())
    }
}

/// Codec for any serde-serializable member type, stored as YAML.
pub struct YamlCodec<T>(PhantomData<fn() -> T>);

impl<T> YamlCodec<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

// Manual impls so `T` itself is not required to be Clone/Default.
impl<T> Clone for YamlCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for YamlCodec<T> {}

impl<T> Default for YamlCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for YamlCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("YamlCodec")
    }
}

impl<T> Codec for YamlCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    /// # Panics
    ///
    /// Panics if `T`'s `Serialize` impl errors (e.g. maps with non-string
    /// keys). Such types cannot satisfy the codec contract at all, so this
    /// is a bug in the member type rather than a runtime condition.
    fn encode(&self, value: &T) -> String {
        serde_yaml::to_string(value)
            .expect("member type must serialize to YAML")
            .into()
    }

    fn decode(&self, raw: &str) -> Result<T, DecodeError> {
        serde_yaml::from_str(raw).map_err(|e| DecodeError {
            entry: raw.into(),
            reason: e.to_string().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Bookmark {
        url: std::string::String,
        pinned: bool,
    }

    #[test]
    fn string_codec_is_identity() {
        let codec = StringCodec;
        let encoded = codec.encode(&"tag:blue".into());
        assert_eq!(encoded, "tag:blue");
        assert_eq!(codec.decode("tag:blue").unwrap(), "tag:blue");
    }

    #[test]
    fn yaml_codec_round_trip() {
        let codec = YamlCodec::<Bookmark>::new();
        let bookmark = Bookmark {
            url: "https://example.com".into(),
            pinned: true,
        };

        let encoded = codec.encode(&bookmark);
        assert_eq!(codec.decode(&encoded).unwrap(), bookmark);
    }

    #[test]
    fn yaml_codec_rejects_garbage() {
        let codec = YamlCodec::<Bookmark>::new();
        let err = codec.decode("pinned: [unclosed").unwrap_err();
        assert_eq!(err.entry, "pinned: [unclosed");
    }
}
