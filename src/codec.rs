//! Column codec for structured values stored in a single text column.
//!
//! Values are written as a self-describing JSON document. A missing or blank
//! column decodes to the type's default so rows written before a column was
//! populated stay readable.

use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Converts a value to and from the text stored in its column.
pub trait ColumnCodec: Sized {
    fn encode_column(&self) -> Result<String, CodecError>;

    fn decode_column(raw: Option<&str>) -> Result<Self, CodecError>;
}

/// Marker for types persisted as JSON through the blanket [`ColumnCodec`] impl.
pub trait JsonColumn: Serialize + DeserializeOwned + Default {}

impl<T: JsonColumn> ColumnCodec for T {
    fn encode_column(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    fn decode_column(raw: Option<&str>) -> Result<Self, CodecError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(T::default()),
            Some(text) => serde_json::from_str(text).map_err(CodecError::Decode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        names: Vec<String>,
    }

    impl JsonColumn for Sample {}

    #[test]
    fn test_absent_and_blank_decode_to_default() {
        assert_eq!(Sample::decode_column(None).unwrap(), Sample::default());
        assert_eq!(Sample::decode_column(Some("")).unwrap(), Sample::default());
        assert_eq!(Sample::decode_column(Some("  \n")).unwrap(), Sample::default());
    }

    #[test]
    fn test_malformed_document_is_decode_error() {
        let err = Sample::decode_column(Some("{\"names\":")).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let err = Sample::decode_column(Some("{\"names\": 42}")).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let value = Sample {
            names: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(value.encode_column().unwrap(), r#"{"names":["a","b"]}"#);
        assert_eq!(value.encode_column().unwrap(), value.encode_column().unwrap());
    }
}
