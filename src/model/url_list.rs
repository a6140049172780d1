use crate::codec::JsonColumn;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Ordered callback or logout URLs stored in one column.
///
/// Order and duplicates are kept as given; URL syntax is not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlList(Vec<String>);

impl UrlList {
    pub fn new(urls: Vec<String>) -> Self {
        Self(urls)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl JsonColumn for UrlList {}

impl Deref for UrlList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for UrlList {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl<'a> From<Vec<&'a str>> for UrlList {
    fn from(value: Vec<&'a str>) -> Self {
        Self(value.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ColumnCodec;

    #[test]
    fn test_empty_list_round_trips_to_empty_list() {
        let encoded = UrlList::default().encode_column().unwrap();
        assert_eq!(encoded, "[]");
        let decoded = UrlList::decode_column(Some(encoded.as_str())).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_order_and_duplicates_are_preserved() {
        let urls = UrlList::from(vec![
            "https://b.example.com/cb",
            "https://a.example.com/cb",
            "https://b.example.com/cb",
        ]);
        let decoded = UrlList::decode_column(Some(urls.encode_column().unwrap().as_str())).unwrap();
        assert_eq!(decoded, urls);
        assert_eq!(decoded[0], "https://b.example.com/cb");
    }

    #[test]
    fn test_invalid_urls_are_not_rejected() {
        let urls = UrlList::from(vec!["not a url", ""]);
        let decoded = UrlList::decode_column(Some(urls.encode_column().unwrap().as_str())).unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn test_object_document_is_rejected() {
        assert!(UrlList::decode_column(Some(r#"{"url":"x"}"#)).is_err());
    }
}
