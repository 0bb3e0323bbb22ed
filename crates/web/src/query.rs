//! Query string access.
//!
//! Query parameters never take part in routing; handlers read them from the request here.
//! Names may repeat, and every value is kept in arrival order.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use strand_http::protocol::Request;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("invalid query string: {source}")]
pub struct QueryError {
    #[from]
    source: serde_urlencoded::de::Error,
}

/// Decoded `name=value` pairs of a query string, grouped by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Splits on `&` and percent-decodes names and values. A name without `=` gets an
    /// empty value.
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;

        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in pairs {
            match entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, values)) => values.push(value),
                None => entries.push((name, vec![value])),
            }
        }
        Ok(Self { entries })
    }

    pub fn from_request(request: &Request) -> Result<Self, QueryError> {
        request.query().map_or_else(|| Ok(Self::default()), Self::parse)
    }

    /// Deserializes the request's query string into `T`.
    pub fn deserialize<T: DeserializeOwned>(request: &Request) -> Result<T, QueryError> {
        Ok(serde_urlencoded::from_str(request.query().unwrap_or_default())?)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    /// Every value of `name`, empty when absent.
    pub fn values_of(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values_of(name).first().map(String::as_str)
    }

    /// Parses the first value of `name` as `T`.
    pub fn first_as<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.first(name).map(str::parse)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
