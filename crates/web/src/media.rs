//! Content negotiation between a client's `Accept` header and the representations an
//! action can produce.
//!
//! ```
//! use strand_web::media::{ContentMediaType, ResponseMediaTypeSelector};
//!
//! let selector = ResponseMediaTypeSelector::new("application/xml;q=0.8, application/json");
//! let selected = selector.select(&[ContentMediaType::xml(), ContentMediaType::json()]).unwrap();
//! assert_eq!(selected, ContentMediaType::json());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use mime::Mime;
use strand_http::protocol::Request;
use thiserror::Error;
use tracing::debug;

/// IANA top-level media types a response may declare
const TOP_LEVEL_TYPES: [&str; 9] = ["application", "audio", "font", "image", "model", "text", "video", "multipart", "message"];

const WILDCARD: &str = "*";

/// No acceptable representation, or a media type that cannot describe content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("media type not supported: {media_type}")]
pub struct MediaTypeNotSupported {
    pub media_type: String,
}

impl MediaTypeNotSupported {
    pub fn new<S: ToString>(media_type: S) -> Self {
        Self { media_type: media_type.to_string() }
    }
}

type Parameters = Vec<(String, String)>;

/// Splits `type/subtype;name=value;...` into lowercase type and subtype plus trimmed
/// parameters. A descriptor without exactly one `/` yields empty type and subtype.
fn parse_descriptor(descriptor: &str) -> (String, String, Parameters) {
    let mut parts = descriptor.split(';');
    let essence = parts.next().unwrap_or_default().trim();

    let (mime_type, mime_sub_type) = match essence.split_once('/') {
        Some((t, s)) if !s.contains('/') => (t.trim().to_ascii_lowercase(), s.trim().to_ascii_lowercase()),
        _ => (String::new(), String::new()),
    };

    let parameters = parts
        .filter_map(|parameter| parameter.split_once('='))
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    (mime_type, mime_sub_type, parameters)
}

fn write_descriptor(f: &mut fmt::Formatter<'_>, mime_type: &str, mime_sub_type: &str, parameters: &Parameters) -> fmt::Result {
    write!(f, "{mime_type}/{mime_sub_type}")?;
    for (name, value) in parameters {
        write!(f, ";{name}={value}")?;
    }
    Ok(())
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptMediaType {
    mime_type: String,
    mime_sub_type: String,
    quality: f32,
    parameters: Parameters,
}

impl AcceptMediaType {
    pub fn new(mime_type: &str, mime_sub_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_ascii_lowercase(),
            mime_sub_type: mime_sub_type.to_ascii_lowercase(),
            quality: 1.0,
            parameters: Vec::new(),
        }
    }

    /// Parses one entry. `q` sets the quality (default 1.0, unparsable values fall back to
    /// 1.0, the rest are clamped to 0.0..=1.0) and is not kept as a parameter.
    pub fn parse(entry: &str) -> Self {
        let (mime_type, mime_sub_type, all_parameters) = parse_descriptor(entry);

        let mut quality = 1.0;
        let mut parameters = Vec::with_capacity(all_parameters.len());
        for (name, value) in all_parameters {
            if name.eq_ignore_ascii_case("q") {
                quality = match value.parse::<f32>() {
                    Ok(q) if q.is_finite() => q.clamp(0.0, 1.0),
                    _ => 1.0,
                };
            } else {
                parameters.push((name, value));
            }
        }

        Self { mime_type, mime_sub_type, quality, parameters }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn mime_sub_type(&self) -> &str {
        &self.mime_sub_type
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn is_generic_type(&self) -> bool {
        self.mime_type == WILDCARD
    }

    pub fn is_generic_sub_type(&self) -> bool {
        self.mime_sub_type == WILDCARD
    }

    /// Whether `content` is this entry's type or falls under its wildcards.
    pub fn is_same_or_super_type_of(&self, content: &ContentMediaType) -> bool {
        (self.is_generic_type() || self.mime_type == content.mime_type)
            && (self.is_generic_sub_type() || self.mime_sub_type == content.mime_sub_type)
    }

    /// Orders by preference, most preferred first: higher quality, then a concrete type,
    /// then a concrete subtype, then more parameters.
    pub fn preference(&self, other: &Self) -> Ordering {
        other
            .quality
            .total_cmp(&self.quality)
            .then_with(|| self.is_generic_type().cmp(&other.is_generic_type()))
            .then_with(|| self.is_generic_sub_type().cmp(&other.is_generic_sub_type()))
            .then_with(|| other.parameters.len().cmp(&self.parameters.len()))
    }
}

impl fmt::Display for AcceptMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_descriptor(f, &self.mime_type, &self.mime_sub_type, &self.parameters)?;
        if self.quality < 1.0 {
            write!(f, ";q={}", self.quality)?;
        }
        Ok(())
    }
}

/// A concrete media type a response body can be declared as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentMediaType {
    mime_type: String,
    mime_sub_type: String,
    parameters: Parameters,
}

impl ContentMediaType {
    /// # Errors
    ///
    /// Fails unless `mime_type` is an IANA top-level type and `mime_sub_type` is concrete.
    pub fn new(mime_type: &str, mime_sub_type: &str) -> Result<Self, MediaTypeNotSupported> {
        Self::with_parameters(mime_type, mime_sub_type, Vec::new())
    }

    pub fn with_parameters(
        mime_type: &str,
        mime_sub_type: &str,
        parameters: Vec<(String, String)>,
    ) -> Result<Self, MediaTypeNotSupported> {
        let media_type = Self {
            mime_type: mime_type.to_ascii_lowercase(),
            mime_sub_type: mime_sub_type.to_ascii_lowercase(),
            parameters,
        };

        let known_type = TOP_LEVEL_TYPES.contains(&media_type.mime_type.as_str());
        let concrete = !media_type.mime_sub_type.is_empty() && media_type.mime_sub_type != WILDCARD;
        if known_type && concrete { Ok(media_type) } else { Err(MediaTypeNotSupported::new(media_type)) }
    }

    /// Parses a `Content-Type` style descriptor such as `text/plain; charset=utf-8`.
    pub fn parse(descriptor: &str) -> Result<Self, MediaTypeNotSupported> {
        let (mime_type, mime_sub_type, parameters) = parse_descriptor(descriptor);
        Self::with_parameters(&mime_type, &mime_sub_type, parameters)
            .map_err(|_e| MediaTypeNotSupported::new(descriptor.trim()))
    }

    fn known(mime_type: &str, mime_sub_type: &str) -> Self {
        Self { mime_type: mime_type.to_owned(), mime_sub_type: mime_sub_type.to_owned(), parameters: Vec::new() }
    }

    pub fn json() -> Self {
        Self::known("application", "json")
    }

    pub fn xml() -> Self {
        Self::known("application", "xml")
    }

    pub fn plain_text() -> Self {
        Self::known("text", "plain")
    }

    pub fn binary() -> Self {
        Self::known("application", "octet-stream")
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn mime_sub_type(&self) -> &str {
        &self.mime_sub_type
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    /// The same type without parameters.
    #[must_use]
    pub fn to_base_type(&self) -> Self {
        Self::known(&self.mime_type, &self.mime_sub_type)
    }
}

impl fmt::Display for ContentMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_descriptor(f, &self.mime_type, &self.mime_sub_type, &self.parameters)
    }
}

impl FromStr for ContentMediaType {
    type Err = MediaTypeNotSupported;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&ContentMediaType> for Mime {
    type Error = mime::FromStrError;

    fn try_from(media_type: &ContentMediaType) -> Result<Self, Self::Error> {
        media_type.to_string().parse()
    }
}

/// Picks the response representation preferred by an `Accept` header.
#[derive(Debug, Clone)]
pub struct ResponseMediaTypeSelector {
    accept: String,
    accepted: Vec<AcceptMediaType>,
}

impl ResponseMediaTypeSelector {
    /// Parses `accept` and ranks its entries with [`AcceptMediaType::preference`].
    /// Entries of equal preference keep their header order.
    pub fn new(accept: &str) -> Self {
        let mut accepted: Vec<_> = accept
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(AcceptMediaType::parse)
            .collect();
        accepted.sort_by(AcceptMediaType::preference);

        Self { accept: accept.to_owned(), accepted }
    }

    /// Uses the request's `Accept` header, treating a missing one as `*/*`.
    pub fn for_request(request: &Request) -> Self {
        Self::new(request.header("accept").unwrap_or("*/*"))
    }

    /// Ranked entries, most preferred first.
    pub fn accepted(&self) -> &[AcceptMediaType] {
        &self.accepted
    }

    /// The first of `supported` matched by the highest ranked entry.
    ///
    /// # Errors
    ///
    /// [`MediaTypeNotSupported`] carrying the header text when no entry matches.
    pub fn select(&self, supported: &[ContentMediaType]) -> Result<ContentMediaType, MediaTypeNotSupported> {
        self.accepted
            .iter()
            .find_map(|accepted| supported.iter().find(|candidate| accepted.is_same_or_super_type_of(candidate)))
            .cloned()
            .ok_or_else(|| {
                debug!(accept = %self.accept, "no acceptable media type");
                MediaTypeNotSupported::new(&self.accept)
            })
    }
}
