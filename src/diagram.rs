//! References PlantUML diagrams by URL. The diagram source is hex-encoded
//! into the URL path using PlantUML's `~h` text encoding, so the image is
//! rendered by the server when a reader opens the page; the build itself never
//! touches the network.

use std::fmt;
use std::string::FromUtf8Error;
use url::{ParseError as UrlParseError, Url};

/// The fenced code block languages treated as diagrams.
pub const LANGUAGES: &[&str] = &["plantuml", "puml"];

/// The prefix PlantUML servers expect in front of hex-encoded sources.
pub const HEX_PREFIX: &str = "~h";

/// Encodes `source` in PlantUML's reversible hex text encoding. The same
/// source always produces the same output.
pub fn encode(source: &str) -> String {
    format!("{}{}", HEX_PREFIX, hex::encode(source.as_bytes()))
}

/// Reverses [`encode`].
pub fn decode(encoded: &str) -> Result<String> {
    let digits = encoded
        .strip_prefix(HEX_PREFIX)
        .ok_or(Error::MissingPrefix)?;
    Ok(String::from_utf8(hex::decode(digits)?)?)
}

/// A PlantUML rendering server that diagrams are linked to.
#[derive(Clone, Debug)]
pub struct DiagramServer {
    /// The base URL that encoded sources are appended to, e.g.,
    /// `https://www.plantuml.com/plantuml/svg/`. Always ends in a slash.
    server: Url,

    /// The longest encoded source that will be put into a URL. Servers reject
    /// overly long request lines.
    max_encoded_length: usize,
}

impl DiagramServer {
    pub fn new(mut server: Url, max_encoded_length: usize) -> DiagramServer {
        // `Url::join` drops the last path segment unless it ends in a slash.
        if !server.path().ends_with('/') {
            let path = format!("{}/", server.path());
            server.set_path(&path);
        }
        DiagramServer {
            server,
            max_encoded_length,
        }
    }

    /// Reports whether a fenced code block's info string (e.g., `plantuml` or
    /// `puml title="x"`) marks a diagram.
    pub fn handles(&self, info: &str) -> bool {
        match info.split_whitespace().next() {
            Some(lang) => LANGUAGES.iter().any(|l| l.eq_ignore_ascii_case(lang)),
            None => false,
        }
    }

    /// Returns the image URL for `source`. Trailing line breaks are not part
    /// of the diagram.
    pub fn image_url(&self, source: &str) -> Result<Url> {
        let encoded = encode(source.trim_end_matches(|c: char| c == '\n' || c == '\r'));
        if encoded.len() > self.max_encoded_length {
            return Err(Error::TooLong {
                length: encoded.len(),
                max: self.max_encoded_length,
            });
        }
        Ok(self.server.join(&encoded)?)
    }

    /// Returns the HTML fragment that replaces a diagram's code block.
    pub fn fragment(&self, source: &str) -> Result<String> {
        Ok(format!(
            r#"<div class="diagram"><img src="{}" alt="PlantUML diagram"></div>"#,
            self.image_url(source)?
        ))
    }
}

/// The result of a fallible diagram operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error encoding or decoding a diagram.
#[derive(Debug)]
pub enum Error {
    /// Returned when an encoded diagram is longer than the server accepts.
    TooLong { length: usize, max: usize },

    /// Returned when a decoded string lacks the [`HEX_PREFIX`].
    MissingPrefix,

    /// Returned when a decoded string isn't valid hex.
    Hex(hex::FromHexError),

    /// Returned when decoded bytes aren't valid UTF-8.
    Utf8(FromUtf8Error),

    /// Returned when the image URL can't be built.
    UrlParse(UrlParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TooLong { length, max } => write!(
                f,
                "encoded diagram is {} bytes long, the limit is {}",
                length, max
            ),
            Error::MissingPrefix => {
                write!(f, "encoded diagram must begin with `{}`", HEX_PREFIX)
            }
            Error::Hex(err) => err.fmt(f),
            Error::Utf8(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TooLong { .. } => None,
            Error::MissingPrefix => None,
            Error::Hex(err) => Some(err),
            Error::Utf8(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Error {
        Error::Hex(err)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}

impl From<UrlParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL joining.
    fn from(err: UrlParseError) -> Error {
        Error::UrlParse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = "@startuml\nA->B\n@enduml";

    fn server() -> DiagramServer {
        DiagramServer::new(
            Url::parse("https://www.plantuml.com/plantuml/svg/").unwrap(),
            8000,
        )
    }

    #[test]
    fn test_encode_is_deterministic_and_reversible() -> Result<()> {
        let encoded = encode(SOURCE);
        assert_eq!(encoded, encode(SOURCE));
        assert!(encoded.starts_with("~h40737461727475"));
        assert_eq!(SOURCE, decode(&encoded)?);
        Ok(())
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("4041"), Err(Error::MissingPrefix)));
        assert!(matches!(decode("~hzz"), Err(Error::Hex(_))));
        assert!(matches!(decode("~hff"), Err(Error::Utf8(_))));
    }

    #[test]
    fn test_image_url() -> Result<()> {
        let url = server().image_url(&format!("{}\n", SOURCE))?;
        assert_eq!(
            format!("https://www.plantuml.com/plantuml/svg/{}", encode(SOURCE)),
            url.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_server_without_trailing_slash() -> Result<()> {
        let server = DiagramServer::new(
            Url::parse("http://localhost:8080/png").unwrap(),
            8000,
        );
        assert_eq!(
            format!("http://localhost:8080/png/{}", encode("x")),
            server.image_url("x")?.as_str()
        );
        Ok(())
    }

    #[test]
    fn test_too_long() {
        let server = DiagramServer::new(
            Url::parse("https://www.plantuml.com/plantuml/svg/").unwrap(),
            10,
        );
        assert!(matches!(
            server.image_url(SOURCE),
            Err(Error::TooLong { max: 10, .. })
        ));
    }

    #[test]
    fn test_handles() {
        let server = server();
        assert!(server.handles("plantuml"));
        assert!(server.handles("puml title=\"flow\""));
        assert!(server.handles("PlantUML"));
        assert!(!server.handles("rust"));
        assert!(!server.handles(""));
    }
}
