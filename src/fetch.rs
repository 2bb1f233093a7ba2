//! Resource fetching - http(s) URLs, data URLs, and plain file paths
//!
//! Rate sources and their cache files are addressed by URI strings, so the
//! same parser can read a live endpoint, an embedded `data:` payload, or an
//! on-disk cache file.

use std::fs;
use std::time::Duration;

use base64::Engine as _;
use reqwest::blocking::{Client, RequestBuilder};

use crate::error::{HistfxError, Result};

/// Transforms the outgoing request before it is sent. Options are applied in
/// the order given; some endpoints need extra headers to answer at all.
pub type FetchOption = fn(RequestBuilder) -> RequestBuilder;

/// Returns the raw bytes of the given resource, handling `http(s)://` URLs,
/// simple `data:` URLs, and scheme-less filesystem paths.
pub fn fetch(resource: &str, opts: &[FetchOption]) -> Result<Vec<u8>> {
    if let Some(data) = resource.strip_prefix("data:") {
        return decode_data_url(data);
    }
    if resource.starts_with("http://") || resource.starts_with("https://") {
        return download(resource, opts);
    }
    if let Some((scheme, _)) = resource.split_once("://") {
        return Err(HistfxError::Fetch(format!(
            "don't know how to handle URL scheme {scheme}"
        )));
    }
    Ok(fs::read(resource)?)
}

fn download(url: &str, opts: &[FetchOption]) -> Result<Vec<u8>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("histfx/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HistfxError::Fetch(format!("failed to create HTTP client: {e}")))?;

    let mut request = client.get(url);
    for opt in opts {
        request = opt(request);
    }

    let response = request
        .send()
        .map_err(|e| HistfxError::Fetch(format!("HTTP request failed: {e}")))?;
    if !response.status().is_success() {
        return Err(HistfxError::Fetch(format!(
            "{} returned status {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| HistfxError::Fetch(format!("failed to read response body: {e}")))?;
    Ok(bytes.to_vec())
}

/// Decodes `<media-type>[;base64],<payload>`. Payloads are percent-decoded;
/// anything more exotic than optional base64 is rejected.
fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let Some((media_type, payload)) = data.split_once(',') else {
        return Err(HistfxError::Fetch(format!("invalid data URL {data:?}")));
    };

    let payload = urlencoding::decode_binary(payload.as_bytes());
    if media_type.ends_with(";base64") {
        return base64::engine::general_purpose::STANDARD
            .decode(payload.as_ref())
            .map_err(|e| HistfxError::Fetch(format!("invalid base64 payload: {e}")));
    }
    Ok(payload.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_data_url() {
        let bytes = fetch("data:text/plain,hello", &[]).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_percent_encoded_data_url() {
        let bytes = fetch("data:text/csv,a%2Cb%0A1%2C2", &[]).unwrap();
        assert_eq!(bytes, b"a,b\n1,2");
    }

    #[test]
    fn test_base64_data_url() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("USD,0.9");
        let bytes = fetch(&format!("data:text/csv;base64,{encoded}"), &[]).unwrap();
        assert_eq!(bytes, b"USD,0.9");
    }

    #[test]
    fn test_data_url_without_comma_is_rejected() {
        assert!(fetch("data:text/plain", &[]).is_err());
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let err = fetch("gopher://example.com/rates", &[]).unwrap_err();
        assert!(err.to_string().contains("gopher"));
    }

    #[test]
    fn test_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"cached bytes").unwrap();
        let bytes = fetch(file.path().to_str().unwrap(), &[]).unwrap();
        assert_eq!(bytes, b"cached bytes");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = fetch("/no/such/forex/cache/file", &[]).unwrap_err();
        assert!(matches!(err, HistfxError::Io(_)));
    }
}
