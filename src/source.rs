//! Fetch text resources from a local path or an HTTP(S) URL.

use crate::error::{ClimateError, Result};
use std::time::Duration;
use tracing::debug;

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read `location` as UTF-8 text. No retry: callers log and degrade.
pub fn fetch_text(location: &str) -> Result<String> {
    if is_remote(location) {
        fetch_remote(location)
    } else {
        debug!(path = location, "reading local resource");
        Ok(std::fs::read_to_string(location)?)
    }
}

fn fetch_remote(url: &str) -> Result<String> {
    debug!(url, "fetching remote resource");
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("climate_overlay/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .build()?;
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ClimateError::FetchStatus { url: url.to_string(), status: status.as_u16() });
    }
    Ok(resp.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.org/data.csv"));
        assert!(is_remote("http://localhost/x"));
        assert!(!is_remote("data/climate_impact_data.csv"));
    }

    #[test]
    fn reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ISO,Period\nUSA,Historical 1986-2005\n").unwrap();
        let text = fetch_text(file.path().to_str().unwrap()).unwrap();
        assert!(text.starts_with("ISO,Period"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = fetch_text(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ClimateError::Io(_)));
    }
}
