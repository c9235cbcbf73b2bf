mod catalog;
mod http;
mod schema;
mod track;

pub use catalog::*;
pub use http::*;
pub use schema::*;
pub use track::*;

use reqwest::Url;

use crate::dto::load_error::LoadError;

/// Appends path segments to a service base URL, keeping any path the base already has.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, LoadError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| LoadError::Network(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("http://localhost:8083", "http://localhost:8083/track/7")]
    #[case("http://localhost:8083/", "http://localhost:8083/track/7")]
    #[case("http://host/pt", "http://host/pt/track/7")]
    #[case("http://host/pt/", "http://host/pt/track/7")]
    fn test_endpoint_keeps_base_path(#[case] base: &str, #[case] expected: &str) {
        let url = endpoint(&Url::parse(base).unwrap(), &["track", "7"]).unwrap();
        assert_eq!(expected, url.as_str());
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let url = endpoint(&Url::parse("http://host").unwrap(), &["track", "a/b"]).unwrap();
        assert_eq!("http://host/track/a%2Fb", url.as_str());
    }
}
