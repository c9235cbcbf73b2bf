use std::time::Duration;

use reqwest::Url;

use crate::dto::track::{DisplayMetadata, KnownMetadata, PageMetadata, PlayOptions};
use crate::transport::CatalogMetadata;

pub(crate) const LOADING_TITLE: &str = "Loading…";
pub(crate) const LOADING_TIME: &str = "⏳";
const UNKNOWN_TIME: &str = "--:--";

// Unknown-length downloads advance one step per 64 KiB, wrapping inside [5, 60)
const PSEUDO_PROGRESS_STEP: u64 = 65536;
const PSEUDO_PROGRESS_MIN: u64 = 5;
const PSEUDO_PROGRESS_MAX: u64 = 60;

/// Formats seconds as `M:SS`, or `H:MM:SS` past the hour.
pub fn format_time(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return UNKNOWN_TIME.to_owned();
    };
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

pub(crate) fn time_display(
    is_loading: bool,
    position: Option<Duration>,
    duration: Option<Duration>,
) -> String {
    if is_loading {
        return LOADING_TIME.to_owned();
    }
    let current = format_time(Some(position.unwrap_or_default().as_secs_f64()));
    let total = format_time(duration.map(|d| d.as_secs_f64()));
    format!("{current} / {total}")
}

/// Download progress as a whole percentage.
pub(crate) fn download_progress(received: u64, total: Option<u64>) -> u8 {
    match total.filter(|t| *t > 0) {
        Some(total) => {
            let percent = (received as f64 / total as f64 * 100.0).round();
            percent.min(100.0) as u8
        }
        None => (received / PSEUDO_PROGRESS_STEP % PSEUDO_PROGRESS_MAX)
            .clamp(PSEUDO_PROGRESS_MIN, PSEUDO_PROGRESS_MAX) as u8,
    }
}

pub(crate) fn playback_progress(position: Option<Duration>, duration: Option<Duration>) -> f64 {
    match (position, duration) {
        (Some(position), Some(duration)) if !duration.is_zero() => {
            (position.as_secs_f64() / duration.as_secs_f64() * 100.0).min(100.0)
        }
        _ => 0.0,
    }
}

/// Turns a cover path returned by a service into something the host can load.
///
/// Absolute URLs and site-relative paths pass through untouched. Protocol-relative
/// URLs inherit the scheme of the site the player runs on.
pub fn resolve_cover_url(cover: &str, site: &Url) -> Option<String> {
    let cover = cover.trim();
    if cover.is_empty() {
        return None;
    }
    let lower = cover.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(cover.to_owned());
    }
    if cover.starts_with("//") {
        return Some(format!("{}:{cover}", site.scheme()));
    }
    Some(cover.to_owned())
}

/// Display fields that came from the caller, the track payload or the catalog.
/// The host page and the placeholder title never show up here.
pub(crate) fn known_metadata(
    options: &PlayOptions,
    payload_cover: Option<&str>,
    catalog: Option<&CatalogMetadata>,
    site: &Url,
) -> KnownMetadata {
    KnownMetadata {
        title: options
            .title
            .clone()
            .or_else(|| catalog.and_then(|c| c.title.clone())),
        artist: options
            .artist
            .clone()
            .or_else(|| catalog.and_then(|c| c.artist_name.clone())),
        cover: options
            .cover
            .as_deref()
            .or(payload_cover)
            .or_else(|| catalog.and_then(|c| c.cover.as_deref()))
            .and_then(|c| resolve_cover_url(c, site)),
    }
}

/// Fills whatever `known` lacks from the host page, then from the placeholder.
pub(crate) fn resolve_display_metadata(
    track_id: &str,
    known: &KnownMetadata,
    page: &PageMetadata,
) -> DisplayMetadata {
    DisplayMetadata {
        title: known
            .title
            .clone()
            .or_else(|| page.title.clone())
            .unwrap_or_else(|| format!("Track {track_id}")),
        artist: known
            .artist
            .clone()
            .or_else(|| page.artist.clone())
            .unwrap_or_default(),
        cover: known.cover.clone().or_else(|| page.cover.clone()),
    }
}

pub(crate) fn loading_metadata() -> DisplayMetadata {
    DisplayMetadata {
        title: LOADING_TITLE.to_owned(),
        artist: String::new(),
        cover: None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;

    fn site() -> Url {
        Url::parse("https://oversound.example/shop").unwrap()
    }

    #[rstest]
    #[case(Some(0.0), "0:00")]
    #[case(Some(9.9), "0:09")]
    #[case(Some(65.0), "1:05")]
    #[case(Some(3599.0), "59:59")]
    #[case(Some(3600.0), "1:00:00")]
    #[case(Some(3725.0), "1:02:05")]
    #[case(Some(-4.0), "0:00")]
    #[case(Some(f64::INFINITY), "--:--")]
    #[case(Some(f64::NAN), "--:--")]
    #[case(None, "--:--")]
    fn test_format_time(#[case] seconds: Option<f64>, #[case] expected: &str) {
        assert_eq!(expected, format_time(seconds));
    }

    #[test]
    fn test_time_display() {
        assert_eq!(LOADING_TIME, time_display(true, None, None));
        assert_eq!(
            "0:30 / --:--",
            time_display(false, Some(Duration::from_secs(30)), None)
        );
        assert_eq!(
            "1:00 / 3:20",
            time_display(
                false,
                Some(Duration::from_secs(60)),
                Some(Duration::from_secs(200))
            )
        );
    }

    #[rstest]
    #[case(0, Some(1000), 0)]
    #[case(506, Some(1000), 51)]
    #[case(1000, Some(1000), 100)]
    #[case(1500, Some(1000), 100)]
    #[case(0, None, 5)]
    #[case(65536 * 10, None, 10)]
    #[case(65536 * 61, None, 5)]
    #[case(65536 * 59, None, 59)]
    #[case(100, Some(0), 5)]
    fn test_download_progress(
        #[case] received: u64,
        #[case] total: Option<u64>,
        #[case] expected: u8,
    ) {
        assert_eq!(expected, download_progress(received, total));
    }

    #[test]
    fn test_playback_progress() {
        assert_eq!(0.0, playback_progress(Some(Duration::from_secs(5)), None));
        assert_eq!(
            50.0,
            playback_progress(Some(Duration::from_secs(5)), Some(Duration::from_secs(10)))
        );
    }

    #[rstest]
    #[case("https://cdn.example/c.png", Some("https://cdn.example/c.png"))]
    #[case("HTTP://cdn.example/c.png", Some("HTTP://cdn.example/c.png"))]
    #[case("//cdn.example/c.png", Some("https://cdn.example/c.png"))]
    #[case("/static/covers/c.png", Some("/static/covers/c.png"))]
    #[case("  ", None)]
    fn test_resolve_cover_url(#[case] cover: &str, #[case] expected: Option<&str>) {
        assert_eq!(expected.map(str::to_owned), resolve_cover_url(cover, &site()));
    }

    #[test]
    fn test_options_take_priority_over_everything() {
        let options = PlayOptions::new().title("T").artist("A").cover("/o.png");
        let catalog = CatalogMetadata {
            title: Some("Catalog".to_owned()),
            artist_name: Some("Catalog Artist".to_owned()),
            cover: Some("/c.png".to_owned()),
        };
        let page = PageMetadata {
            title: Some("Page".to_owned()),
            artist: Some("Page Artist".to_owned()),
            cover: Some("/p.png".to_owned()),
        };
        let known = known_metadata(&options, Some("/j.png"), Some(&catalog), &site());
        let resolved = resolve_display_metadata("1", &known, &page);
        assert_eq!(
            DisplayMetadata {
                title: "T".to_owned(),
                artist: "A".to_owned(),
                cover: Some("/o.png".to_owned()),
            },
            resolved
        );
    }

    #[test]
    fn test_payload_cover_beats_catalog_cover() {
        let catalog = CatalogMetadata {
            title: Some("Catalog".to_owned()),
            artist_name: None,
            cover: Some("/c.png".to_owned()),
        };
        let page = PageMetadata {
            artist: Some("Page Artist".to_owned()),
            ..Default::default()
        };
        let known = known_metadata(&PlayOptions::new(), Some("/j.png"), Some(&catalog), &site());
        let resolved = resolve_display_metadata("1", &known, &page);
        assert_eq!("Catalog", resolved.title);
        assert_eq!("Page Artist", resolved.artist);
        assert_eq!(Some("/j.png".to_owned()), resolved.cover);
    }

    #[test]
    fn test_placeholder_when_nothing_is_known() {
        let known = known_metadata(&PlayOptions::new(), None, None, &site());
        assert_eq!(KnownMetadata::default(), known);
        let resolved = resolve_display_metadata("42", &known, &PageMetadata::default());
        assert_eq!(
            DisplayMetadata {
                title: "Track 42".to_owned(),
                artist: String::new(),
                cover: None,
            },
            resolved
        );
    }

    #[test]
    fn test_page_fallback_is_not_known_metadata() {
        let catalog = CatalogMetadata {
            title: Some("Catalog".to_owned()),
            ..Default::default()
        };
        let page = PageMetadata {
            artist: Some("Page Artist".to_owned()),
            cover: Some("/p.png".to_owned()),
            ..Default::default()
        };
        let known = known_metadata(&PlayOptions::new(), None, Some(&catalog), &site());
        assert_eq!(
            KnownMetadata {
                title: Some("Catalog".to_owned()),
                artist: None,
                cover: None,
            },
            known
        );

        let resolved = resolve_display_metadata("1", &known, &page);
        assert_eq!("Page Artist", resolved.artist);
        assert_eq!(Some("/p.png".to_owned()), resolved.cover);
    }
}
