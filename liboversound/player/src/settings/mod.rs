use std::env;
use std::time::Duration;

use reqwest::Url;
use tracing::warn;

const DEFAULT_SITE_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug)]
pub struct Settings {
    /// Base URL of the track provider. When unset, audio is streamed from the site itself.
    pub track_service_url: Option<Url>,
    /// Origin of the site, used for the `/api` catalog proxy and protocol-relative covers.
    pub site_url: Url,
    pub seek_step: Duration,
    pub default_volume: f32,
    /// Upper bound on the catalog lookup so slow metadata never holds back playback.
    pub metadata_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track_service_url: None,
            site_url: Url::parse(DEFAULT_SITE_URL).expect("default site url is valid"),
            seek_step: Duration::from_secs(10),
            default_volume: 1.0,
            metadata_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

impl Settings {
    /// Reads overrides from `OVERSOUND_*` variables, keeping defaults for anything
    /// missing or malformed.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(url) = parse_var::<Url>("OVERSOUND_TRACK_SERVICE_URL") {
            settings.track_service_url = Some(url);
        }
        if let Some(url) = parse_var::<Url>("OVERSOUND_SITE_URL") {
            settings.site_url = url;
        }
        if let Some(secs) = parse_var::<f64>("OVERSOUND_SEEK_STEP_SECS").filter(|s| *s > 0.0) {
            settings.seek_step = Duration::from_secs_f64(secs);
        }
        if let Some(volume) = parse_var::<f32>("OVERSOUND_DEFAULT_VOLUME") {
            settings.default_volume = clamp_volume(volume, 1.0);
        }
        settings
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    if value.trim().is_empty() {
        return None;
    }
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring invalid value for {name}: {value}");
            None
        }
    }
}

/// Clamps to `[0, 1]`, falling back when the value is not a number.
pub(crate) fn clamp_volume(volume: f32, fallback: f32) -> f32 {
    if volume.is_nan() {
        fallback
    } else {
        volume.clamp(0.0, 1.0)
    }
}
