use base64::Engine as _;
use base64::engine::general_purpose;
use serde::{Deserialize, Deserializer};

use crate::dto::load_error::LoadError;
use crate::media::AudioBlob;

pub(crate) const DEFAULT_MIME: &str = "audio/mpeg";

/// Body of the track service JSON transport.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TrackPayload {
    /// Base64 encoded audio.
    pub track: Option<String>,
    pub mime: Option<String>,
    pub cover: Option<String>,
    pub song: Option<SongCover>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SongCover {
    pub cover: Option<String>,
}

impl TrackPayload {
    pub fn from_json(body: &[u8]) -> Result<Self, LoadError> {
        serde_json::from_slice(body)
            .map_err(|e| LoadError::UnsupportedResponse(format!("track payload: {e}")))
    }

    /// The nested song cover wins over the top level one.
    pub fn cover_path(&self) -> Option<&str> {
        self.song
            .as_ref()
            .and_then(|s| s.cover.as_deref())
            .or(self.cover.as_deref())
    }

    /// Decodes the embedded audio. `Ok(None)` when the payload carries no audio.
    pub fn audio(&self) -> Result<Option<AudioBlob>, LoadError> {
        let Some(encoded) = self.track.as_deref() else {
            return Ok(None);
        };
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        Ok(Some(AudioBlob {
            bytes,
            mime: self.mime.clone().unwrap_or_else(|| DEFAULT_MIME.to_owned()),
        }))
    }
}

/// `GET /api/song/{id}`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub artist_id: Option<String>,
    pub cover: Option<String>,
    pub image: Option<String>,
}

impl SongRecord {
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    pub fn cover_path(&self) -> Option<&str> {
        self.cover.as_deref().or(self.image.as_deref())
    }
}

/// `GET /api/artist/{id}`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRecord {
    pub artistic_name: Option<String>,
    pub name: Option<String>,
    pub artistic_image: Option<String>,
    pub image: Option<String>,
}

impl ArtistRecord {
    pub fn display_name(&self) -> Option<&str> {
        self.artistic_name.as_deref().or(self.name.as_deref())
    }

    pub fn image_path(&self) -> Option<&str> {
        self.artistic_image.as_deref().or(self.image.as_deref())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

// The catalog is inconsistent about numeric vs string ids
fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_payload_decodes_audio_with_default_mime() {
        let payload = TrackPayload::from_json(br#"{"track": "AAEC\nAw=="}"#).unwrap();
        let blob = payload.audio().unwrap().unwrap();
        assert_eq!(vec![0u8, 1, 2, 3], blob.bytes);
        assert_eq!(DEFAULT_MIME, blob.mime);
    }

    #[test]
    fn test_payload_without_track_has_no_audio() {
        let payload = TrackPayload::from_json(br#"{"cover": "/static/a.png"}"#).unwrap();
        assert_eq!(None, payload.audio().unwrap());
        assert_eq!(Some("/static/a.png"), payload.cover_path());
    }

    #[test]
    fn test_song_cover_wins_over_top_level_cover() {
        let payload = TrackPayload::from_json(
            br#"{"cover": "/top.png", "song": {"cover": "/song.png"}, "mime": "audio/ogg"}"#,
        )
        .unwrap();
        assert_eq!(Some("/song.png"), payload.cover_path());
    }

    #[test]
    fn test_invalid_base64_is_a_decode_error() {
        let payload = TrackPayload::from_json(br#"{"track": "not base64!"}"#).unwrap();
        assert_matches!(payload.audio(), Err(LoadError::Decode(_)));
    }

    #[test]
    fn test_unrecognised_shape_is_unsupported() {
        assert_matches!(
            TrackPayload::from_json(br#"["track"]"#),
            Err(LoadError::UnsupportedResponse(_))
        );
        assert_matches!(
            TrackPayload::from_json(br#"{"track": 12}"#),
            Err(LoadError::UnsupportedResponse(_))
        );
    }

    #[test]
    fn test_song_record_accepts_numeric_artist_id_and_fallback_fields() {
        let song: SongRecord =
            serde_json::from_str(r#"{"name": "Intro", "artistId": 12, "image": "/i.png"}"#)
                .unwrap();
        assert_eq!(Some("Intro"), song.display_title());
        assert_eq!(Some("12".to_owned()), song.artist_id);
        assert_eq!(Some("/i.png"), song.cover_path());
    }

    #[test]
    fn test_artist_record_prefers_artistic_fields() {
        let artist: ArtistRecord = serde_json::from_str(
            r#"{"artisticName": "DJ", "name": "Jane", "artisticImage": "/a.png", "image": "/b.png"}"#,
        )
        .unwrap();
        assert_eq!(Some("DJ"), artist.display_name());
        assert_eq!(Some("/a.png"), artist.image_path());
    }
}
