use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::{
    ArtistRecord, CatalogService, SongRecord, TrackPayload, TrackService, TrackStream, endpoint,
};
use crate::dto::load_error::LoadError;
use crate::settings::Settings;

const JSON: &str = "application/json";

pub(crate) fn build_client(settings: &Settings) -> Result<ClientWithMiddleware, LoadError> {
    let client = Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Track service over HTTP.
///
/// With a track service configured, the JSON transport is tried first against
/// `{track_service}/track/{id}`. The raw stream falls back to the site origin when no
/// track service exists.
#[derive(Debug, Clone)]
pub struct HttpTrackService {
    client: ClientWithMiddleware,
    track_service: Option<Url>,
    site: Url,
}

impl HttpTrackService {
    pub fn new(settings: &Settings) -> Result<Self, LoadError> {
        Ok(Self {
            client: build_client(settings)?,
            track_service: settings.track_service_url.clone(),
            site: settings.site_url.clone(),
        })
    }

    fn track_url(&self, track_id: &str) -> Result<Url, LoadError> {
        endpoint(
            self.track_service.as_ref().unwrap_or(&self.site),
            &["track", track_id],
        )
    }
}

#[async_trait]
impl TrackService for HttpTrackService {
    async fn fetch_payload(&self, track_id: &str) -> Result<Option<TrackPayload>, LoadError> {
        if self.track_service.is_none() {
            return Ok(None);
        }
        let url = self.track_url(track_id)?;
        info!("Requesting track payload from {url}");
        let res = self.client.get(url).header(ACCEPT, JSON).send().await?;
        if !res.status().is_success() {
            warn!(
                "Track payload request returned {}, falling back to stream",
                res.status()
            );
            return Ok(None);
        }

        // A track service may answer the JSON request with the raw audio itself
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        if !content_type.as_deref().is_some_and(|v| v.starts_with(JSON)) {
            info!(
                "Track payload answered with {}, falling back to stream",
                content_type.as_deref().unwrap_or("no content type")
            );
            return Ok(None);
        }
        let body = res.bytes().await?;
        TrackPayload::from_json(&body).map(Some)
    }

    async fn open_stream(&self, track_id: &str) -> Result<TrackStream, LoadError> {
        let url = self.track_url(track_id)?;
        info!("Streaming track from {url}");
        let res = self.client.get(url).header(ACCEPT, "audio/*").send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let content_length = res.content_length();
        let chunks = res
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(LoadError::from)
            .boxed();

        Ok(TrackStream {
            content_type,
            content_length,
            chunks,
        })
    }
}

/// Catalog lookups through the site's `/api` proxy.
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    client: ClientWithMiddleware,
    site: Url,
}

impl HttpCatalogService {
    pub fn new(settings: &Settings) -> Result<Self, LoadError> {
        Ok(Self {
            client: build_client(settings)?,
            site: settings.site_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, LoadError> {
        let url = endpoint(&self.site, segments)?;
        let res = self.client.get(url).header(ACCEPT, JSON).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
            });
        }
        let body = res.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| LoadError::UnsupportedResponse(e.to_string()))
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn song(&self, song_id: &str) -> Result<SongRecord, LoadError> {
        self.get_json(&["api", "song", song_id]).await
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistRecord, LoadError> {
        self.get_json(&["api", "artist", artist_id]).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answers every connection with the same canned response and forwards the
    /// request head of each connection.
    async fn serve(
        status: &'static str,
        content_type: Option<&'static str>,
        body: &'static [u8],
    ) -> (Url, flume::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let (request_tx, request_rx) = flume::unbounded();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = request_tx.send(String::from_utf8_lossy(&head).to_ascii_lowercase());

                let mut response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    body.len()
                );
                if let Some(content_type) = content_type {
                    response.push_str(&format!("Content-Type: {content_type}\r\n"));
                }
                response.push_str("\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            }
        });
        (url, request_rx)
    }

    fn settings(url: &Url, with_track_service: bool) -> Settings {
        Settings {
            track_service_url: with_track_service.then(|| url.clone()),
            site_url: url.clone(),
            max_retries: 0,
            ..Default::default()
        }
    }

    async fn fetch_payload(
        status: &'static str,
        content_type: Option<&'static str>,
        body: &'static [u8],
    ) -> (Result<Option<TrackPayload>, LoadError>, String) {
        let (url, requests) = serve(status, content_type, body).await;
        let service = HttpTrackService::new(&settings(&url, true)).unwrap();
        let result = service.fetch_payload("7").await;
        (result, requests.recv_async().await.unwrap())
    }

    async fn open_stream(
        status: &'static str,
        content_type: Option<&'static str>,
        body: &'static [u8],
    ) -> (Result<(Option<String>, Option<u64>, Vec<u8>), LoadError>, String) {
        let (url, requests) = serve(status, content_type, body).await;
        let service = HttpTrackService::new(&settings(&url, false)).unwrap();
        let result = match service.open_stream("7").await {
            Ok(stream) => stream
                .chunks
                .try_concat()
                .await
                .map(|bytes| (stream.content_type, stream.content_length, bytes)),
            Err(e) => Err(e),
        };
        (result, requests.recv_async().await.unwrap())
    }

    #[tokio::test]
    async fn test_json_payload_with_track() {
        let (result, request) = fetch_payload(
            "200 OK",
            Some("application/json"),
            br#"{"track": "YWJj", "mime": "audio/ogg", "song": {"cover": "/c.png"}}"#,
        )
        .await;

        assert!(request.starts_with("get /track/7 http/1.1"));
        assert!(request.contains("accept: application/json"));
        let payload = result.unwrap().unwrap();
        assert_eq!(Some("/c.png"), payload.cover_path());
        let blob = payload.audio().unwrap().unwrap();
        assert_eq!(b"abc".to_vec(), blob.bytes);
        assert_eq!("audio/ogg", blob.mime);
    }

    #[tokio::test]
    async fn test_json_payload_without_track() {
        let (result, _) = fetch_payload(
            "200 OK",
            Some("Application/JSON; charset=utf-8"),
            br#"{"cover": "/static/a.png"}"#,
        )
        .await;

        let payload = result.unwrap().unwrap();
        assert_eq!(None, payload.audio().unwrap());
        assert_eq!(Some("/static/a.png"), payload.cover_path());
    }

    #[rstest]
    #[case("200 OK", Some("audio/mpeg"), b"ID3raw".as_slice())]
    #[case("200 OK", Some("text/html"), b"<html></html>".as_slice())]
    #[case("200 OK", None, b"raw".as_slice())]
    #[case("404 Not Found", Some("application/json"), br#"{"error": "missing"}"#.as_slice())]
    #[tokio::test]
    async fn test_payload_falls_back_to_stream(
        #[case] status: &'static str,
        #[case] content_type: Option<&'static str>,
        #[case] body: &'static [u8],
    ) {
        let (result, _) = fetch_payload(status, content_type, body).await;
        assert_matches!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_malformed_json_payload_is_unsupported() {
        let (result, _) = fetch_payload("200 OK", Some("application/json"), b"not json").await;
        assert_matches!(result, Err(LoadError::UnsupportedResponse(_)));
    }

    #[tokio::test]
    async fn test_no_payload_without_track_service() {
        let service = HttpTrackService::new(&Settings::default()).unwrap();
        assert_matches!(service.fetch_payload("7").await, Ok(None));
    }

    #[tokio::test]
    async fn test_stream_reports_type_and_length() {
        let (result, request) = open_stream("200 OK", Some("audio/ogg"), b"abcdef").await;

        assert!(request.starts_with("get /track/7 http/1.1"));
        assert!(request.contains("accept: audio/*"));
        let (content_type, content_length, bytes) = result.unwrap();
        assert_eq!(Some("audio/ogg".to_owned()), content_type);
        assert_eq!(Some(6), content_length);
        assert_eq!(b"abcdef".to_vec(), bytes);
    }

    #[tokio::test]
    async fn test_stream_error_status() {
        let (result, _) = open_stream("404 Not Found", Some("text/plain"), b"missing").await;
        assert_matches!(result, Err(LoadError::Http { status: 404 }));
    }

    #[tokio::test]
    async fn test_catalog_song_lookup() {
        let (url, requests) = serve(
            "200 OK",
            Some("application/json"),
            br#"{"title": "Song", "artistId": 9, "cover": "/s.png"}"#,
        )
        .await;
        let catalog = HttpCatalogService::new(&settings(&url, false)).unwrap();

        let song = catalog.song("s1").await.unwrap();
        let request = requests.recv_async().await.unwrap();
        assert!(request.starts_with("get /api/song/s1 http/1.1"));
        assert!(request.contains("accept: application/json"));
        assert_eq!(Some("Song"), song.display_title());
        assert_eq!(Some("9".to_owned()), song.artist_id);
        assert_eq!(Some("/s.png"), song.cover_path());
    }

    #[tokio::test]
    async fn test_catalog_artist_lookup() {
        let (url, requests) = serve(
            "200 OK",
            Some("application/json"),
            br#"{"artisticName": "Band", "image": "/a.png"}"#,
        )
        .await;
        let catalog = HttpCatalogService::new(&settings(&url, false)).unwrap();

        let artist = catalog.artist("a9").await.unwrap();
        let request = requests.recv_async().await.unwrap();
        assert!(request.starts_with("get /api/artist/a9 http/1.1"));
        assert_eq!(Some("Band"), artist.display_name());
        assert_eq!(Some("/a.png"), artist.image_path());
    }

    #[tokio::test]
    async fn test_catalog_error_status() {
        let (url, _requests) = serve("404 Not Found", Some("application/json"), b"{}").await;
        let catalog = HttpCatalogService::new(&settings(&url, false)).unwrap();
        assert_matches!(
            catalog.artist("a9").await,
            Err(LoadError::Http { status: 404 })
        );
    }

    #[tokio::test]
    async fn test_catalog_non_json_is_unsupported() {
        let (url, _requests) = serve("200 OK", Some("text/html"), b"<html></html>").await;
        let catalog = HttpCatalogService::new(&settings(&url, false)).unwrap();
        assert_matches!(
            catalog.song("s1").await,
            Err(LoadError::UnsupportedResponse(_))
        );
    }
}
