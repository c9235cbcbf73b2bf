/// Identifiers of the track currently owned by the player. Always replaced as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentTrack {
    pub track_id: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
}

/// Metadata the caller already knows about a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOptions {
    pub add_to_queue: bool,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            add_to_queue: true,
            title: None,
            artist: None,
            cover: None,
        }
    }
}

impl PlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_queue(mut self) -> Self {
        self.add_to_queue = false;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    // Both display fields known up front means the catalog has nothing left to add
    pub(crate) fn has_display_metadata(&self) -> bool {
        self.title.is_some() && self.artist.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub track: CurrentTrack,
    pub options: PlayOptions,
}

impl PlayRequest {
    pub fn new(track_id: impl Into<String>) -> Self {
        Self {
            track: CurrentTrack {
                track_id: track_id.into(),
                ..Default::default()
            },
            options: PlayOptions::new(),
        }
    }

    pub fn song(mut self, song_id: impl Into<String>) -> Self {
        self.track.song_id = Some(song_id.into());
        self
    }

    pub fn artist(mut self, artist_id: impl Into<String>) -> Self {
        self.track.artist_id = Some(artist_id.into());
        self
    }

    pub fn options(mut self, options: PlayOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueEntry {
    pub track_id: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub cover: Option<String>,
}

impl QueueEntry {
    pub(crate) fn from_request(request: &PlayRequest) -> Self {
        Self {
            track_id: request.track.track_id.clone(),
            song_id: request.track.song_id.clone(),
            artist_id: request.track.artist_id.clone(),
            title: request.options.title.clone(),
            artist_name: request.options.artist.clone(),
            cover: request.options.cover.clone(),
        }
    }

    pub(crate) fn to_request(&self) -> PlayRequest {
        let mut options = PlayOptions::new().without_queue();
        options.title = self.title.clone();
        options.artist = self.artist_name.clone();
        options.cover = self.cover.clone();

        PlayRequest {
            track: CurrentTrack {
                track_id: self.track_id.clone(),
                song_id: self.song_id.clone(),
                artist_id: self.artist_id.clone(),
            },
            options,
        }
    }
}

/// What the player surface shows for the active track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayMetadata {
    pub title: String,
    pub artist: String,
    pub cover: Option<String>,
}

/// Display fields resolved from the caller, the track payload or the catalog.
/// `None` where none of them knew the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KnownMetadata {
    pub(crate) title: Option<String>,
    pub(crate) artist: Option<String>,
    pub(crate) cover: Option<String>,
}

/// Metadata currently rendered by the host page, used when no other source knows better.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
}
