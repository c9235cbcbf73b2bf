//! Routing of clicks on rendered track elements to play requests.

use crate::dto::track::PlayRequest;

pub const TRACK_ID_ATTR: &str = "data-track-id";
pub const SONG_ID_ATTRS: [&str; 2] = ["data-song-id", "data-songid"];
pub const ARTIST_ID_ATTR: &str = "artist-id";
pub const PLAY_CONTROL_CLASSES: [&str; 2] = ["track-play-btn", "play-button"];
/// Containers that only navigate. Clicks inside them never start playback.
pub const PROFILE_CONTAINER_CLASSES: [&str; 2] = ["artist-main", "profile-main"];
pub const PROFILE_PAGE_CLASSES: [&str; 2] = ["artist-profile", "profile-page"];

/// One element on the path from the click target up to the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl ElementInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn has_any_class(&self, classes: &[&str]) -> bool {
        classes.iter().any(|c| self.has_class(c))
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickContext {
    /// Target first, root last.
    pub path: Vec<ElementInfo>,
    pub body_classes: Vec<String>,
}

/// Resolves a click to a play request.
///
/// The click must land on a play control that belongs to the nearest element carrying
/// a track id, and must not come from a profile page or container.
pub fn play_request_for_click(click: &ClickContext) -> Option<PlayRequest> {
    let track_pos = click
        .path
        .iter()
        .position(|e| e.attribute(TRACK_ID_ATTR).is_some())?;

    let in_profile = click
        .path
        .iter()
        .any(|e| e.has_any_class(&PROFILE_CONTAINER_CLASSES))
        || click
            .body_classes
            .iter()
            .any(|c| PROFILE_PAGE_CLASSES.contains(&c.as_str()));
    if in_profile {
        return None;
    }

    // The play control has to sit between the target and the track element
    let control_pos = click
        .path
        .iter()
        .position(|e| e.has_any_class(&PLAY_CONTROL_CLASSES))?;
    if control_pos > track_pos {
        return None;
    }

    let element = &click.path[track_pos];
    let mut request = PlayRequest::new(element.attribute(TRACK_ID_ATTR)?);
    if let Some(song_id) = SONG_ID_ATTRS.iter().find_map(|a| element.attribute(a)) {
        request = request.song(song_id);
    }
    if let Some(artist_id) = element.attribute(ARTIST_ID_ATTR) {
        request = request.artist(artist_id);
    }
    Some(request)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn track_row() -> ElementInfo {
        ElementInfo::new()
            .class("track-row")
            .attr(TRACK_ID_ATTR, "7")
            .attr("data-songid", "70")
            .attr(ARTIST_ID_ATTR, "3")
    }

    fn click(path: Vec<ElementInfo>) -> ClickContext {
        ClickContext {
            path,
            body_classes: vec![],
        }
    }

    #[test]
    fn test_click_on_play_button_inside_track_plays() {
        let ctx = click(vec![
            ElementInfo::new().class("icon"),
            ElementInfo::new().class("play-button"),
            track_row(),
            ElementInfo::new().class("album-list"),
        ]);
        assert_eq!(
            Some(PlayRequest::new("7").song("70").artist("3")),
            play_request_for_click(&ctx)
        );
    }

    #[test]
    fn test_click_elsewhere_in_track_row_is_ignored() {
        let ctx = click(vec![ElementInfo::new().class("title"), track_row()]);
        assert_eq!(None, play_request_for_click(&ctx));
    }

    #[test]
    fn test_click_outside_any_track_is_ignored() {
        let ctx = click(vec![ElementInfo::new().class("play-button")]);
        assert_eq!(None, play_request_for_click(&ctx));
    }

    #[test]
    fn test_play_control_outside_track_element_is_ignored() {
        let ctx = click(vec![
            track_row(),
            ElementInfo::new().class("track-play-btn"),
        ]);
        assert_eq!(None, play_request_for_click(&ctx));
    }

    #[test]
    fn test_profile_container_blocks_playback() {
        let ctx = click(vec![
            ElementInfo::new().class("play-button"),
            track_row(),
            ElementInfo::new().class("artist-main"),
        ]);
        assert_eq!(None, play_request_for_click(&ctx));
    }

    #[test]
    fn test_profile_page_blocks_playback() {
        let mut ctx = click(vec![ElementInfo::new().class("play-button"), track_row()]);
        ctx.body_classes = vec!["profile-page".to_owned()];
        assert_eq!(None, play_request_for_click(&ctx));
    }

    #[test]
    fn test_song_id_prefers_dashed_attribute() {
        let row = ElementInfo::new()
            .attr(TRACK_ID_ATTR, "1")
            .attr("data-song-id", "10")
            .attr("data-songid", "11");
        let ctx = click(vec![ElementInfo::new().class("track-play-btn"), row]);
        assert_eq!(
            Some(PlayRequest::new("1").song("10")),
            play_request_for_click(&ctx)
        );
    }
}
