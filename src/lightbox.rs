use crate::media::{MediaItem, MediaKind};
use crate::transport::{PlaybackRate, VideoTransport};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Generation a deferred media signal was issued for. Signals from older generations are
/// dropped, so the most recent `open`/`nav` always wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Hidden,
    Image,
    Video,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Close,
    Nav(Direction),
    TogglePlayback,
}

impl KeyCommand {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" => Some(Self::Close),
            "ArrowLeft" => Some(Self::Nav(Direction::Backward)),
            "ArrowRight" => Some(Self::Nav(Direction::Forward)),
            " " | "Spacebar" => Some(Self::TogglePlayback),
            _ => None,
        }
    }

    /// Space would otherwise scroll the page behind the overlay.
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::TogglePlayback)
    }

    pub fn into_action(self) -> LightboxAction {
        match self {
            Self::Close => LightboxAction::Close,
            Self::Nav(direction) => LightboxAction::Nav(direction),
            Self::TogglePlayback => LightboxAction::TogglePlayback,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LightboxAction {
    Open { index: usize, items: Vec<MediaItem> },
    Nav(Direction),
    Close,
    TogglePlayback,
    CanPlay { token: LoadToken, src: String },
    ImageLoaded { token: LoadToken, src: String },
    MediaFailed { token: LoadToken, src: String },
    PlaybackChanged { token: LoadToken, playing: bool },
    TimeUpdate {
        token: LoadToken,
        src: String,
        current_time: f64,
        duration: f64,
    },
    ToggleMute,
    SetVolume(f64),
    SetRate(PlaybackRate),
    ShowControls,
    HideControls,
}

/// The page's single lightbox. Created closed and empty, mutated by `open`, `nav` and `close`.
#[derive(Clone, Debug, PartialEq)]
pub struct LightboxState {
    open: bool,
    items: Rc<[MediaItem]>,
    current_index: usize,
    generation: u64,
    loading: bool,
    revealed: bool,
    failed: bool,
    transport: VideoTransport,
}

impl Default for LightboxState {
    fn default() -> Self {
        Self {
            open: false,
            items: Rc::from(Vec::new()),
            current_index: 0,
            generation: 0,
            loading: false,
            revealed: false,
            failed: false,
            transport: VideoTransport::default(),
        }
    }
}

impl LightboxState {
    /// Returns whether the action changed anything observable.
    pub fn apply(&mut self, action: LightboxAction) -> bool {
        match action {
            LightboxAction::Open { index, items } => self.open(index, items),
            LightboxAction::Nav(direction) => self.nav(direction),
            LightboxAction::Close => self.close(),
            LightboxAction::TogglePlayback => self.toggle_play_pause(),
            LightboxAction::CanPlay { token, src } => self.can_play(token, &src),
            LightboxAction::ImageLoaded { token, src } => self.image_loaded(token, &src),
            LightboxAction::MediaFailed { token, src } => self.media_failed(token, &src),
            LightboxAction::PlaybackChanged { token, playing } => {
                self.playback_changed(token, playing)
            }
            LightboxAction::TimeUpdate {
                token,
                src,
                current_time,
                duration,
            } => self.time_update(token, &src, current_time, duration),
            LightboxAction::ToggleMute => {
                self.transport.toggle_mute();
                true
            }
            LightboxAction::SetVolume(level) => {
                self.transport.set_volume(level);
                true
            }
            LightboxAction::SetRate(rate) => {
                self.transport.set_rate(rate);
                true
            }
            LightboxAction::ShowControls => {
                self.transport.show_controls();
                true
            }
            LightboxAction::HideControls => {
                self.transport.hide_controls_if_playing();
                true
            }
        }
    }

    /// Rejects an empty list or an out-of-range index and leaves the state untouched.
    pub fn open(&mut self, index: usize, items: Vec<MediaItem>) -> bool {
        if index >= items.len() {
            return false;
        }

        self.items = Rc::from(items);
        self.current_index = index;
        self.open = true;
        self.update_content();
        true
    }

    pub fn nav(&mut self, direction: Direction) -> bool {
        if !self.open || self.items.is_empty() {
            return false;
        }

        let len = self.items.len();
        self.current_index = match direction {
            Direction::Forward => (self.current_index + 1) % len,
            Direction::Backward => (self.current_index + len - 1) % len,
        };
        self.update_content();
        true
    }

    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }

        self.open = false;
        self.generation += 1;
        self.loading = false;
        self.revealed = false;
        self.failed = false;
        self.transport.set_playing(false);
        true
    }

    pub fn toggle_play_pause(&mut self) -> bool {
        if self.surface() != Surface::Video {
            return false;
        }

        let playing = !self.transport.is_playing();
        self.transport.set_playing(playing);
        true
    }

    fn update_content(&mut self) {
        self.generation += 1;
        self.revealed = false;
        self.failed = false;

        let is_video = self.current().is_some_and(|item| item.kind.is_video());
        self.loading = is_video;
        if is_video {
            self.transport.load_source();
        } else {
            self.transport.set_playing(false);
        }
    }

    fn is_current(&self, token: LoadToken, src: &str) -> bool {
        self.open
            && token == self.token()
            && self.current().is_some_and(|item| item.src == src)
    }

    /// Buffered enough to play. Starts playback only for the item still on screen, and only on
    /// the first signal of a load. Later `canplay` events leave the play intent alone.
    pub fn can_play(&mut self, token: LoadToken, src: &str) -> bool {
        if !self.is_current(token, src) || self.surface() != Surface::Video || !self.loading {
            return false;
        }

        self.loading = false;
        self.revealed = true;
        self.transport.set_playing(true);
        true
    }

    pub fn image_loaded(&mut self, token: LoadToken, src: &str) -> bool {
        if !self.is_current(token, src) || self.surface() != Surface::Image {
            return false;
        }

        self.revealed = true;
        true
    }

    /// Clears the loading indicator and leaves the lightbox open with nothing shown.
    pub fn media_failed(&mut self, token: LoadToken, src: &str) -> bool {
        if !self.is_current(token, src) {
            return false;
        }

        self.loading = false;
        self.revealed = false;
        self.failed = true;
        self.transport.set_playing(false);
        true
    }

    pub fn playback_changed(&mut self, token: LoadToken, playing: bool) -> bool {
        if !self.open || token != self.token() || self.surface() != Surface::Video {
            return false;
        }

        self.transport.set_playing(playing);
        true
    }

    pub fn time_update(
        &mut self,
        token: LoadToken,
        src: &str,
        current_time: f64,
        duration: f64,
    ) -> bool {
        if !self.is_current(token, src) {
            return false;
        }

        self.transport.time_update(current_time, duration);
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    #[cfg(test)]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    #[cfg(test)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.open
            .then(|| self.items.get(self.current_index))
            .flatten()
    }

    pub fn token(&self) -> LoadToken {
        LoadToken(self.generation)
    }

    pub fn surface(&self) -> Surface {
        match self.current().map(|item| item.kind) {
            Some(MediaKind::Video) => Surface::Video,
            Some(MediaKind::Image) => Surface::Image,
            None => Surface::Hidden,
        }
    }

    /// Source for the shared video element. `None` means the element is released.
    pub fn video_src(&self) -> Option<&str> {
        (self.surface() == Surface::Video)
            .then(|| self.current().map(|item| item.src.as_str()))
            .flatten()
    }

    pub fn image_src(&self) -> Option<&str> {
        (self.surface() == Surface::Image)
            .then(|| self.current().map(|item| item.src.as_str()))
            .flatten()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn transport(&self) -> &VideoTransport {
        &self.transport
    }

    /// Caption title and category, empty when the item carries none.
    pub fn caption(&self) -> (&str, &str) {
        self.current()
            .map(|item| (item.title_or_empty(), item.category_or_empty()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_items() -> Vec<MediaItem> {
        vec![
            MediaItem::image("/imgA.jpg").with_title("A").with_category("weddings"),
            MediaItem::video("/vidB.mp4"),
            MediaItem::image("/imgC.jpg"),
        ]
    }

    fn video_items() -> Vec<MediaItem> {
        vec![
            MediaItem::video("/vid0.mp4"),
            MediaItem::video("/vid1.mp4"),
            MediaItem::video("/vid2.mp4"),
        ]
    }

    #[test]
    fn starts_closed_and_empty() {
        let state = LightboxState::default();

        assert!(!state.is_open());
        assert!(state.items().is_empty());
        assert_eq!(state.surface(), Surface::Hidden);
        assert_eq!(state.current(), None);
    }

    #[test]
    fn open_shows_requested_item() {
        let items = mixed_items();

        for index in 0..items.len() {
            let mut state = LightboxState::default();
            assert!(state.open(index, items.clone()));
            assert!(state.is_open());
            assert_eq!(state.current(), Some(&items[index]));
        }
    }

    #[test]
    fn open_rejects_invalid_input() {
        let mut state = LightboxState::default();

        assert!(!state.open(0, Vec::new()));
        assert!(!state.open(3, mixed_items()));
        assert!(!state.is_open());
    }

    #[test]
    fn open_replaces_items_wholesale() {
        let mut state = LightboxState::default();
        state.open(2, mixed_items());
        state.open(0, vec![MediaItem::image("/only.jpg")]);

        assert_eq!(state.items().len(), 1);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn forward_nav_is_circular() {
        let items = mixed_items();

        for start in 0..items.len() {
            let mut state = LightboxState::default();
            state.open(start, items.clone());
            for _ in 0..items.len() {
                state.nav(Direction::Forward);
            }
            assert_eq!(state.current_index(), start);
        }
    }

    #[test]
    fn backward_nav_from_first_wraps_to_last() {
        let mut state = LightboxState::default();
        state.open(0, mixed_items());
        state.nav(Direction::Backward);

        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn single_item_nav_stays_put() {
        let mut state = LightboxState::default();
        state.open(0, vec![MediaItem::image("/only.jpg")]);

        state.nav(Direction::Forward);
        state.nav(Direction::Backward);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn nav_is_ignored_while_closed() {
        let mut state = LightboxState::default();
        assert!(!state.nav(Direction::Forward));

        state.open(1, mixed_items());
        state.close();
        assert!(!state.nav(Direction::Forward));
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let mut once = LightboxState::default();
        once.open(1, mixed_items());
        assert!(once.close());

        let mut twice = once.clone();
        assert!(!twice.close());
        assert_eq!(once, twice);
        assert_eq!(twice.video_src(), None);
        assert_eq!(twice.surface(), Surface::Hidden);
    }

    #[test]
    fn video_item_shows_video_surface_and_loading_until_can_play() {
        let mut state = LightboxState::default();
        state.open(1, mixed_items());

        assert_eq!(state.surface(), Surface::Video);
        assert_eq!(state.video_src(), Some("/vidB.mp4"));
        assert_eq!(state.image_src(), None);
        assert!(state.is_loading());
        assert!(!state.transport().is_playing());

        let token = state.token();
        assert!(state.can_play(token, "/vidB.mp4"));
        assert!(!state.is_loading());
        assert!(state.is_revealed());
        assert!(state.transport().is_playing());
    }

    #[test]
    fn navigating_to_an_image_releases_the_video() {
        let mut state = LightboxState::default();
        state.open(1, mixed_items());
        let token = state.token();
        state.can_play(token, "/vidB.mp4");

        state.nav(Direction::Forward);

        assert_eq!(state.surface(), Surface::Image);
        assert_eq!(state.video_src(), None);
        assert_eq!(state.image_src(), Some("/imgC.jpg"));
        assert!(!state.is_loading());
        assert!(!state.transport().is_playing());
    }

    #[test]
    fn stale_can_play_after_rapid_nav_is_ignored() {
        let mut state = LightboxState::default();
        state.open(0, video_items());
        let first = state.token();

        state.nav(Direction::Forward);
        let second = state.token();
        state.nav(Direction::Forward);
        let third = state.token();

        assert!(!state.can_play(first, "/vid0.mp4"));
        assert!(!state.can_play(second, "/vid1.mp4"));
        assert!(state.is_loading());
        assert!(!state.transport().is_playing());

        assert!(state.can_play(third, "/vid2.mp4"));
        assert!(state.transport().is_playing());
        assert_eq!(state.video_src(), Some("/vid2.mp4"));
    }

    #[test]
    fn can_play_for_a_different_src_is_ignored() {
        let mut state = LightboxState::default();
        state.open(0, video_items());
        let token = state.token();

        assert!(!state.can_play(token, "/vid1.mp4"));
        assert!(state.is_loading());
    }

    #[test]
    fn image_reveals_on_load_signal() {
        let mut state = LightboxState::default();
        state.open(0, mixed_items());
        let token = state.token();

        assert!(!state.is_revealed());
        assert!(!state.is_loading());
        assert!(state.image_loaded(token, "/imgA.jpg"));
        assert!(state.is_revealed());
    }

    #[test]
    fn media_error_clears_loading_and_stays_open() {
        let mut state = LightboxState::default();
        state.open(1, mixed_items());
        let token = state.token();

        assert!(state.media_failed(token, "/vidB.mp4"));
        assert!(state.is_open());
        assert!(!state.is_loading());
        assert!(!state.is_revealed());
        assert!(state.has_failed());

        state.nav(Direction::Backward);
        state.nav(Direction::Forward);
        assert!(!state.has_failed());
        assert!(state.is_loading());
    }

    #[test]
    fn toggle_play_pause_only_affects_video() {
        let mut state = LightboxState::default();
        assert!(!state.toggle_play_pause());

        state.open(0, mixed_items());
        assert!(!state.toggle_play_pause());

        state.nav(Direction::Forward);
        let token = state.token();
        state.can_play(token, "/vidB.mp4");
        assert!(state.toggle_play_pause());
        assert!(!state.transport().is_playing());
        assert!(state.toggle_play_pause());
        assert!(state.transport().is_playing());
    }

    #[test]
    fn caption_defaults_to_empty_strings() {
        let mut state = LightboxState::default();
        assert_eq!(state.caption(), ("", ""));

        state.open(0, mixed_items());
        assert_eq!(state.caption(), ("A", "weddings"));

        state.nav(Direction::Forward);
        assert_eq!(state.caption(), ("", ""));
    }

    #[test]
    fn time_updates_from_old_generations_are_dropped() {
        let mut state = LightboxState::default();
        state.open(0, video_items());
        let old = state.token();
        state.nav(Direction::Forward);

        assert!(!state.time_update(old, "/vid0.mp4", 10.0, 20.0));
        assert!(state.time_update(state.token(), "/vid1.mp4", 5.0, 20.0));
        assert_eq!(state.transport().progress_percent(), 25.0);
    }

    #[test]
    fn time_update_from_the_previous_source_is_dropped() {
        let mut state = LightboxState::default();
        state.open(0, video_items());
        state.nav(Direction::Forward);
        let token = state.token();

        assert!(!state.time_update(token, "/vid0.mp4", 10.0, 20.0));
        assert_eq!(state.transport().progress_percent(), 0.0);
    }

    #[test]
    fn can_play_after_a_paused_seek_keeps_the_video_paused() {
        let mut state = LightboxState::default();
        state.open(1, mixed_items());
        let token = state.token();

        assert!(state.can_play(token, "/vidB.mp4"));
        assert!(state.toggle_play_pause());
        assert!(!state.transport().is_playing());

        assert!(!state.can_play(token, "/vidB.mp4"));
        assert!(!state.transport().is_playing());
        assert!(state.is_revealed());
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(KeyCommand::from_key("Escape"), Some(KeyCommand::Close));
        assert_eq!(
            KeyCommand::from_key("ArrowLeft"),
            Some(KeyCommand::Nav(Direction::Backward))
        );
        assert_eq!(
            KeyCommand::from_key("ArrowRight"),
            Some(KeyCommand::Nav(Direction::Forward))
        );
        assert_eq!(KeyCommand::from_key(" "), Some(KeyCommand::TogglePlayback));
        assert_eq!(KeyCommand::from_key("Enter"), None);
        assert!(KeyCommand::TogglePlayback.prevents_default());
        assert!(!KeyCommand::Close.prevents_default());
    }

    #[test]
    fn apply_routes_actions() {
        let mut state = LightboxState::default();
        state.apply(LightboxAction::Open {
            index: 1,
            items: mixed_items(),
        });
        state.apply(LightboxAction::SetRate(PlaybackRate::OneAndHalf));
        state.apply(KeyCommand::Nav(Direction::Forward).into_action());

        assert_eq!(state.current_index(), 2);
        assert_eq!(state.transport().rate(), PlaybackRate::OneAndHalf);

        state.apply(KeyCommand::Close.into_action());
        assert!(!state.is_open());
    }
}
