use std::fmt;

/// Pointer/touch inactivity after which the controls bar hides during playback.
pub const CONTROLS_HIDE_DELAY_MS: u32 = 3_000;

const FULL_VOLUME: u8 = 100;

/// Formats seconds as `M:SS`. Unknown or non-finite values read `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }

    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackRate {
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub const ALL: [Self; 6] = [
        Self::Half,
        Self::ThreeQuarters,
        Self::Normal,
        Self::OneAndQuarter,
        Self::OneAndHalf,
        Self::Double,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::ThreeQuarters => 0.75,
            Self::Normal => 1.0,
            Self::OneAndQuarter => 1.25,
            Self::OneAndHalf => 1.5,
            Self::Double => 2.0,
        }
    }

    pub fn as_value(self) -> &'static str {
        match self {
            Self::Half => "0.5",
            Self::ThreeQuarters => "0.75",
            Self::Normal => "1",
            Self::OneAndQuarter => "1.25",
            Self::OneAndHalf => "1.5",
            Self::Double => "2",
        }
    }

    /// Parses a `<select>` value; anything outside the discrete set is rejected.
    pub fn from_value(value: &str) -> Option<Self> {
        let parsed = value.trim().parse::<f64>().ok()?;
        Self::ALL
            .into_iter()
            .find(|rate| (rate.as_f64() - parsed).abs() < f64::EPSILON)
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_value())
    }
}

/// Transport state of the single lightbox video element.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoTransport {
    playing: bool,
    current_time: f64,
    /// `None` until the element reports a finite duration.
    duration: Option<f64>,
    volume: u8,
    muted: bool,
    rate: PlaybackRate,
    controls_visible: bool,
}

impl Default for VideoTransport {
    fn default() -> Self {
        Self {
            playing: false,
            current_time: 0.0,
            duration: None,
            volume: FULL_VOLUME,
            muted: false,
            rate: PlaybackRate::Normal,
            controls_visible: true,
        }
    }
}

impl VideoTransport {
    /// Resets per-item state for a newly assigned source. The playback rate is kept.
    pub fn load_source(&mut self) {
        let rate = self.rate;
        *self = Self {
            rate,
            ..Self::default()
        };
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        if !playing {
            self.controls_visible = true;
        }
    }

    pub fn time_update(&mut self, current_time: f64, duration: f64) {
        self.current_time = if current_time.is_finite() { current_time } else { 0.0 };
        self.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
    }

    /// Playback position as a percentage of duration, 0 when the duration is unknown.
    pub fn progress_percent(&self) -> f64 {
        let Some(duration) = self.duration else {
            return 0.0;
        };

        (self.current_time / duration * 100.0).clamp(0.0, 100.0)
    }

    /// Timestamp a progress-bar position maps to, `None` while the duration is unknown.
    pub fn seek_target(&self, percent: f64) -> Option<f64> {
        let duration = self.duration?;
        percent
            .is_finite()
            .then(|| percent.clamp(0.0, 100.0) / 100.0 * duration)
    }

    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_time),
            format_time(self.duration.unwrap_or(f64::NAN))
        )
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Sets the volume from a 0..=100 slider value. Zero volume mutes.
    pub fn set_volume(&mut self, level: f64) {
        let level = if level.is_finite() {
            level.clamp(0.0, f64::from(FULL_VOLUME))
        } else {
            f64::from(FULL_VOLUME)
        };

        self.volume = level.round() as u8;
        self.muted = self.volume == 0;
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Volume as the media element expects it.
    pub fn volume_fraction(&self) -> f64 {
        f64::from(self.volume) / f64::from(FULL_VOLUME)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn show_controls(&mut self) {
        self.controls_visible = true;
    }

    /// Called when the inactivity timer fires. Paused video keeps its controls.
    pub fn hide_controls_if_playing(&mut self) {
        if self.playing {
            self.controls_visible = false;
        }
    }
}
