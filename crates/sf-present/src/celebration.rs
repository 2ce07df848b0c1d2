//! Jackpot celebration panel
//!
//! ## Show sequence
//!
//! ```text
//! Intro ──► Title ──► ProgressDelay ──► Progress ──► Video ──► Shown
//! fade+scale  typewriter    pause        bar fill    clip list
//!                                           │            │
//!                                 ProgressComplete  VideoComplete ──► Completed
//! ```
//!
//! `hide()` abandons the show at any point and fades the panel out from its
//! current alpha. The panel is owned by the host and passed around as a value;
//! there is no process-wide instance.

use serde::{Deserialize, Serialize};
use sf_core::ClipId;

use crate::easing::{Easing, lerp, progress};
use crate::timing::PresentationTiming;

pub const DEFAULT_CELEBRATION_TITLE: &str = "Congratulations, you won the grand prize!";
pub const DEFAULT_PROGRESS_CAPTION: &str = "Loading grand prize...";

/// Video clip played after the progress bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoClip {
    pub id: ClipId,
    /// Playback length; `None` waits for `notify_clip_finished`
    #[serde(default)]
    pub duration_secs: Option<f32>,
}

impl VideoClip {
    pub fn new(id: impl Into<ClipId>, duration_secs: Option<f32>) -> Self {
        Self {
            id: id.into(),
            duration_secs,
        }
    }
}

/// Celebration content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelebrationConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_caption")]
    pub progress_caption: String,
    #[serde(default)]
    pub clips: Vec<VideoClip>,
    /// Keep the last clip looping after the show completes
    #[serde(default)]
    pub loop_last_clip: bool,
}

fn default_title() -> String {
    DEFAULT_CELEBRATION_TITLE.to_string()
}

fn default_caption() -> String {
    DEFAULT_PROGRESS_CAPTION.to_string()
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            progress_caption: default_caption(),
            clips: Vec::new(),
            loop_last_clip: false,
        }
    }
}

/// Panel stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CelebrationStage {
    #[default]
    Hidden,
    Intro,
    Title,
    ProgressDelay,
    Progress,
    Video,
    /// Show finished; panel stays visible until hidden
    Shown,
    Hiding,
}

impl CelebrationStage {
    /// Stages during which `show` is ignored
    pub fn is_showing(self) -> bool {
        matches!(
            self,
            Self::Intro | Self::Title | Self::ProgressDelay | Self::Progress | Self::Video
        )
    }
}

/// Milestones reported by `tick`
#[derive(Debug, Clone, PartialEq)]
pub enum CelebrationSignal {
    ProgressComplete,
    ClipStarted { index: usize, clip: ClipId },
    /// Every clip finished (not sent when the last clip loops or video is stopped)
    VideoComplete,
    /// Show sequence finished; the completion callback has run
    Completed,
    /// Hide fade finished
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VideoStep {
    Playing(usize),
    Gap(usize),
}

type OnComplete = Box<dyn FnOnce() + Send>;

/// Frame-clock celebration panel
pub struct CelebrationSequencer {
    config: CelebrationConfig,
    timing: PresentationTiming,
    stage: CelebrationStage,
    stage_elapsed: f32,
    title: String,
    visible_title: String,
    visible_caption: String,
    caption_elapsed: Option<f32>,
    alpha: f32,
    scale: f32,
    progress: f32,
    progress_visible: bool,
    video: Option<VideoStep>,
    video_visible: bool,
    video_alpha: f32,
    video_playing: bool,
    video_paused: bool,
    video_looping: bool,
    clip_finished: bool,
    stop_requested: bool,
    hide_from: f32,
    on_complete: Option<OnComplete>,
}

impl CelebrationSequencer {
    pub fn new(config: CelebrationConfig, timing: PresentationTiming) -> Self {
        Self {
            scale: timing.panel_scale_from,
            config,
            timing,
            stage: CelebrationStage::Hidden,
            stage_elapsed: 0.0,
            title: String::new(),
            visible_title: String::new(),
            visible_caption: String::new(),
            caption_elapsed: None,
            alpha: 0.0,
            progress: 0.0,
            progress_visible: false,
            video: None,
            video_visible: false,
            video_alpha: 0.0,
            video_playing: false,
            video_paused: false,
            video_looping: false,
            clip_finished: false,
            stop_requested: false,
            hide_from: 0.0,
            on_complete: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start the show. Ignored (returns false) while a show is running.
    pub fn show<F>(&mut self, title: impl Into<String>, on_complete: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.stage.is_showing() {
            log::debug!("Celebration already showing; show ignored");
            return false;
        }

        self.title = title.into();
        self.visible_title.clear();
        self.visible_caption.clear();
        self.caption_elapsed = None;
        self.alpha = 0.0;
        self.scale = self.timing.panel_scale_from;
        self.progress = 0.0;
        self.progress_visible = false;
        self.reset_video();
        self.on_complete = Some(Box::new(on_complete));
        self.enter(CelebrationStage::Intro);

        log::info!("Celebration started: {:?}", self.title);
        true
    }

    /// Show with the configured title and no callback
    pub fn show_default(&mut self) -> bool {
        let title = self.config.title.clone();
        self.show(title, || {})
    }

    /// Abandon any running show and fade out from the current alpha
    pub fn hide(&mut self) {
        if self.stage == CelebrationStage::Hidden {
            return;
        }
        if self.on_complete.take().is_some() {
            log::debug!("Celebration hidden before completion");
        }
        self.hide_from = self.alpha;
        self.reset_video();
        self.enter(CelebrationStage::Hiding);
    }

    /// The host reports that the playing clip reached its end
    pub fn notify_clip_finished(&mut self) -> bool {
        if self.stage != CelebrationStage::Video || self.video_looping {
            return false;
        }
        match self.video {
            Some(VideoStep::Playing(_)) => {
                self.clip_finished = true;
                true
            }
            _ => false,
        }
    }

    pub fn pause_video(&mut self) {
        if self.video_playing && !self.video_paused {
            self.video_paused = true;
        }
    }

    pub fn resume_video(&mut self) {
        if self.video_playing && self.video_paused {
            self.video_paused = false;
        }
    }

    /// Stop playback; a running show skips its remaining clips
    pub fn stop_video(&mut self) {
        if !self.video_playing {
            return;
        }
        self.video_playing = false;
        self.video_paused = false;
        self.video_looping = false;
        if self.stage == CelebrationStage::Video {
            self.stop_requested = true;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME CLOCK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<CelebrationSignal> {
        let mut signals = Vec::new();
        let mut remaining = dt.max(0.0);

        loop {
            match self.stage {
                CelebrationStage::Hidden | CelebrationStage::Shown => {
                    if let Some(c) = self.caption_elapsed.as_mut() {
                        *c += remaining;
                    }
                    break;
                }
                CelebrationStage::Intro => {
                    let done = self.step(&mut remaining, self.timing.panel_intro_duration());
                    let e = self.stage_elapsed;
                    self.alpha = progress(e, self.timing.panel_fade_secs);
                    let t = Easing::OutBack.apply(progress(e, self.timing.panel_scale_secs));
                    self.scale = lerp(self.timing.panel_scale_from, self.timing.panel_scale_to, t);
                    if !done {
                        break;
                    }
                    self.alpha = 1.0;
                    self.scale = self.timing.panel_scale_to;
                    self.enter(CelebrationStage::Title);
                }
                CelebrationStage::Title => {
                    let chars = self.title.chars().count();
                    let done = self.step(&mut remaining, self.timing.typewriter_duration(chars));
                    self.visible_title =
                        typed(&self.title, self.stage_elapsed, self.timing.typewriter_char_secs);
                    if !done {
                        break;
                    }
                    self.visible_title = self.title.clone();
                    self.enter(CelebrationStage::ProgressDelay);
                }
                CelebrationStage::ProgressDelay => {
                    if !self.step(&mut remaining, self.timing.progress_delay_secs) {
                        break;
                    }
                    self.progress_visible = true;
                    self.caption_elapsed = Some(0.0);
                    self.enter(CelebrationStage::Progress);
                }
                CelebrationStage::Progress => {
                    let done = self.step(&mut remaining, self.timing.progress_fill_secs);
                    let t = progress(self.stage_elapsed, self.timing.progress_fill_secs);
                    self.progress = self.timing.progress_curve.apply(t);
                    if !done {
                        break;
                    }
                    self.progress = 1.0;
                    signals.push(CelebrationSignal::ProgressComplete);

                    if self.config.clips.is_empty() {
                        self.finish(&mut signals);
                    } else {
                        self.progress_visible = false;
                        self.video_visible = true;
                        self.video_alpha = 0.0;
                        self.enter(CelebrationStage::Video);
                        self.start_clip(0, &mut signals);
                    }
                }
                CelebrationStage::Video => {
                    if !self.step_video(&mut remaining, &mut signals) {
                        break;
                    }
                }
                CelebrationStage::Hiding => {
                    let done = self.step(&mut remaining, self.timing.panel_fade_secs);
                    let t = progress(self.stage_elapsed, self.timing.panel_fade_secs);
                    self.alpha = lerp(self.hide_from, 0.0, t);
                    if !done {
                        break;
                    }
                    self.alpha = 0.0;
                    self.progress_visible = false;
                    self.video_visible = false;
                    self.enter(CelebrationStage::Hidden);
                    signals.push(CelebrationSignal::Hidden);
                    log::debug!("Celebration hidden");
                }
            }
        }

        self.update_caption();
        signals
    }

    /// One video step; returns true when the stage moved on and the loop should continue
    fn step_video(&mut self, remaining: &mut f32, signals: &mut Vec<CelebrationSignal>) -> bool {
        if self.stop_requested {
            self.stop_requested = false;
            self.video = None;
            log::debug!("Video stopped; skipping remaining clips");
            self.finish(signals);
            return true;
        }

        match self.video {
            Some(VideoStep::Playing(index)) => {
                if self.video_paused {
                    *remaining = 0.0;
                    return false;
                }

                let is_last = index + 1 == self.config.clips.len();
                let loops = is_last && self.config.loop_last_clip;
                let fade = if index == 0 {
                    self.timing.video_fade_in_secs
                } else {
                    0.0
                };

                let duration = if loops {
                    // Show completes once the looping clip is faded in
                    fade
                } else if self.clip_finished {
                    self.stage_elapsed
                } else {
                    self.config.clips[index]
                        .duration_secs
                        .map_or(f32::INFINITY, |d| d.max(0.0))
                };

                let done = self.step(remaining, duration);
                if index == 0 {
                    self.video_alpha = progress(self.stage_elapsed, fade);
                }
                if !done {
                    return false;
                }
                self.video_alpha = 1.0;
                self.clip_finished = false;

                if loops {
                    self.video_looping = true;
                    self.finish(signals);
                } else if is_last {
                    self.video = None;
                    self.video_playing = false;
                    signals.push(CelebrationSignal::VideoComplete);
                    self.finish(signals);
                } else if self.timing.video_transition_secs > 0.0 {
                    self.video = Some(VideoStep::Gap(index + 1));
                    self.stage_elapsed = 0.0;
                } else {
                    self.start_clip(index + 1, signals);
                }
                true
            }
            Some(VideoStep::Gap(next)) => {
                if !self.step(remaining, self.timing.video_transition_secs) {
                    return false;
                }
                self.start_clip(next, signals);
                true
            }
            None => {
                self.finish(signals);
                true
            }
        }
    }

    fn start_clip(&mut self, index: usize, signals: &mut Vec<CelebrationSignal>) {
        self.video = Some(VideoStep::Playing(index));
        self.video_playing = true;
        self.video_paused = false;
        self.clip_finished = false;
        self.stage_elapsed = 0.0;
        if let Some(clip) = self.config.clips.get(index) {
            log::debug!("Playing clip {} ({})", index, clip.id);
            signals.push(CelebrationSignal::ClipStarted {
                index,
                clip: clip.id.clone(),
            });
        }
    }

    fn finish(&mut self, signals: &mut Vec<CelebrationSignal>) {
        self.enter(CelebrationStage::Shown);
        signals.push(CelebrationSignal::Completed);
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
        log::info!("Celebration complete");
    }

    /// Consume time toward `duration`; true once the stage is over
    fn step(&mut self, remaining: &mut f32, duration: f32) -> bool {
        let left = (duration - self.stage_elapsed).max(0.0);
        let consumed = remaining.min(left);
        if let Some(c) = self.caption_elapsed.as_mut() {
            *c += consumed;
        }

        if *remaining < left {
            self.stage_elapsed += *remaining;
            *remaining = 0.0;
            false
        } else {
            *remaining -= left;
            self.stage_elapsed = duration;
            true
        }
    }

    fn enter(&mut self, stage: CelebrationStage) {
        self.stage = stage;
        self.stage_elapsed = 0.0;
    }

    fn reset_video(&mut self) {
        self.video = None;
        self.video_visible = false;
        self.video_alpha = 0.0;
        self.video_playing = false;
        self.video_paused = false;
        self.video_looping = false;
        self.clip_finished = false;
        self.stop_requested = false;
    }

    fn update_caption(&mut self) {
        if let Some(elapsed) = self.caption_elapsed {
            self.visible_caption = typed(
                &self.config.progress_caption,
                elapsed,
                self.timing.typewriter_char_secs,
            );
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn stage(&self) -> CelebrationStage {
        self.stage
    }

    pub fn is_showing(&self) -> bool {
        self.stage.is_showing()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn visible_title(&self) -> &str {
        &self.visible_title
    }

    pub fn visible_caption(&self) -> &str {
        &self.visible_caption
    }

    /// Progress bar value after the fill curve
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn is_video_visible(&self) -> bool {
        self.video_visible
    }

    pub fn video_alpha(&self) -> f32 {
        self.video_alpha
    }

    pub fn is_video_playing(&self) -> bool {
        self.video_playing
    }

    pub fn is_video_paused(&self) -> bool {
        self.video_paused
    }

    pub fn is_video_looping(&self) -> bool {
        self.video_looping
    }

    /// Clip currently playing
    pub fn current_clip(&self) -> Option<&VideoClip> {
        match self.video {
            Some(VideoStep::Playing(i)) => self.config.clips.get(i),
            _ if self.video_looping => self.config.clips.last(),
            _ => None,
        }
    }

    pub fn config(&self) -> &CelebrationConfig {
        &self.config
    }

    /// Replace the clip list; takes effect on the next show
    pub fn set_clips(&mut self, clips: Vec<VideoClip>) {
        self.config.clips = clips;
    }
}

impl std::fmt::Debug for CelebrationSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CelebrationSequencer")
            .field("stage", &self.stage)
            .field("alpha", &self.alpha)
            .field("progress", &self.progress)
            .field("video", &self.video)
            .finish()
    }
}

/// Prefix of `text` revealed after `elapsed` seconds at `char_secs` per character
fn typed(text: &str, elapsed: f32, char_secs: f32) -> String {
    let total = text.chars().count();
    let shown = if char_secs <= 0.0 {
        total
    } else {
        // Small bias so accumulated frame steps land on the boundary
        (((elapsed + 1e-4) / char_secs).floor() as usize).min(total)
    };
    text.chars().take(shown).collect()
}
