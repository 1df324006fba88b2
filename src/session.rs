// src/session.rs

//! Local media session shown while a support call is open.
//!
//! The camera and microphone are acquired only for a mirrored self-preview.
//! Nothing is sent to the other party; both sides meet through the external
//! meeting link instead.
//!
//! `MediaDevices` and `PreviewSurface` are the ports a client binding
//! implements for its platform camera API and video element.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::DEFAULT_MEET_LINK,
    models::call::{ActiveCall, CallStatus},
};

/// Host allowed to use media devices without a secure context.
pub const LOCAL_DEV_HOST: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
}

/// What the session asks the platform for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: VideoConstraints,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: VideoConstraints {
                ideal_width: 1280,
                ideal_height: 720,
                facing_mode: FacingMode::User,
            },
        }
    }
}

/// Where the session is running.
#[derive(Debug, Clone)]
pub struct BrowsingContext {
    pub secure: bool,
    pub hostname: String,
}

impl BrowsingContext {
    pub fn permits_media(&self) -> bool {
        self.secure || self.hostname == LOCAL_DEV_HOST
    }
}

/// Error as reported by the platform media API, e.g. `NotAllowedError`.
#[derive(Debug, Clone)]
pub struct DeviceError {
    pub name: String,
    pub message: String,
}

impl DeviceError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Why the local preview is unavailable. Never fatal: the meeting link still works.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error(
        "Media access requires a secure connection (HTTPS). Your browser has blocked the request for safety."
    )]
    InsecureContext,

    #[error(
        "Permission Denied: Browser blocked camera/mic access. Please allow permissions in your address bar."
    )]
    PermissionDenied,

    #[error("Hardware Not Found: No camera or microphone was detected on this device.")]
    DeviceNotFound,

    #[error("Local preview is restricted. Please use the meeting link to connect.")]
    Other(String),
}

impl From<DeviceError> for MediaError {
    fn from(err: DeviceError) -> Self {
        match err.name.as_str() {
            "NotAllowedError" | "PermissionDeniedError" => MediaError::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" => MediaError::DeviceNotFound,
            _ => MediaError::Other(format!("{}: {}", err.name, err.message)),
        }
    }
}

/// What the user can do once the preview failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FallbackAction {
    RetryAcquisition,
    OpenMeetLink { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

pub trait MediaTrack: Send {
    fn kind(&self) -> TrackKind;
    fn set_enabled(&mut self, enabled: bool);
    fn stop(&mut self);
}

/// An acquired set of tracks. Stopping is idempotent.
#[derive(Default)]
pub struct MediaStream {
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Box<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn set_enabled(&mut self, kind: TrackKind, enabled: bool) {
        for track in self.tracks.iter_mut().filter(|t| t.kind() == kind) {
            track.set_enabled(enabled);
        }
    }

    pub fn stop_all(&mut self) {
        for mut track in self.tracks.drain(..) {
            track.stop();
        }
    }
}

/// Platform camera/microphone access.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Whether the platform exposes media devices at all.
    fn available(&self) -> bool {
        true
    }

    async fn get_user_media(&self, constraints: &MediaConstraints)
    -> Result<MediaStream, DeviceError>;
}

/// Where the preview is drawn.
pub trait PreviewSurface: Send {
    /// Binds the stream and starts playback.
    fn attach(&mut self, stream: &MediaStream, mirrored: bool) -> Result<(), DeviceError>;
    fn detach(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Initializing,
    Live,
    Failed(MediaError),
}

/// A mounted session view. Every acquired track is stopped when the session
/// is closed, dropped, or retried.
pub struct LocalSession<D: MediaDevices, S: PreviewSurface> {
    devices: D,
    surface: S,
    context: BrowsingContext,
    constraints: MediaConstraints,
    meet_link: Option<String>,
    state: PreviewState,
    stream: Option<MediaStream>,
    muted: bool,
    video_off: bool,
}

impl<D: MediaDevices, S: PreviewSurface> LocalSession<D, S> {
    pub fn new(devices: D, surface: S, context: BrowsingContext, meet_link: Option<String>) -> Self {
        Self {
            devices,
            surface,
            context,
            constraints: MediaConstraints::default(),
            meet_link,
            state: PreviewState::Initializing,
            stream: None,
            muted: false,
            video_off: false,
        }
    }

    /// Acquires the camera and microphone and starts the preview.
    /// Also used for "retry"; any earlier stream is released first.
    pub async fn start(&mut self) -> &PreviewState {
        self.release();
        self.state = PreviewState::Initializing;

        if !self.context.permits_media() {
            warn!(host = %self.context.hostname, "Media blocked outside a secure context");
            self.state = PreviewState::Failed(MediaError::InsecureContext);
            return &self.state;
        }

        self.state = match self.acquire().await {
            Ok(stream) => {
                info!(tracks = stream.track_count(), "Local preview started");
                self.stream = Some(stream);
                PreviewState::Live
            }
            Err(err) => {
                warn!(name = %err.name, "Hardware access denied: {}", err.message);
                PreviewState::Failed(err.into())
            }
        };
        &self.state
    }

    async fn acquire(&mut self) -> Result<MediaStream, DeviceError> {
        if !self.devices.available() {
            return Err(DeviceError::new(
                "NotSupportedError",
                "MediaDevices API not available",
            ));
        }

        let mut stream = self.devices.get_user_media(&self.constraints).await?;
        if let Err(err) = self.surface.attach(&stream, true) {
            stream.stop_all();
            return Err(err);
        }
        stream.set_enabled(TrackKind::Audio, !self.muted);
        stream.set_enabled(TrackKind::Video, !self.video_off);
        Ok(stream)
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if let Some(stream) = self.stream.as_mut() {
            stream.set_enabled(TrackKind::Audio, !self.muted);
        }
        self.muted
    }

    pub fn toggle_video(&mut self) -> bool {
        self.video_off = !self.video_off;
        if let Some(stream) = self.stream.as_mut() {
            stream.set_enabled(TrackKind::Video, !self.video_off);
        }
        self.video_off
    }

    /// The link both roles are sent to.
    pub fn join_link(&self) -> &str {
        self.meet_link.as_deref().unwrap_or(DEFAULT_MEET_LINK)
    }

    /// Offered only while the preview is failed.
    pub fn fallbacks(&self) -> Vec<FallbackAction> {
        match self.state {
            PreviewState::Failed(_) => fallback_actions(self.join_link()),
            _ => Vec::new(),
        }
    }

    /// Unmounts the session.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            self.surface.detach();
            stream.stop_all();
            debug!("Local preview released");
        }
    }
}

impl<D: MediaDevices, S: PreviewSurface> Drop for LocalSession<D, S> {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn fallback_actions(meet_link: &str) -> Vec<FallbackAction> {
    vec![
        FallbackAction::RetryAcquisition,
        FallbackAction::OpenMeetLink {
            url: meet_link.to_string(),
        },
    ]
}

/// Everything a client needs to render the session view for a call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub call: ActiveCall,
    /// "Dispatching Admin..." while waiting, "Line Secure" once joined.
    pub status_label: &'static str,
    pub meet_link: String,
    pub constraints: MediaConstraints,
    pub mirrored: bool,
    pub fallbacks: Vec<FallbackAction>,
}

impl SessionDescriptor {
    pub fn new(call: ActiveCall, meet_link: String) -> Self {
        let status_label = match call.status {
            CallStatus::Waiting => "Dispatching Admin...",
            CallStatus::Active => "Line Secure",
        };
        Self {
            call,
            status_label,
            fallbacks: fallback_actions(&meet_link),
            meet_link,
            constraints: MediaConstraints::default(),
            mirrored: true,
        }
    }
}
