use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Local audio capture. Acquisition failure is fatal to the call session.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalAudio, MediaAcquisitionError>;
}

#[derive(Debug, Error)]
pub enum MediaAcquisitionError {
    #[error("audio capture denied")]
    Denied,

    #[error("no audio capture device available")]
    Unavailable,

    #[error("audio capture failed: {0}")]
    Backend(String),
}

/// A local audio track plus the task that feeds samples into it. The feeder
/// is aborted when the track is released, so capture never outlives the
/// call session that acquired it.
pub struct LocalAudio {
    track: Arc<TrackLocalStaticSample>,
    feeder: Option<JoinHandle<()>>,
}

impl LocalAudio {
    pub fn new(track: Arc<TrackLocalStaticSample>, feeder: Option<JoinHandle<()>>) -> Self {
        Self { track, feeder }
    }

    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    pub fn stop(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

impl Drop for LocalAudio {
    fn drop(&mut self) {
        self.stop();
    }
}
