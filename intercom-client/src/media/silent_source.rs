use crate::media::{LocalAudio, MediaAcquisitionError, MediaSource};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Opus silence frame.
const SILENCE: &[u8] = &[0xf8, 0xff, 0xfe];

/// Audio source that produces timed silence. Stands in for device capture
/// in headless environments and in tests; the negotiated media path is the
/// real one, only the payload is empty.
pub struct SilentAudioSource {
    frame: Duration,
}

impl SilentAudioSource {
    pub fn new() -> Self {
        Self {
            frame: Duration::from_millis(20),
        }
    }
}

impl Default for SilentAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSource for SilentAudioSource {
    async fn acquire(&self) -> Result<LocalAudio, MediaAcquisitionError> {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            "intercom".to_owned(),
        ));

        let frame = self.frame;
        let feeder = tokio::spawn({
            let track = Arc::clone(&track);
            async move {
                let mut ticker = tokio::time::interval(frame);
                loop {
                    ticker.tick().await;
                    let sample = Sample {
                        data: Bytes::from_static(SILENCE),
                        duration: frame,
                        ..Default::default()
                    };
                    if track.write_sample(&sample).await.is_err() {
                        break;
                    }
                }
            }
        });

        Ok(LocalAudio::new(track, Some(feeder)))
    }
}
