//! Media transport: the handle that plays one file.
//!
//! Positions are normalized to `0.0..=1.0` of the track length. A transport
//! reports where its media lives as a `file://` location, which the session
//! turns back into a path when it needs the file itself.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Playback control for one opened file.
pub trait Transport {
    fn play(&mut self) -> Result<()>;

    fn stop(&mut self);

    /// False once the media has finished or was stopped.
    fn is_playing(&self) -> bool;

    /// Normalized position.
    fn position(&self) -> f64;

    /// Seek to a normalized position.
    fn set_position(&mut self, position: f64) -> Result<()>;

    /// Location of the loaded media.
    fn location(&self) -> &str;
}

/// Opens transports and owns whatever output device they share.
pub trait MediaEngine {
    fn open(&mut self, path: &Path) -> Result<Box<dyn Transport>>;

    /// Free the output device. Opening again reacquires it.
    fn release(&mut self);
}

/// `file://` location for a local path.
pub fn location_for(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| Error::Location(path.display().to_string()))
}

/// Local path named by a `file://` location.
pub fn path_from_location(location: &str) -> Result<PathBuf> {
    Url::parse(location)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| Error::Location(location.to_string()))
}

#[cfg(feature = "player")]
pub use self::rodio_backend::{RodioEngine, RodioTransport};

#[cfg(feature = "player")]
mod rodio_backend {
    use super::{MediaEngine, Transport, location_for};
    use crate::error::{Error, Result};
    use lofty::prelude::*;
    use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;
    use std::time::Duration;

    /// Plays files through the default audio output.
    #[derive(Default)]
    pub struct RodioEngine {
        stream: Option<OutputStream>,
    }

    impl RodioEngine {
        pub fn new() -> Self {
            Self::default()
        }

        fn stream(&mut self) -> Result<&OutputStream> {
            if self.stream.is_none() {
                let mut stream = OutputStreamBuilder::open_default_stream()
                    .map_err(|e| Error::Audio(format!("no audio output device: {e}")))?;
                // rodio reports the drop on stderr, which lands in the middle of the prompt
                stream.log_on_drop(false);
                log::info!("opened default audio output");
                self.stream = Some(stream);
            }
            self.stream
                .as_ref()
                .ok_or_else(|| Error::Audio("audio output unavailable".to_string()))
        }
    }

    /// Length reported by the decoder, or by the container when the decoder
    /// cannot tell (typical for VBR MP3).
    fn media_duration(path: &Path, decoded: Option<Duration>) -> f64 {
        match decoded {
            Some(duration) => duration.as_secs_f64(),
            None => lofty::read_from_path(path)
                .map(|tagged| tagged.properties().duration().as_secs_f64())
                .unwrap_or_else(|e| {
                    log::warn!("no duration for {}: {e}", path.display());
                    0.0
                }),
        }
    }

    impl MediaEngine for RodioEngine {
        fn open(&mut self, path: &Path) -> Result<Box<dyn Transport>> {
            let location = location_for(path)?;
            let file = File::open(path)?;
            let source = Decoder::new(BufReader::new(file))
                .map_err(|e| Error::Audio(format!("cannot decode {}: {e}", path.display())))?;
            let duration = media_duration(path, source.total_duration());

            let sink = Sink::connect_new(self.stream()?.mixer());
            sink.pause();
            sink.append(source);
            log::debug!("opened {location} ({duration:.1}s)");

            Ok(Box::new(RodioTransport {
                sink,
                duration,
                location,
            }))
        }

        fn release(&mut self) {
            if self.stream.take().is_some() {
                log::info!("released audio output");
            }
        }
    }

    pub struct RodioTransport {
        sink: Sink,
        duration: f64,
        location: String,
    }

    impl Transport for RodioTransport {
        fn play(&mut self) -> Result<()> {
            self.sink.play();
            Ok(())
        }

        fn stop(&mut self) {
            self.sink.stop();
        }

        fn is_playing(&self) -> bool {
            !self.sink.empty() && !self.sink.is_paused()
        }

        fn position(&self) -> f64 {
            if self.duration <= 0.0 {
                return 0.0;
            }
            (self.sink.get_pos().as_secs_f64() / self.duration).clamp(0.0, 1.0)
        }

        fn set_position(&mut self, position: f64) -> Result<()> {
            let target = Duration::from_secs_f64(position.clamp(0.0, 1.0) * self.duration);
            self.sink
                .try_seek(target)
                .map_err(|e| Error::Audio(format!("seek failed: {e}")))
        }

        fn location(&self) -> &str {
            &self.location
        }
    }
}
