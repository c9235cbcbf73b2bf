use std::collections::HashMap;
use std::io::Cursor;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tap::TapFallible;
use tracing::{error, info, warn};

use super::{AudioBlob, MediaBackend, MediaError, ResourceHandle};

/// Media element backed by the default system output device.
///
/// The output stream is not `Send`, so it lives on its own thread for as long as this
/// backend exists. Dropping the backend stops that thread.
pub struct RodioMedia {
    handle: OutputStreamHandle,
    sink: Sink,
    resources: HashMap<u64, AudioBlob>,
    next_id: u64,
    duration: Option<Duration>,
    volume: f32,
    has_source: bool,
    _shutdown_tx: flume::Sender<()>,
}

impl RodioMedia {
    pub fn try_new() -> Result<Self, MediaError> {
        let (handle_tx, handle_rx) = flume::bounded(1);
        let (shutdown_tx, shutdown_rx) = flume::bounded::<()>(1);

        thread::spawn(move || match OutputStream::try_default() {
            Ok((_stream, handle)) => {
                if handle_tx.send(Ok(handle)).is_ok() {
                    // Blocks until the backend is dropped and the sender disconnects
                    let _ = shutdown_rx.recv();
                }
                info!("Output thread terminated");
            }
            Err(e) => {
                let _ = handle_tx.send(Err(MediaError::Output(e.to_string())));
            }
        });

        let handle = handle_rx
            .recv()
            .map_err(|e| MediaError::Output(format!("Output thread exited: {e}")))??;
        let sink = Self::new_sink(&handle)?;

        Ok(Self {
            handle,
            sink,
            resources: HashMap::new(),
            next_id: 0,
            duration: None,
            volume: 1.0,
            has_source: false,
            _shutdown_tx: shutdown_tx,
        })
    }

    fn new_sink(handle: &OutputStreamHandle) -> Result<Sink, MediaError> {
        let sink = Sink::try_new(handle).map_err(|e| MediaError::Output(e.to_string()))?;
        sink.pause();
        Ok(sink)
    }

    fn decoder(blob: &AudioBlob) -> Result<Decoder<Cursor<Vec<u8>>>, MediaError> {
        Decoder::new(Cursor::new(blob.bytes.clone())).map_err(|e| MediaError::Decode(e.to_string()))
    }
}

impl MediaBackend for RodioMedia {
    fn create_resource(&mut self, blob: AudioBlob) -> Result<ResourceHandle, MediaError> {
        // Probe up front so undecodable audio fails the load instead of playing silence
        Self::decoder(&blob)?;
        self.next_id += 1;
        self.resources.insert(self.next_id, blob);
        Ok(ResourceHandle::new(self.next_id))
    }

    fn release_resource(&mut self, handle: ResourceHandle) {
        self.resources.remove(&handle.id());
    }

    fn set_source(&mut self, handle: Option<&ResourceHandle>) {
        self.sink.stop();
        self.has_source = false;
        self.duration = None;
        self.sink = match Self::new_sink(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                error!("Error creating audio sink {e:?}");
                return;
            }
        };
        self.sink.set_volume(self.volume);

        let Some(blob) = handle.and_then(|h| self.resources.get(&h.id())) else {
            return;
        };
        if let Ok(decoder) = Self::decoder(blob).tap_err(|e| warn!("Error decoding source: {e}")) {
            self.duration = decoder.total_duration();
            self.sink.append(decoder);
            self.has_source = true;
        }
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if !self.has_source {
            return Err(MediaError::PlayRejected("no source loaded".to_owned()));
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        self.sink
            .try_seek(position)
            .map_err(|e| MediaError::Seek(e.to_string()))
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.sink.set_volume(volume);
    }
}
