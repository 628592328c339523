//! Background auto-swatch scans.
//!
//! Each request spawns a scan thread over an immutable snapshot and gets a
//! channel of its own. Starting a new request cancels the previous scan and
//! drops its channel, so only the latest request ever produces a palette.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::canvas::PixelBuffer;
use crate::error::{EditError, Result};
use crate::types::Colour;

use super::scan::{self, ScanLimits};

type ScanResult = Result<Vec<Colour>>;

pub struct AutoSwatchWorker {
    limits: ScanLimits,
    generation: u64,
    cancel: Arc<AtomicBool>,
    /// Result channel of the latest request while its result is outstanding.
    pending: Option<Receiver<ScanResult>>,
    handles: Vec<JoinHandle<()>>,
}

impl AutoSwatchWorker {
    pub fn new(limits: ScanLimits) -> Self {
        Self {
            limits,
            generation: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            pending: None,
            handles: Vec::new(),
        }
    }

    /// Start scanning `image`, cancelling any scan in progress.
    pub fn request(&mut self, image: Option<Arc<PixelBuffer>>) -> Result<()> {
        let limits = self.limits;
        self.spawn(move |generation, cancel, sender| {
            match scan::unique_colours(image.as_deref(), &limits, &cancel) {
                Ok(Some(colours)) => {
                    let _ = sender.send(Ok(colours));
                }
                Ok(None) => tracing::debug!(generation, "auto-swatch scan cancelled"),
                Err(err) => {
                    let _ = sender.send(Err(err));
                }
            }
        })
    }

    /// Supersede the current job with `job`. Nothing becomes pending unless
    /// the thread starts.
    fn spawn<F>(&mut self, job: F) -> Result<()>
    where
        F: FnOnce(u64, Arc<AtomicBool>, Sender<ScanResult>) + Send + 'static,
    {
        self.cancel.store(true, Ordering::Relaxed);
        self.pending = None;
        self.handles.retain(|h| !h.is_finished());

        let generation = self.generation + 1;
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();

        tracing::info!(generation, "starting auto-swatch scan");
        let thread_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name(format!("pxedit-swatch-{}", generation))
            .spawn(move || job(generation, thread_cancel, sender))
            .map_err(|e| worker_failure(e.to_string()))?;

        self.generation = generation;
        self.cancel = cancel;
        self.pending = Some(receiver);
        self.handles.push(handle);
        Ok(())
    }

    /// True while the latest request has not delivered its result.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The latest request's result, if it has arrived.
    pub fn try_result(&mut self) -> Option<ScanResult> {
        let outcome = self.pending.as_ref()?.try_recv();
        match outcome {
            Ok(result) => Some(self.finish(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.finish(Err(stopped()))),
        }
    }

    /// Block until the latest request finishes. `None` if nothing is pending.
    /// A scan thread that dies without answering is reported as an error.
    pub fn wait(&mut self) -> Option<ScanResult> {
        let outcome = self.pending.as_ref()?.recv();
        Some(self.finish(outcome.unwrap_or_else(|_| Err(stopped()))))
    }

    fn finish(&mut self, result: ScanResult) -> ScanResult {
        self.pending = None;
        match &result {
            Ok(colours) => tracing::info!(
                generation = self.generation,
                colours = colours.len(),
                "auto-swatch scan finished"
            ),
            Err(err) => tracing::warn!(generation = self.generation, %err, "auto-swatch scan failed"),
        }
        result
    }
}

fn worker_failure(message: String) -> EditError {
    EditError::Io {
        path: "<swatch worker>".into(),
        message,
    }
}

fn stopped() -> EditError {
    worker_failure("scan thread stopped without a result".to_string())
}

impl Default for AutoSwatchWorker {
    fn default() -> Self {
        Self::new(ScanLimits::default())
    }
}

impl Drop for AutoSwatchWorker {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_scan_result_arrives() {
        let mut worker = AutoSwatchWorker::default();
        let buf = PixelBuffer::from_colours(
            2,
            2,
            vec![Colour::RED, Colour::RED, Colour::BLUE, Colour::GREEN],
        )
        .unwrap();
        worker.request(Some(Arc::new(buf))).unwrap();
        let colours = worker.wait().unwrap().unwrap();
        assert_eq!(colours, vec![Colour::RED, Colour::BLUE, Colour::GREEN]);
        assert!(!worker.is_pending());
    }

    #[test]
    fn test_null_image_reported() {
        let mut worker = AutoSwatchWorker::default();
        worker.request(None).unwrap();
        assert!(matches!(worker.wait(), Some(Err(EditError::NullImage))));
    }

    #[test]
    fn test_last_request_wins() {
        let mut worker = AutoSwatchWorker::default();
        let big = PixelBuffer::filled(512, 512, Colour::RED).unwrap();
        let small = PixelBuffer::filled(1, 1, Colour::BLUE).unwrap();
        worker.request(Some(Arc::new(big))).unwrap();
        worker.request(Some(Arc::new(small))).unwrap();
        assert_eq!(worker.wait().unwrap().unwrap(), vec![Colour::BLUE]);
    }

    #[test]
    fn test_dead_scan_thread_does_not_hang_wait() {
        let mut worker = AutoSwatchWorker::default();
        worker
            .spawn(|_, _, _sender| panic!("scan thread died"))
            .unwrap();
        assert!(matches!(worker.wait(), Some(Err(EditError::Io { .. }))));
        assert!(!worker.is_pending());
        assert!(worker.wait().is_none());
    }

    #[test]
    fn test_try_result_reports_dead_scan_thread() {
        let mut worker = AutoSwatchWorker::default();
        worker.spawn(|_, _, sender| drop(sender)).unwrap();
        for handle in worker.handles.drain(..) {
            handle.join().unwrap();
        }
        assert!(matches!(worker.try_result(), Some(Err(EditError::Io { .. }))));
    }

    #[test]
    fn test_wait_without_request() {
        let mut worker = AutoSwatchWorker::default();
        assert!(worker.wait().is_none());
        assert!(worker.try_result().is_none());
    }
}
