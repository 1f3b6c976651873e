//! Remote video acquisition.
//!
//! `Fetcher` resolves a URL to a local playable file. Strategies are an
//! ordered list: the split-stream client (plus the stream merger) first,
//! the progressive client as fallback. Each strategy returns a typed
//! outcome; retry and fallback policy is explicit branching here, not
//! nested handlers.

mod client;
mod progressive;
mod retry;
mod split_stream;
mod url;

use std::path::{Path, PathBuf};

use crate::config::FetchSettings;
use crate::errors::{MediaError, MediaResult};
use crate::merge;

pub use client::{classify_download_error, DownloadClient, Fetched};
pub use progressive::ProgressiveClient;
pub use retry::{run_with_retry, Backoff};
pub use split_stream::SplitStreamClient;
pub use url::{is_supported_video_url, video_id};

/// Resolves remote URLs to local playable files.
pub struct Fetcher {
    primary: Box<dyn DownloadClient>,
    fallback: Box<dyn DownloadClient>,
    settings: FetchSettings,
    backoff: Backoff,
}

impl Fetcher {
    /// Create a fetcher with the standard client pair.
    pub fn new(settings: FetchSettings) -> Self {
        let backoff = Backoff::from_secs(settings.backoff_base_secs);
        Self {
            primary: Box::new(SplitStreamClient::new()),
            fallback: Box::new(ProgressiveClient::new()),
            settings,
            backoff,
        }
    }

    /// Create a fetcher with explicit clients and backoff (test seam).
    pub fn with_clients(
        settings: FetchSettings,
        primary: Box<dyn DownloadClient>,
        fallback: Box<dyn DownloadClient>,
        backoff: Backoff,
    ) -> Self {
        Self {
            primary,
            fallback,
            settings,
            backoff,
        }
    }

    /// Fetch the URL into `dest_dir` and return the local file path.
    ///
    /// Fails with `InvalidSource` before any filesystem side effect when
    /// the URL does not match the recognized video-host shape.
    pub fn fetch(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        if !is_supported_video_url(url) {
            return Err(MediaError::invalid_source(format!(
                "not a recognized video URL: {}",
                url
            )));
        }

        match self.primary_cycle(url, dest_dir) {
            Ok(path) => Ok(path),
            // Exhausted transient retries or a rejected input: surface as is.
            Err(e @ MediaError::TransientIo { .. }) => Err(e),
            Err(e @ MediaError::InvalidSource { .. }) => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Primary strategy '{}' failed ({}); falling back to '{}'",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.fallback_cycle(url, dest_dir)
            }
        }
    }

    /// Primary strategy: split-stream download plus merge.
    ///
    /// Transient lock errors retry inside the download call, up to
    /// `primary_attempts`. Tool failures from either the download or the
    /// merge retry the whole download+merge sequence, up to
    /// `merge_attempts` total.
    fn primary_cycle(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        run_with_retry(
            self.settings.merge_attempts,
            self.backoff,
            |e| matches!(e, MediaError::ToolFailure { .. } | MediaError::Io { .. }),
            |attempt| {
                tracing::debug!(
                    "Primary fetch attempt {}/{}",
                    attempt + 1,
                    self.settings.merge_attempts
                );

                let fetched = run_with_retry(
                    self.settings.primary_attempts,
                    self.backoff,
                    MediaError::is_transient,
                    |_| self.primary.download(url, dest_dir),
                )?;

                match fetched {
                    Fetched::Combined(path) => Ok(path),
                    Fetched::Split { video, audio } => {
                        merge::merge_streams(&video, &audio, dest_dir)
                    }
                }
            },
        )
    }

    /// Fallback strategy: progressive single-file download.
    fn fallback_cycle(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        let fetched = run_with_retry(
            self.settings.fallback_attempts,
            self.backoff,
            MediaError::is_transient,
            |_| self.fallback.download(url, dest_dir),
        )?;

        match fetched {
            Fetched::Combined(path) => Ok(path),
            Fetched::Split { video, audio } => merge::merge_streams(&video, &audio, dest_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    type Behavior = Box<dyn Fn(u32) -> MediaResult<Fetched> + Send + Sync>;

    struct MockClient {
        calls: Arc<AtomicU32>,
        behavior: Behavior,
    }

    impl MockClient {
        fn new(behavior: Behavior) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    behavior,
                },
                calls,
            )
        }
    }

    impl DownloadClient for MockClient {
        fn name(&self) -> &str {
            "mock"
        }

        fn download(&self, _url: &str, _dest_dir: &Path) -> MediaResult<Fetched> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.behavior)(n)
        }
    }

    fn test_fetcher(primary: MockClient, fallback: MockClient) -> Fetcher {
        Fetcher::with_clients(
            FetchSettings::default(),
            Box::new(primary),
            Box::new(fallback),
            Backoff::new(Duration::ZERO),
        )
    }

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn malformed_url_fails_without_filesystem_writes() {
        let (primary, primary_calls) =
            MockClient::new(Box::new(|_| Ok(Fetched::Combined(PathBuf::from("x")))));
        let (fallback, fallback_calls) =
            MockClient::new(Box::new(|_| Ok(Fetched::Combined(PathBuf::from("x")))));
        let fetcher = test_fetcher(primary, fallback);

        let dir = tempdir().unwrap();
        for bad in [
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
            "no host at all",
        ] {
            let result = fetcher.fetch(bad, dir.path());
            assert!(matches!(result, Err(MediaError::InvalidSource { .. })));
        }

        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn transient_lock_stops_after_documented_bound() {
        let (primary, primary_calls) = MockClient::new(Box::new(|_| {
            Err(MediaError::transient_io("output file held by another process"))
        }));
        let (fallback, fallback_calls) =
            MockClient::new(Box::new(|_| Ok(Fetched::Combined(PathBuf::from("x")))));
        let fetcher = test_fetcher(primary, fallback);

        let dir = tempdir().unwrap();
        let result = fetcher.fetch(URL, dir.path());

        // Exactly primary_attempts calls, then the error surfaces; no fallback.
        assert_eq!(primary_calls.load(Ordering::SeqCst), 10);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result, Err(MediaError::TransientIo { .. })));
    }

    #[test]
    fn tool_failure_retries_then_falls_back() {
        let (primary, primary_calls) = MockClient::new(Box::new(|_| {
            Err(MediaError::tool_failure("yt-dlp", 1, "network hiccup"))
        }));
        let out = PathBuf::from("/tmp/fallback_abc.mp4");
        let out_clone = out.clone();
        let (fallback, fallback_calls) =
            MockClient::new(Box::new(move |_| Ok(Fetched::Combined(out_clone.clone()))));
        let fetcher = test_fetcher(primary, fallback);

        let dir = tempdir().unwrap();
        let result = fetcher.fetch(URL, dir.path()).unwrap();

        assert_eq!(result, out);
        // merge_attempts bounds the download+merge sequence.
        assert_eq!(primary_calls.load(Ordering::SeqCst), 3);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unavailable_from_fallback_is_permanent() {
        let (primary, _) = MockClient::new(Box::new(|_| {
            Err(MediaError::tool_failure("yt-dlp", 1, "failed"))
        }));
        let (fallback, fallback_calls) = MockClient::new(Box::new(|_| {
            Err(MediaError::unavailable("Age-restricted video. Cannot download."))
        }));
        let fetcher = test_fetcher(primary, fallback);

        let dir = tempdir().unwrap();
        let result = fetcher.fetch(URL, dir.path());

        // Permanent errors are not retried by the fallback cycle.
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        match result {
            Err(MediaError::UnavailableSource { reason }) => {
                assert!(reason.contains("Age-restricted"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn primary_combined_needs_no_merge() {
        let out = PathBuf::from("/tmp/video.mp4");
        let out_clone = out.clone();
        let (primary, primary_calls) =
            MockClient::new(Box::new(move |_| Ok(Fetched::Combined(out_clone.clone()))));
        let (fallback, fallback_calls) =
            MockClient::new(Box::new(|_| panic!("fallback must not run")));
        let fetcher = test_fetcher(primary, fallback);

        let dir = tempdir().unwrap();
        let result = fetcher.fetch(URL, dir.path()).unwrap();
        assert_eq!(result, out);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn transient_then_success_recovers() {
        let out = PathBuf::from("/tmp/video.mp4");
        let out_clone = out.clone();
        let (primary, primary_calls) = MockClient::new(Box::new(move |n| {
            if n < 4 {
                Err(MediaError::transient_io("locked"))
            } else {
                Ok(Fetched::Combined(out_clone.clone()))
            }
        }));
        let (fallback, _) = MockClient::new(Box::new(|_| panic!("fallback must not run")));
        let fetcher = test_fetcher(primary, fallback);

        let dir = tempdir().unwrap();
        let result = fetcher.fetch(URL, dir.path()).unwrap();
        assert_eq!(result, out);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 5);
    }
}
