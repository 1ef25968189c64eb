//! Handler for `tuneload fetch`.
//!
//! Plans which tracks need downloading, hands them to the scheduler and
//! drives one progress bar per track from the scheduler's event stream.
//! Completed tracks are recorded in the repository. Ctrl-C cancels
//! everything still active or queued.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use tuneload_core::{
    DownloadEvent, DownloadId, DownloadSchedulerPort, DownloadedTrack, DownloadedTrackRepository,
    LocalTrackStore, ProgressCallback,
};

use crate::bootstrap::CliContext;
use crate::emitter::ChannelEmitter;
use crate::error::CliError;
use crate::track_spec::TrackSpec;

/// Arguments for `tuneload fetch`.
#[derive(Debug, Clone)]
pub struct FetchArgs {
    /// Tracks to download.
    pub tracks: Vec<TrackSpec>,
    /// Maximum simultaneous downloads.
    pub concurrency: u32,
    /// Download even if a local copy exists.
    pub force: bool,
}

/// How every requested track ended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub skipped: usize,
}

impl FetchSummary {
    /// Print the totals and fail if anything did not complete.
    pub fn ensure_success(self) -> Result<(), CliError> {
        println!(
            "{} completed, {} failed, {} cancelled, {} skipped",
            self.completed, self.failed, self.cancelled, self.skipped
        );
        if self.failed + self.cancelled > 0 {
            return Err(CliError::Download(format!(
                "{} download(s) did not complete",
                self.failed + self.cancelled
            )));
        }
        Ok(())
    }
}

/// Download the requested tracks.
pub async fn execute(ctx: &CliContext, args: FetchArgs) -> Result<FetchSummary, CliError> {
    let plan = plan(ctx.store.as_ref(), args.tracks, args.force).await;
    for spec in &plan.skipped {
        println!(
            "Skipping {} (already at {})",
            spec.id,
            ctx.store.local_path(&spec.name).display()
        );
    }
    for spec in &plan.conflicts {
        eprintln!(
            "Not fetching {}: file name '{}' is already used by another track",
            spec.id, spec.name
        );
    }

    let mut summary = if plan.download.is_empty() {
        FetchSummary::default()
    } else {
        let (emitter, events) = ChannelEmitter::channel();
        let scheduler = ctx.download_scheduler(args.concurrency, Arc::new(emitter))?;
        drive(ctx, scheduler.as_ref(), events, plan.download, interrupted()).await?
    };
    summary.skipped = plan.skipped.len();
    summary.failed += plan.conflicts.len();
    Ok(summary)
}

/// Tracks split into what to download, what is already local and what
/// would write over another track's file.
#[derive(Debug, Default)]
pub(crate) struct FetchPlan {
    pub download: Vec<TrackSpec>,
    pub skipped: Vec<TrackSpec>,
    pub conflicts: Vec<TrackSpec>,
}

/// Drop repeated ids and, unless `force`, tracks with a local copy.
///
/// A file name belongs to the first track that names it; later tracks with
/// the same name end up in `conflicts`.
pub(crate) async fn plan(
    store: &dyn LocalTrackStore,
    tracks: Vec<TrackSpec>,
    force: bool,
) -> FetchPlan {
    let mut seen = HashSet::new();
    let mut names = HashSet::new();
    let mut plan = FetchPlan::default();

    for spec in tracks {
        if !seen.insert(spec.id.clone()) {
            warn!(id = %spec.id, "track given more than once, using the first");
            continue;
        }
        if !names.insert(spec.name.clone()) {
            warn!(id = %spec.id, name = %spec.name, "file name already claimed by another track");
            plan.conflicts.push(spec);
            continue;
        }
        if !force && store.exists(&spec.name).await {
            plan.skipped.push(spec);
        } else {
            plan.download.push(spec);
        }
    }
    plan
}

/// Start every track and consume events until each one is terminal.
///
/// When `shutdown` resolves, all downloads are cancelled and the loop keeps
/// draining until their cancellations arrive.
pub(crate) async fn drive<S, F>(
    ctx: &CliContext,
    scheduler: &S,
    mut events: UnboundedReceiver<DownloadEvent>,
    tracks: Vec<TrackSpec>,
    shutdown: F,
) -> Result<FetchSummary, CliError>
where
    S: DownloadSchedulerPort + ?Sized,
    F: Future<Output = ()>,
{
    let bars = MultiProgress::new();
    let mut in_flight: HashMap<DownloadId, (TrackSpec, ProgressBar)> = HashMap::new();

    for spec in tracks {
        let bar = bars.add(new_bar(&spec));
        let tick = bar.clone();
        let on_progress: ProgressCallback =
            Arc::new(move |percent| tick.set_position(u64::from(percent)));

        let request = spec.to_request();
        in_flight.insert(spec.id.clone(), (spec, bar));
        scheduler.start_download(request, Some(on_progress));
    }

    tokio::pin!(shutdown);
    let mut interrupted = false;
    let mut summary = FetchSummary::default();

    while !in_flight.is_empty() {
        tokio::select! {
            () = &mut shutdown, if !interrupted => {
                interrupted = true;
                warn!("interrupted, cancelling {} download(s)", in_flight.len());
                scheduler.cancel_all_downloads();
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                apply_event(ctx, &mut in_flight, &mut summary, event).await;
            }
        }
    }

    Ok(summary)
}

async fn apply_event(
    ctx: &CliContext,
    in_flight: &mut HashMap<DownloadId, (TrackSpec, ProgressBar)>,
    summary: &mut FetchSummary,
    event: DownloadEvent,
) {
    debug!(?event, "download event");

    if !event.status().is_terminal() {
        if let Some((_, bar)) = in_flight.get(event.id()) {
            match &event {
                DownloadEvent::DownloadQueued { position, .. } => {
                    bar.set_message(format!("queued #{position}"));
                }
                DownloadEvent::DownloadStarted { .. } => bar.set_message("downloading"),
                _ => {}
            }
        }
        return;
    }

    let Some((spec, bar)) = in_flight.remove(event.id()) else {
        return;
    };

    match event {
        DownloadEvent::DownloadCompleted { .. } => {
            match record_completion(ctx.tracks.as_ref(), ctx.store.as_ref(), &spec).await {
                Ok(track) => {
                    info!(id = %track.id, path = %track.local_path.display(), "track downloaded");
                    bar.finish_with_message("done");
                    summary.completed += 1;
                }
                Err(e) => {
                    bar.abandon_with_message(format!("downloaded but not recorded: {e}"));
                    summary.failed += 1;
                }
            }
        }
        DownloadEvent::DownloadFailed { error, .. } => {
            bar.abandon_with_message(format!("failed: {error}"));
            summary.failed += 1;
        }
        _ => {
            bar.abandon_with_message("cancelled");
            summary.cancelled += 1;
        }
    }
}

/// Record a finished download, with its on-disk size when available.
pub(crate) async fn record_completion(
    tracks: &dyn DownloadedTrackRepository,
    store: &dyn LocalTrackStore,
    spec: &TrackSpec,
) -> Result<DownloadedTrack, CliError> {
    let name = Path::new(&spec.name)
        .file_stem()
        .map_or_else(|| spec.name.clone(), |stem| stem.to_string_lossy().into_owned());

    let track = match store.file_info(&spec.name).await {
        Some(info) => {
            DownloadedTrack::new(spec.id.clone(), name, info.path).with_size_bytes(info.size_bytes)
        }
        None => {
            warn!(id = %spec.id, "completed download has no local file");
            DownloadedTrack::new(spec.id.clone(), name, store.local_path(&spec.name))
        }
    };

    tracks.add(&track).await?;
    Ok(track)
}

fn new_bar(spec: &TrackSpec) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{prefix:<20!} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let bar = ProgressBar::new(100).with_style(style);
    bar.set_prefix(spec.id.to_string());
    bar
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
