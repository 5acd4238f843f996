//! Corpus-wide extraction strategies.
//!
//! Verses are independent, so a corpus can be processed:
//! - Sequentially (baseline)
//! - Batch-parallel (verses split into one chunk per thread)
//! - Channel-pipeline (feeder thread, worker pool on a shared receiver, ordered collector)
//!
//! Every strategy returns results in input order.

use std::collections::BTreeMap;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::value::Value;
use crate::verse::{Verse, VerseId, VerseQuotations};

/// Processing strategy for a corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One verse after another on the calling thread
    Sequential,
    /// Verses split into equal chunks, one thread per chunk
    BatchParallel,
    /// Feeder, worker pool and ordered collector connected by channels
    #[default]
    ChannelPipeline,
}

/// Configuration for parallel processing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Number of threads for batch-parallel processing
    pub num_threads: usize,
    /// Channel buffer size for pipeline processing
    pub channel_buffer: usize,
    /// Number of worker threads for pipeline
    pub num_workers: usize,
    /// Hide the progress bar
    pub quiet: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let cpus = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);
        Self {
            num_threads: cpus,
            channel_buffer: 1024,
            num_workers: cpus.saturating_sub(1).max(1),
            quiet: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub verses_processed: usize,
    pub verses_with_numbers: usize,
    pub quotations: usize,
    pub duration_quotations: usize,
    pub failures: usize,
    pub elapsed: std::time::Duration,
}

impl CorpusStats {
    fn record(&mut self, outcome: &Result<VerseQuotations>) {
        self.verses_processed += 1;
        match outcome {
            Ok(result) => {
                if result.has_numbers() {
                    self.verses_with_numbers += 1;
                }
                self.quotations += result.quotations.len();
                self.duration_quotations += result
                    .quotations
                    .iter()
                    .filter(|q| matches!(q.value, Value::Duration(_)))
                    .count();
            }
            Err(_) => self.failures += 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct CorpusReport {
    /// Successful verses, in input order.
    pub results: Vec<VerseQuotations>,
    /// Verses whose extraction failed, in input order.
    pub failures: Vec<(VerseId, Error)>,
    pub stats: CorpusStats,
}

/// Collects per-verse outcomes in input order and keeps the stats current.
struct Collector {
    report: CorpusReport,
    progress: ProgressBar,
}

impl Collector {
    fn new(total: usize, quiet: bool) -> Self {
        let progress = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{bar:40} {pos}/{len} verses {msg}")
            {
                pb.set_style(style);
            }
            pb
        };
        Collector {
            report: CorpusReport::default(),
            progress,
        }
    }

    fn push(&mut self, id: &VerseId, outcome: Result<VerseQuotations>) {
        self.report.stats.record(&outcome);
        match outcome {
            Ok(result) => self.report.results.push(result),
            Err(e) => {
                warn!(verse = %id, error = %e, "extraction failed");
                self.report.failures.push((id.clone(), e));
            }
        }
        self.progress.inc(1);
        if self.report.stats.verses_processed % 1000 == 0 {
            self.progress
                .set_message(format!("| quotations: {}", self.report.stats.quotations));
        }
    }

    fn finish(mut self, start_time: Instant) -> CorpusReport {
        self.progress.finish_and_clear();
        self.report.stats.elapsed = start_time.elapsed();
        let stats = &self.report.stats;
        info!(
            verses = stats.verses_processed,
            with_numbers = stats.verses_with_numbers,
            quotations = stats.quotations,
            durations = stats.duration_quotations,
            failures = stats.failures,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "corpus processed"
        );
        self.report
    }
}

/// Runs `extractor` over every verse with the chosen strategy.
pub fn process_corpus(
    verses: &[Verse],
    extractor: &Extractor,
    strategy: Strategy,
    config: &ParallelConfig,
) -> CorpusReport {
    match strategy {
        Strategy::Sequential => process_sequential(verses, extractor, config),
        Strategy::BatchParallel => process_batch_parallel(verses, extractor, config),
        Strategy::ChannelPipeline => process_channel_pipeline(verses, extractor, config),
    }
}

pub fn process_sequential(
    verses: &[Verse],
    extractor: &Extractor,
    config: &ParallelConfig,
) -> CorpusReport {
    let start_time = Instant::now();
    let mut collector = Collector::new(verses.len(), config.quiet);
    for verse in verses {
        collector.push(&verse.id, extractor.extract_verse(verse));
    }
    collector.finish(start_time)
}

/// Strategy 1: Batch-Parallel Processing using std::thread
/// Splits the corpus into one chunk per thread and joins the chunks in order
pub fn process_batch_parallel(
    verses: &[Verse],
    extractor: &Extractor,
    config: &ParallelConfig,
) -> CorpusReport {
    let start_time = Instant::now();
    let mut collector = Collector::new(verses.len(), config.quiet);
    if verses.is_empty() {
        return collector.finish(start_time);
    }

    let num_threads = config.num_threads.min(verses.len()).max(1);
    let chunk_size = (verses.len() + num_threads - 1) / num_threads;
    let extractor = Arc::new(extractor.clone());

    let handles: Vec<(Vec<VerseId>, JoinHandle<Vec<Result<VerseQuotations>>>)> = verses
        .chunks(chunk_size)
        .map(|chunk| {
            let ids: Vec<VerseId> = chunk.iter().map(|v| v.id.clone()).collect();
            let chunk = chunk.to_vec();
            let extractor = Arc::clone(&extractor);
            let handle = thread::spawn(move || {
                chunk
                    .iter()
                    .map(|verse| extractor.extract_verse(verse))
                    .collect::<Vec<_>>()
            });
            (ids, handle)
        })
        .collect();

    for (ids, handle) in handles {
        match handle.join() {
            Ok(outcomes) => {
                for (id, outcome) in ids.iter().zip(outcomes) {
                    collector.push(id, outcome);
                }
            }
            Err(_) => warn!(verses = ids.len(), "extraction thread panicked, chunk dropped"),
        }
    }

    collector.finish(start_time)
}

type Indexed<T> = (usize, T);

/// Strategy 2: Channel-Pipeline Processing using std::sync::mpsc
/// A feeder thread sends verses, workers extract, the calling thread reorders by index
pub fn process_channel_pipeline(
    verses: &[Verse],
    extractor: &Extractor,
    config: &ParallelConfig,
) -> CorpusReport {
    let start_time = Instant::now();
    let buffer = config.channel_buffer.max(1);
    let (verse_tx, verse_rx): (SyncSender<Indexed<Verse>>, Receiver<Indexed<Verse>>) =
        sync_channel(buffer);
    type Outcome = Indexed<(VerseId, Result<VerseQuotations>)>;
    let (result_tx, result_rx): (SyncSender<Outcome>, Receiver<Outcome>) = sync_channel(buffer);

    let owned: Vec<Verse> = verses.to_vec();
    let feeder = thread::spawn(move || {
        for (index, verse) in owned.into_iter().enumerate() {
            if verse_tx.send((index, verse)).is_err() {
                break;
            }
        }
    });

    let extractor = Arc::new(extractor.clone());
    let verse_rx = Arc::new(Mutex::new(verse_rx));
    let workers: Vec<JoinHandle<()>> = (0..config.num_workers.max(1))
        .map(|_| {
            let rx = Arc::clone(&verse_rx);
            let tx = result_tx.clone();
            let extractor = Arc::clone(&extractor);
            thread::spawn(move || extraction_worker(rx, tx, &extractor))
        })
        .collect();

    // Drop extra sender so the result channel closes when workers finish
    drop(result_tx);

    let report = collect_in_order(result_rx, verses.len(), config.quiet, start_time);

    if feeder.join().is_err() {
        warn!("verse feeder thread panicked");
    }
    for handle in workers {
        if handle.join().is_err() {
            warn!("extraction worker panicked");
        }
    }
    report
}

fn extraction_worker(
    rx: Arc<Mutex<Receiver<Indexed<Verse>>>>,
    tx: SyncSender<Indexed<(VerseId, Result<VerseQuotations>)>>,
    extractor: &Extractor,
) {
    loop {
        let item = {
            let lock = rx.lock().ok();
            lock.and_then(|guard| guard.recv().ok())
        };
        let Some((index, verse)) = item else {
            break;
        };
        let outcome = extractor.extract_verse(&verse);
        if tx.send((index, (verse.id, outcome))).is_err() {
            break;
        }
    }
}

/// Reorder buffer: results that arrive early wait in a BTreeMap until their predecessors
/// have been collected.
fn collect_in_order(
    rx: Receiver<Indexed<(VerseId, Result<VerseQuotations>)>>,
    total: usize,
    quiet: bool,
    start_time: Instant,
) -> CorpusReport {
    let mut collector = Collector::new(total, quiet);
    let mut pending: BTreeMap<usize, (VerseId, Result<VerseQuotations>)> = BTreeMap::new();
    let mut next_expected: usize = 0;

    for (index, item) in rx {
        if index != next_expected {
            pending.insert(index, item);
            continue;
        }
        let (id, outcome) = item;
        collector.push(&id, outcome);
        next_expected += 1;
        while let Some((id, outcome)) = pending.remove(&next_expected) {
            collector.push(&id, outcome);
            next_expected += 1;
        }
    }

    // Anything still buffered lost a predecessor to a panicked worker
    for (_, (id, outcome)) in pending {
        collector.push(&id, outcome);
    }

    collector.finish(start_time)
}
