//! Background short code production and handoff.
//!
//! A single producer task keeps generating candidate batches, checks each
//! candidate against a [`UniquenessOracle`] in increasing length order and
//! hands the first free one to a waiting caller through a capacity-1 channel.
//!
//! # Flow
//!
//! 1. [`CandidateGenerator`] draws one batch of prefixes
//! 2. Each candidate is looked up; failed lookups are retried with backoff
//! 3. The first `NotFound` candidate is sent to the handoff channel
//! 4. [`ShortCodeService::get_code`] receives it on the caller side
//!
//! After `max_cycles` consecutive batches where every candidate was taken, the
//! producer hands a [`ShortCodeError::CodeSpaceExhausted`] to a waiting caller
//! instead and keeps going. Batches that only failed because lookups errored
//! are counted apart and surface as [`ShortCodeError::OracleUnavailable`] after
//! `max_failed_cycles`. Neither error is produced while nobody is waiting; the
//! producer parks until a caller arrives and tries a fresh batch first.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use metrics::counter;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::alphabet::AlphabetConfig;
use crate::domain::entities::ShortCode;
use crate::domain::repositories::{CodeLookup, UniquenessOracle};
use crate::error::ShortCodeError;
use crate::utils::code_generator::CandidateGenerator;

/// Slots in the producer → consumer channel.
const HANDOFF_CAPACITY: usize = 1;

const CANDIDATES_CHECKED: &str = "shortcode_candidates_checked_total";
const CODES_DELIVERED: &str = "shortcode_codes_delivered_total";
const BATCHES_EXHAUSTED: &str = "shortcode_batches_exhausted_total";
const BATCHES_UNVERIFIED: &str = "shortcode_batches_unverified_total";

/// Tuning for the short code producer.
#[derive(Debug, Clone)]
pub struct ShortCodeSettings {
    pub alphabet: AlphabetConfig,
    /// Consecutive all-taken batches before exhaustion is reported. `0` never reports.
    pub max_cycles: u32,
    /// Consecutive batches with failed checks before the oracle is reported
    /// unavailable. `0` never reports.
    pub max_failed_cycles: u32,
    /// Extra lookups of the same candidate after a failed check.
    pub check_retries: usize,
    /// Backoff unit; the n-th retry waits `2^n * retry_base_delay`.
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
}

impl ShortCodeSettings {
    fn retry_strategy(&self) -> std::iter::Take<ExponentialBackoff> {
        let base_ms = u64::try_from(self.retry_base_delay.as_millis()).unwrap_or(u64::MAX);

        ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .max_delay(self.retry_max_delay)
            .take(self.check_retries)
    }
}

impl Default for ShortCodeSettings {
    fn default() -> Self {
        Self {
            alphabet: AlphabetConfig::default(),
            max_cycles: 1000,
            max_failed_cycles: 3,
            check_retries: 3,
            retry_base_delay: Duration::from_millis(10),
            retry_max_delay: Duration::from_secs(1),
        }
    }
}

/// Handle to the running short code pipeline.
///
/// Cloneable access is done through `Arc<ShortCodeService>`; any number of
/// tasks may call [`Self::get_code`] concurrently and each produced code is
/// received by exactly one of them. Dropping the service stops the producer.
pub struct ShortCodeService {
    receiver: Mutex<mpsc::Receiver<Result<ShortCode, ShortCodeError>>>,
    waiters: Arc<Waiters>,
    shutdown: CancellationToken,
    producer: Mutex<Option<JoinHandle<()>>>,
}

impl ShortCodeService {
    /// Spawns the producer task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start<O>(oracle: Arc<O>, settings: ShortCodeSettings) -> Self
    where
        O: UniquenessOracle + ?Sized + 'static,
    {
        let (sender, receiver) = mpsc::channel(HANDOFF_CAPACITY);
        let shutdown = CancellationToken::new();
        let waiters = Arc::new(Waiters::default());

        let producer = Producer {
            oracle,
            generator: CandidateGenerator::new(Arc::new(settings.alphabet.clone())),
            settings,
            sender,
            waiters: waiters.clone(),
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(producer.run());

        Self {
            receiver: Mutex::new(receiver),
            waiters,
            shutdown,
            producer: Mutex::new(Some(handle)),
        }
    }

    /// Waits for the next validated short code.
    ///
    /// # Errors
    ///
    /// Returns [`ShortCodeError::CodeSpaceExhausted`] when a run of batches found
    /// every candidate taken, [`ShortCodeError::OracleUnavailable`] when a run of
    /// batches could not be checked, and [`ShortCodeError::Closed`] once the
    /// producer stopped.
    ///
    /// Errors are only queued while a caller is waiting. If that caller gives up
    /// before receiving, the error stays queued and goes to the next caller even
    /// if codes were freed in the meantime.
    pub async fn get_code(&self) -> Result<ShortCode, ShortCodeError> {
        if self.shutdown.is_cancelled() {
            return Err(ShortCodeError::Closed);
        }

        let _waiting = self.waiters.enter();
        let mut receiver = self.receiver.lock().await;

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ShortCodeError::Closed),
            received = receiver.recv() => received.unwrap_or(Err(ShortCodeError::Closed)),
        }
    }

    /// Returns false once shutdown has been requested.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Stops the producer and waits for its task to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let handle = self.producer.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Short code producer task ended abnormally");
        }
    }
}

impl Drop for ShortCodeService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Callers currently blocked in `get_code`.
#[derive(Default)]
struct Waiters {
    count: AtomicUsize,
    arrived: Notify,
}

impl Waiters {
    fn enter(&self) -> WaiterGuard<'_> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.arrived.notify_one();
        WaiterGuard(self)
    }

    fn any(&self) -> bool {
        self.count.load(Ordering::SeqCst) > 0
    }
}

struct WaiterGuard<'a>(&'a Waiters);

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.0.count.fetch_sub(1, Ordering::SeqCst);
    }
}

enum BatchOutcome {
    Available(ShortCode),
    /// Every candidate was confirmed taken.
    Collided,
    /// At least one candidate could not be checked; carries the last cause.
    Unverified(String),
    Cancelled,
}

/// Counts consecutive fruitless batches of one kind.
struct CycleCounter {
    count: u32,
    limit: u32,
}

impl CycleCounter {
    fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Records a batch and returns true once the limit is reached.
    fn record(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.limit != 0 && self.count >= self.limit
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

struct Producer<O: ?Sized> {
    oracle: Arc<O>,
    generator: CandidateGenerator,
    settings: ShortCodeSettings,
    sender: mpsc::Sender<Result<ShortCode, ShortCodeError>>,
    waiters: Arc<Waiters>,
    shutdown: CancellationToken,
}

impl<O> Producer<O>
where
    O: UniquenessOracle + ?Sized,
{
    async fn run(self) {
        info!(
            min_length = self.settings.alphabet.min_length(),
            max_length = self.settings.alphabet.max_length(),
            max_cycles = self.settings.max_cycles,
            max_failed_cycles = self.settings.max_failed_cycles,
            "Short code producer started"
        );

        let mut collided = CycleCounter::new(self.settings.max_cycles);
        let mut unverified = CycleCounter::new(self.settings.max_failed_cycles);

        loop {
            let candidates = self.generator.generate();

            let delivery = match self.first_available(candidates).await {
                BatchOutcome::Cancelled => break,
                BatchOutcome::Available(code) => {
                    collided.reset();
                    unverified.reset();
                    Ok(code)
                }
                BatchOutcome::Collided => {
                    counter!(BATCHES_EXHAUSTED).increment(1);
                    unverified.reset();

                    if !collided.record() {
                        tokio::task::yield_now().await;
                        continue;
                    }
                    if !self.waiters.any() {
                        if !self.wait_for_consumer().await {
                            break;
                        }
                        continue;
                    }

                    warn!(
                        cycles = collided.count,
                        "No free short code found, reporting exhaustion"
                    );
                    collided.reset();
                    Err(ShortCodeError::CodeSpaceExhausted {
                        cycles: self.settings.max_cycles,
                    })
                }
                BatchOutcome::Unverified(cause) => {
                    counter!(BATCHES_UNVERIFIED).increment(1);

                    if !unverified.record() {
                        tokio::task::yield_now().await;
                        continue;
                    }
                    if !self.waiters.any() {
                        if !self.wait_for_consumer().await {
                            break;
                        }
                        continue;
                    }

                    warn!(
                        cycles = unverified.count,
                        cause = %cause,
                        "Uniqueness checks keep failing, reporting oracle unavailable"
                    );
                    unverified.reset();
                    Err(ShortCodeError::OracleUnavailable {
                        cycles: self.settings.max_failed_cycles,
                        cause,
                    })
                }
            };

            if !self.deliver(delivery).await {
                break;
            }
        }

        info!("Short code producer stopped");
    }

    async fn first_available(&self, candidates: Vec<String>) -> BatchOutcome {
        let mut failure = None;

        for candidate in candidates {
            let Some(lookup) = self.check(&candidate).await else {
                return BatchOutcome::Cancelled;
            };
            counter!(CANDIDATES_CHECKED, "outcome" => lookup.as_label()).increment(1);

            match lookup {
                CodeLookup::NotFound => {
                    debug!(code = %candidate, "Candidate is free");
                    return BatchOutcome::Available(ShortCode::new_unchecked(candidate));
                }
                CodeLookup::Found => {
                    debug!(code = %candidate, "Candidate already taken");
                }
                CodeLookup::CheckFailed(e) => {
                    warn!(
                        code = %candidate,
                        error = %e,
                        "Uniqueness check failed after retries, skipping candidate"
                    );
                    failure = Some(e.to_string());
                }
            }
        }

        match failure {
            Some(cause) => BatchOutcome::Unverified(cause),
            None => BatchOutcome::Collided,
        }
    }

    /// Parks until a caller is waiting. Returns false on shutdown.
    async fn wait_for_consumer(&self) -> bool {
        debug!("No caller waiting, holding back error report");

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            _ = self.waiters.arrived.notified() => true,
        }
    }

    /// Looks a candidate up, retrying failed checks. `None` means shutdown.
    async fn check(&self, candidate: &str) -> Option<CodeLookup> {
        let oracle = &self.oracle;

        let attempt = Retry::start(self.settings.retry_strategy(), move || async move {
            match oracle.lookup(candidate).await {
                CodeLookup::CheckFailed(e) => {
                    debug!(code = %candidate, error = %e, "Uniqueness check failed");
                    Err(e)
                }
                settled => Ok(settled),
            }
        });

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            result = attempt => Some(result.unwrap_or_else(CodeLookup::CheckFailed)),
        }
    }

    /// Hands one item to a consumer. Returns false if the pipeline should stop.
    async fn deliver(&self, item: Result<ShortCode, ShortCodeError>) -> bool {
        let is_code = item.is_ok();

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            sent = self.sender.send(item) => match sent {
                Ok(()) => {
                    if is_code {
                        counter!(CODES_DELIVERED).increment(1);
                    }
                    true
                }
                Err(_) => {
                    debug!("Short code receiver dropped");
                    false
                }
            },
        }
    }
}
