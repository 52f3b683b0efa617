//! The collision driver.
//!
//! Each attempt renders both documents at the same index, hashes them,
//! inserts each key into its own side's cache, and then checks both
//! directions for a key that is present on both sides:
//!
//! ```text
//! i = 0
//! loop:
//!     r = render(real, i)      f = render(fake, i)
//!     real_cache[key(r)] = r   fake_cache[key(f)] = f
//!     if key(r) in fake_cache or key(f) in real_cache: stop
//!     i += 1
//! ```
//!
//! By the birthday bound a collision is expected after roughly
//! `16^(num_chars / 2)` insertions in total.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use padcollide_core::{
    AttemptIndex, Coordinates, CoreError, DigestAlgorithm, Document, MatchKey, PaddingScheme,
    RenderedVariant, Side, SuffixDigest,
};
use padcollide_store::{Checkpoint, MemoryCache, SearchFingerprint, VariantCache};

use crate::error::{Result, SearchError};

/// Configuration for a search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Trailing hex characters that must match.
    pub num_chars: usize,
    /// Hash function behind the match key.
    pub algorithm: DigestAlgorithm,
    /// How attempt indices become padding.
    pub scheme: PaddingScheme,
    /// Optional limits on the run.
    pub budget: SearchBudget,
    /// Attempts between progress log lines. Zero disables them.
    pub progress_interval: u64,
}

impl SearchConfig {
    /// Defaults with the given suffix length.
    pub fn new(num_chars: usize) -> Self {
        Self {
            num_chars,
            ..Self::default()
        }
    }

    /// Validate `num_chars` against the algorithm and build the digest.
    pub fn digest(&self) -> std::result::Result<SuffixDigest, CoreError> {
        SuffixDigest::new(self.algorithm, self.num_chars)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_chars: 8,
            algorithm: DigestAlgorithm::Sha256,
            scheme: PaddingScheme::Lines,
            budget: SearchBudget::unlimited(),
            progress_interval: 100_000,
        }
    }
}

/// Limits that end a search without a collision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    /// Attempts this run may make.
    pub max_attempts: Option<u64>,
    /// Wall-clock time this run may take.
    pub max_duration: Option<Duration>,
}

impl SearchBudget {
    pub const fn unlimited() -> Self {
        Self {
            max_attempts: None,
            max_duration: None,
        }
    }

    fn is_exhausted(&self, attempts: u64, started: Instant) -> bool {
        if self.max_attempts.map_or(false, |max| attempts >= max) {
            return true;
        }
        self.max_duration
            .map_or(false, |max| started.elapsed() >= max)
    }
}

/// Two variants, one per side, whose match keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub real: RenderedVariant,
    pub fake: RenderedVariant,
    pub key: MatchKey,
    /// The attempt index at which the collision was detected.
    pub attempt: AttemptIndex,
}

impl Collision {
    /// Recompute both keys and check they equal the reported one.
    pub fn verify(&self, digest: &SuffixDigest) -> bool {
        digest.match_key(&self.real) == self.key && digest.match_key(&self.fake) == self.key
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A collision was found; the search is over.
    Collision(Collision),
    /// The budget ran out. The search can be resumed from `next_attempt`.
    Exhausted { next_attempt: AttemptIndex },
    /// The stop flag was raised. The search can be resumed from `next_attempt`.
    Interrupted { next_attempt: AttemptIndex },
}

/// The search driver.
///
/// Owns both documents and both caches. A single attempt counter is shared
/// by the two sides even though their cycle lengths differ.
pub struct Collider<R: VariantCache, F: VariantCache = R> {
    real: Document,
    fake: Document,
    scheme: PaddingScheme,
    digest: SuffixDigest,
    real_cache: R,
    fake_cache: F,
    next_attempt: AttemptIndex,
    budget: SearchBudget,
    progress_interval: u64,
    stop: Option<Arc<AtomicBool>>,
}

impl Collider<MemoryCache> {
    /// Create a search over empty in-memory caches.
    pub fn new(real: Document, fake: Document, config: &SearchConfig) -> Result<Self> {
        Self::with_caches(real, fake, config, MemoryCache::new(), MemoryCache::new())
    }

    /// Continue a search from a checkpoint.
    pub fn from_checkpoint(
        real: Document,
        fake: Document,
        config: &SearchConfig,
        checkpoint: Checkpoint,
    ) -> Result<Self> {
        let expected =
            SearchFingerprint::new(&real, &fake, config.algorithm, config.scheme, config.num_chars);
        checkpoint.fingerprint.ensure_matches(&expected)?;

        let (next_attempt, real_cache, fake_cache) = checkpoint.into_caches();
        Ok(Self::with_caches(real, fake, config, real_cache, fake_cache)?.starting_at(next_attempt))
    }
}

impl<R: VariantCache, F: VariantCache> Collider<R, F> {
    /// Create a search over the given caches.
    ///
    /// Fails before any attempt is made if `num_chars` is out of range, if
    /// either document has no lines, or if the documents are identical.
    pub fn with_caches(
        real: Document,
        fake: Document,
        config: &SearchConfig,
        real_cache: R,
        fake_cache: F,
    ) -> Result<Self> {
        let digest = config.digest()?;
        real.ensure_renderable(Side::Real)?;
        fake.ensure_renderable(Side::Fake)?;
        if real == fake {
            return Err(CoreError::IdenticalDocuments.into());
        }

        Ok(Self {
            real,
            fake,
            scheme: config.scheme,
            digest,
            real_cache,
            fake_cache,
            next_attempt: 0,
            budget: config.budget,
            progress_interval: config.progress_interval,
            stop: None,
        })
    }

    /// Start (or continue) from `attempt` instead of 0.
    pub fn starting_at(mut self, attempt: AttemptIndex) -> Self {
        self.next_attempt = attempt;
        self
    }

    /// Stop gracefully when `flag` becomes true.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn digest(&self) -> &SuffixDigest {
        &self.digest
    }

    /// The first attempt index not yet rendered.
    pub fn next_attempt(&self) -> AttemptIndex {
        self.next_attempt
    }

    pub fn real_cache(&self) -> &R {
        &self.real_cache
    }

    pub fn fake_cache(&self) -> &F {
        &self.fake_cache
    }

    pub fn into_caches(self) -> (R, F) {
        (self.real_cache, self.fake_cache)
    }

    /// Identity of this search for persisted state.
    pub fn fingerprint(&self) -> SearchFingerprint {
        SearchFingerprint::new(
            &self.real,
            &self.fake,
            self.digest.algorithm(),
            self.scheme,
            self.digest.num_chars(),
        )
    }

    /// Snapshot both caches and the position.
    pub fn checkpoint(&self) -> Result<Checkpoint> {
        Ok(Checkpoint::capture(
            self.fingerprint(),
            self.next_attempt,
            &self.real_cache,
            &self.fake_cache,
        )?)
    }

    /// Run exactly one attempt.
    pub fn step(&mut self) -> Result<Option<Collision>> {
        let attempt = self.next_attempt;

        let real_variant = self.scheme.render(&self.real, attempt);
        let fake_variant = self.scheme.render(&self.fake, attempt);
        let real_key = self.digest.match_key(&real_variant);
        let fake_key = self.digest.match_key(&fake_variant);

        self.real_cache.insert(real_key.clone(), real_variant)?;
        self.fake_cache.insert(fake_key.clone(), fake_variant)?;
        self.next_attempt = attempt.saturating_add(1);

        if let Some(fake) = self.fake_cache.lookup(&real_key)? {
            let real = stored(&self.real_cache, &real_key)?;
            return Ok(Some(Collision {
                real,
                fake,
                key: real_key,
                attempt,
            }));
        }

        if let Some(real) = self.real_cache.lookup(&fake_key)? {
            let fake = stored(&self.fake_cache, &fake_key)?;
            return Ok(Some(Collision {
                real,
                fake,
                key: fake_key,
                attempt,
            }));
        }

        Ok(None)
    }

    /// Run attempts until a collision, the budget, or the stop flag.
    pub fn run(&mut self) -> Result<SearchOutcome> {
        let started = Instant::now();
        let first_attempt = self.next_attempt;

        tracing::info!(
            real_lines = self.real.line_count(),
            fake_lines = self.fake.line_count(),
            real_combinations = ?self.real.combination_count(),
            fake_combinations = ?self.fake.combination_count(),
            algorithm = %self.digest.algorithm(),
            scheme = %self.scheme,
            num_chars = self.digest.num_chars(),
            start = first_attempt,
            "starting collision search"
        );

        loop {
            if self.stop_requested() {
                tracing::info!(next_attempt = self.next_attempt, "search interrupted");
                return Ok(SearchOutcome::Interrupted {
                    next_attempt: self.next_attempt,
                });
            }

            if self
                .budget
                .is_exhausted(self.next_attempt - first_attempt, started)
            {
                tracing::info!(
                    next_attempt = self.next_attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "search budget exhausted without a collision"
                );
                return Ok(SearchOutcome::Exhausted {
                    next_attempt: self.next_attempt,
                });
            }

            if let Some(collision) = self.step()? {
                tracing::info!(
                    key = %collision.key,
                    attempt = collision.attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "collision found"
                );
                return Ok(SearchOutcome::Collision(collision));
            }

            if self.progress_interval > 0 && self.next_attempt % self.progress_interval == 0 {
                self.log_progress(started);
            }
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    fn log_progress(&self, started: Instant) {
        let attempt = self.next_attempt;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let real_level = Coordinates::of(&self.real, attempt).level;
        let fake_level = Coordinates::of(&self.fake, attempt).level;

        match self.cache_sizes() {
            Ok((real_entries, fake_entries)) => tracing::debug!(
                attempt,
                real_entries,
                fake_entries,
                real_level,
                fake_level,
                elapsed_ms,
                "search progress"
            ),
            Err(e) => tracing::debug!(
                attempt,
                real_level,
                fake_level,
                elapsed_ms,
                error = %e,
                "search progress (cache sizes unavailable)"
            ),
        }
    }

    fn cache_sizes(&self) -> Result<(u64, u64)> {
        Ok((self.real_cache.len()?, self.fake_cache.len()?))
    }
}

fn stored<C: VariantCache>(cache: &C, key: &MatchKey) -> Result<RenderedVariant> {
    cache
        .lookup(key)?
        .ok_or_else(|| SearchError::CacheInconsistent(key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use padcollide_store::{Result as StoreResult, StoreError};
    use std::io::Write;
    use std::sync::Mutex;

    fn real_doc() -> Document {
        Document::from_lines(["a", "b"])
    }

    fn fake_doc() -> Document {
        Document::from_lines(["x"])
    }

    fn collision_of(outcome: SearchOutcome) -> Collision {
        match outcome {
            SearchOutcome::Collision(c) => c,
            other => panic!("expected a collision, got {:?}", other),
        }
    }

    #[test]
    fn test_finds_known_collision() {
        let config = SearchConfig::new(2);
        let mut collider = Collider::new(real_doc(), fake_doc(), &config).unwrap();

        let collision = collision_of(collider.run().unwrap());

        assert_eq!(collision.key, MatchKey::new("2a"));
        assert_eq!(collision.attempt, 17);
        assert_eq!(collision.real.as_str(), "a\nb  \n");
        assert_eq!(collision.fake.as_str(), "x         \n");
        assert!(collision.verify(collider.digest()));
    }

    #[test]
    fn test_step_advances_shared_counter() {
        let config = SearchConfig::new(2);
        let mut collider = Collider::new(real_doc(), fake_doc(), &config).unwrap();

        for expected in 1..=5 {
            assert!(collider.step().unwrap().is_none());
            assert_eq!(collider.next_attempt(), expected);
        }
    }

    #[test]
    fn test_rejects_bad_num_chars() {
        for n in [0, 65] {
            let err = Collider::new(real_doc(), fake_doc(), &SearchConfig::new(n)).err();
            assert!(matches!(
                err,
                Some(SearchError::Config(CoreError::InvalidNumChars { .. }))
            ));
        }
    }

    #[test]
    fn test_rejects_empty_document() {
        let empty = Document::from_lines(Vec::<String>::new());
        let err = Collider::new(real_doc(), empty, &SearchConfig::new(2)).err();
        assert!(matches!(
            err,
            Some(SearchError::Config(CoreError::EmptyDocument(Side::Fake)))
        ));
    }

    #[test]
    fn test_rejects_identical_documents() {
        let err = Collider::new(real_doc(), real_doc(), &SearchConfig::new(2)).err();
        assert!(matches!(
            err,
            Some(SearchError::Config(CoreError::IdenticalDocuments))
        ));
    }

    #[test]
    fn test_detects_real_key_in_fake_cache() {
        let config = SearchConfig::new(4);
        let digest = config.digest().unwrap();
        let real_key = digest.match_key(real_doc().original());

        let mut fake_cache = MemoryCache::new();
        fake_cache
            .insert(real_key.clone(), RenderedVariant::new("seeded fake\n"))
            .unwrap();

        let mut collider =
            Collider::with_caches(real_doc(), fake_doc(), &config, MemoryCache::new(), fake_cache)
                .unwrap();
        let collision = collider.step().unwrap().unwrap();

        assert_eq!(collision.key, real_key);
        assert_eq!(collision.real, real_doc().original());
        assert_eq!(collision.fake.as_str(), "seeded fake\n");
        assert_eq!(collision.attempt, 0);
    }

    #[test]
    fn test_detects_fake_key_in_real_cache() {
        let config = SearchConfig::new(4);
        let digest = config.digest().unwrap();
        let fake_key = digest.match_key(fake_doc().original());

        let mut real_cache = MemoryCache::new();
        real_cache
            .insert(fake_key.clone(), RenderedVariant::new("seeded real\n"))
            .unwrap();

        let mut collider =
            Collider::with_caches(real_doc(), fake_doc(), &config, real_cache, MemoryCache::new())
                .unwrap();
        let collision = collider.step().unwrap().unwrap();

        assert_eq!(collision.key, fake_key);
        assert_eq!(collision.real.as_str(), "seeded real\n");
        assert_eq!(collision.fake, fake_doc().original());
    }

    #[test]
    fn test_attempt_budget() {
        let mut config = SearchConfig::new(2);
        config.budget.max_attempts = Some(10);
        let mut collider = Collider::new(real_doc(), fake_doc(), &config).unwrap();

        assert_eq!(
            collider.run().unwrap(),
            SearchOutcome::Exhausted { next_attempt: 10 }
        );
    }

    #[test]
    fn test_zero_duration_budget() {
        let mut config = SearchConfig::new(64);
        config.budget.max_duration = Some(Duration::ZERO);
        let mut collider = Collider::new(real_doc(), fake_doc(), &config).unwrap();

        assert_eq!(
            collider.run().unwrap(),
            SearchOutcome::Exhausted { next_attempt: 0 }
        );
    }

    #[test]
    fn test_stop_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut collider = Collider::new(real_doc(), fake_doc(), &SearchConfig::new(64))
            .unwrap()
            .starting_at(3)
            .with_stop_flag(Arc::clone(&flag));

        assert_eq!(
            collider.run().unwrap(),
            SearchOutcome::Interrupted { next_attempt: 3 }
        );
    }

    #[test]
    fn test_resume_from_checkpoint_matches_uninterrupted_run() {
        let mut config = SearchConfig::new(2);
        config.budget.max_attempts = Some(10);
        let mut first = Collider::new(real_doc(), fake_doc(), &config).unwrap();
        assert!(matches!(first.run().unwrap(), SearchOutcome::Exhausted { .. }));
        let checkpoint = first.checkpoint().unwrap();

        config.budget = SearchBudget::unlimited();
        let mut resumed =
            Collider::from_checkpoint(real_doc(), fake_doc(), &config, checkpoint).unwrap();
        assert_eq!(resumed.next_attempt(), 10);

        let collision = collision_of(resumed.run().unwrap());
        assert_eq!(collision.attempt, 17);
        assert_eq!(collision.key, MatchKey::new("2a"));
    }

    #[test]
    fn test_checkpoint_for_other_search_is_rejected() {
        let collider = Collider::new(real_doc(), fake_doc(), &SearchConfig::new(2)).unwrap();
        let checkpoint = collider.checkpoint().unwrap();

        let err = Collider::from_checkpoint(
            real_doc(),
            fake_doc(),
            &SearchConfig::new(3),
            checkpoint,
        )
        .err();
        assert!(matches!(err, Some(SearchError::Store(_))));
    }

    /// Memory cache whose size query always fails.
    #[derive(Default)]
    struct UncountableCache(MemoryCache);

    impl VariantCache for UncountableCache {
        fn insert(&mut self, key: MatchKey, variant: RenderedVariant) -> StoreResult<()> {
            self.0.insert(key, variant)
        }

        fn lookup(&self, key: &MatchKey) -> StoreResult<Option<RenderedVariant>> {
            self.0.lookup(key)
        }

        fn len(&self) -> StoreResult<u64> {
            Err(StoreError::InvalidData("size unavailable".into()))
        }

        fn entries(&self) -> StoreResult<Vec<(MatchKey, RenderedVariant)>> {
            self.0.entries()
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_progress_reports_cache_size_errors() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut config = SearchConfig::new(2);
        config.progress_interval = 1;
        let outcome = tracing::subscriber::with_default(subscriber, || {
            let mut collider = Collider::with_caches(
                real_doc(),
                fake_doc(),
                &config,
                UncountableCache::default(),
                UncountableCache::default(),
            )
            .unwrap();
            collider.run().unwrap()
        });

        assert_eq!(collision_of(outcome).key, MatchKey::new("2a"));
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("cache sizes unavailable"), "logs: {}", output);
        assert!(output.contains("size unavailable"), "logs: {}", output);
        assert!(!output.contains("real_entries"), "logs: {}", output);
    }
}
