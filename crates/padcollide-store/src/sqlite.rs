//! SQLite implementation of the VariantCache trait.
//!
//! Both sides of a search share one database. Entries are keyed by
//! `(side, match_key)`, and a single `search_meta` row records which search
//! the entries belong to and how far it got, so a run can be resumed.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use padcollide_core::{AttemptIndex, MatchKey, RenderedVariant, Side};

use crate::checkpoint::SearchFingerprint;
use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::VariantCache;

/// A SQLite database holding the caches of one search.
///
/// Thread-safe via internal Mutex. Hands out one [`SqliteCache`] per side.
#[derive(Clone)]
pub struct SqliteCacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCacheStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        // The search writes two rows per attempt; fsync on every commit
        // would dominate the run time.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The cache for one side of the search.
    pub fn cache(&self, side: Side) -> SqliteCache {
        SqliteCache {
            conn: Arc::clone(&self.conn),
            side,
        }
    }

    /// Where a previous run of the same search stopped.
    ///
    /// Returns `None` for a fresh database, and an error if the database
    /// belongs to a different search.
    pub fn resume_position(
        &self,
        fingerprint: &SearchFingerprint,
    ) -> Result<Option<AttemptIndex>> {
        let conn = lock(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT real_fingerprint, fake_fingerprint, algorithm, scheme,
                        num_chars, next_attempt
                 FROM search_meta WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((real, fake, algorithm, scheme, num_chars, next_attempt)) = row else {
            return Ok(None);
        };

        let stored = SearchFingerprint {
            real: to_array(real, "real_fingerprint")?,
            fake: to_array(fake, "fake_fingerprint")?,
            algorithm: algorithm
                .parse()
                .map_err(|e| StoreError::InvalidData(format!("algorithm: {}", e)))?,
            scheme: scheme
                .parse()
                .map_err(|e| StoreError::InvalidData(format!("scheme: {}", e)))?,
            num_chars: usize::try_from(num_chars)
                .map_err(|_| StoreError::InvalidData(format!("num_chars: {}", num_chars)))?,
        };
        stored.ensure_matches(fingerprint)?;

        let next = AttemptIndex::try_from(next_attempt)
            .map_err(|_| StoreError::InvalidData(format!("next_attempt: {}", next_attempt)))?;
        Ok(Some(next))
    }

    /// Record the search identity and the first attempt not yet rendered.
    pub fn save_position(
        &self,
        fingerprint: &SearchFingerprint,
        next_attempt: AttemptIndex,
    ) -> Result<()> {
        let next_attempt = i64::try_from(next_attempt)
            .map_err(|_| StoreError::InvalidData(format!("next_attempt: {}", next_attempt)))?;
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO search_meta (id, real_fingerprint, fake_fingerprint, algorithm,
                                      scheme, num_chars, next_attempt, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                real_fingerprint = excluded.real_fingerprint,
                fake_fingerprint = excluded.fake_fingerprint,
                algorithm = excluded.algorithm,
                scheme = excluded.scheme,
                num_chars = excluded.num_chars,
                next_attempt = excluded.next_attempt,
                updated_at = excluded.updated_at",
            params![
                fingerprint.real.as_slice(),
                fingerprint.fake.as_slice(),
                fingerprint.algorithm.as_str(),
                fingerprint.scheme.as_str(),
                fingerprint.num_chars as i64,
                next_attempt,
                now_millis(),
            ],
        )?;
        Ok(())
    }

    /// Drop all cached variants and the recorded position.
    pub fn clear(&self) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch("DELETE FROM variants; DELETE FROM search_meta;")?;
        Ok(())
    }
}

/// One side's view of a [`SqliteCacheStore`].
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
    side: Side,
}

impl SqliteCache {
    pub fn side(&self) -> Side {
        self.side
    }
}

impl VariantCache for SqliteCache {
    fn insert(&mut self, key: MatchKey, variant: RenderedVariant) -> Result<()> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "INSERT INTO variants (side, match_key, variant) VALUES (?1, ?2, ?3)
             ON CONFLICT(side, match_key) DO UPDATE SET variant = excluded.variant",
        )?;
        stmt.execute(params![self.side.as_str(), key.as_str(), variant.as_str()])?;
        Ok(())
    }

    fn lookup(&self, key: &MatchKey) -> Result<Option<RenderedVariant>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT variant FROM variants WHERE side = ?1 AND match_key = ?2",
        )?;
        let variant = stmt
            .query_row(params![self.side.as_str(), key.as_str()], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(variant.map(RenderedVariant::new))
    }

    fn contains(&self, key: &MatchKey) -> Result<bool> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT 1 FROM variants WHERE side = ?1 AND match_key = ?2",
        )?;
        Ok(stmt.exists(params![self.side.as_str(), key.as_str()])?)
    }

    fn len(&self) -> Result<u64> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM variants WHERE side = ?1",
            params![self.side.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn entries(&self) -> Result<Vec<(MatchKey, RenderedVariant)>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT match_key, variant FROM variants WHERE side = ?1 ORDER BY match_key",
        )?;
        let rows = stmt.query_map(params![self.side.as_str()], |row| {
            Ok((
                MatchKey::new(row.get::<_, String>(0)?),
                RenderedVariant::new(row.get::<_, String>(1)?),
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

fn to_array(bytes: Vec<u8>, column: &str) -> Result<[u8; 32]> {
    bytes
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("{} is not 32 bytes", column)))
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use padcollide_core::{DigestAlgorithm, Document, PaddingScheme};

    fn fingerprint(num_chars: usize) -> SearchFingerprint {
        SearchFingerprint::new(
            &Document::from_lines(["a", "b"]),
            &Document::from_lines(["x"]),
            DigestAlgorithm::Sha256,
            PaddingScheme::Lines,
            num_chars,
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = SqliteCacheStore::open_memory().unwrap();
        let mut real = store.cache(Side::Real);

        real.insert(MatchKey::new("2a"), RenderedVariant::new("a\nb  \n"))
            .unwrap();

        assert_eq!(
            real.lookup(&MatchKey::new("2a")).unwrap(),
            Some(RenderedVariant::new("a\nb  \n"))
        );
        assert!(real.contains(&MatchKey::new("2a")).unwrap());
        assert_eq!(real.lookup(&MatchKey::new("2b")).unwrap(), None);
        assert!(!real.contains(&MatchKey::new("2b")).unwrap());
    }

    #[test]
    fn test_sides_are_isolated() {
        let store = SqliteCacheStore::open_memory().unwrap();
        let mut real = store.cache(Side::Real);
        let fake = store.cache(Side::Fake);

        real.insert(MatchKey::new("2a"), RenderedVariant::new("a\n"))
            .unwrap();

        assert!(fake.lookup(&MatchKey::new("2a")).unwrap().is_none());
        assert_eq!(real.len().unwrap(), 1);
        assert_eq!(fake.len().unwrap(), 0);
    }

    #[test]
    fn test_insert_overwrites() {
        let store = SqliteCacheStore::open_memory().unwrap();
        let mut fake = store.cache(Side::Fake);

        fake.insert(MatchKey::new("77"), RenderedVariant::new("x \n"))
            .unwrap();
        fake.insert(MatchKey::new("77"), RenderedVariant::new("x   \n"))
            .unwrap();

        assert_eq!(fake.len().unwrap(), 1);
        assert_eq!(
            fake.entries().unwrap(),
            vec![(MatchKey::new("77"), RenderedVariant::new("x   \n"))]
        );
    }

    #[test]
    fn test_position_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let store = SqliteCacheStore::open(&path).unwrap();
            assert_eq!(store.resume_position(&fingerprint(2)).unwrap(), None);
            store
                .cache(Side::Real)
                .insert(MatchKey::new("ab"), RenderedVariant::new("a \nb\n"))
                .unwrap();
            store.save_position(&fingerprint(2), 42).unwrap();
            store.save_position(&fingerprint(2), 43).unwrap();
        }

        let store = SqliteCacheStore::open(&path).unwrap();
        assert_eq!(store.resume_position(&fingerprint(2)).unwrap(), Some(43));
        assert_eq!(store.cache(Side::Real).len().unwrap(), 1);
    }

    #[test]
    fn test_resume_rejects_other_search() {
        let store = SqliteCacheStore::open_memory().unwrap();
        store.save_position(&fingerprint(2), 10).unwrap();

        assert!(matches!(
            store.resume_position(&fingerprint(3)),
            Err(StoreError::FingerprintMismatch(_))
        ));
    }

    #[test]
    fn test_clear() {
        let store = SqliteCacheStore::open_memory().unwrap();
        store
            .cache(Side::Fake)
            .insert(MatchKey::new("01"), RenderedVariant::new("x\n"))
            .unwrap();
        store.save_position(&fingerprint(2), 5).unwrap();

        store.clear().unwrap();

        assert!(store.cache(Side::Fake).is_empty().unwrap());
        assert_eq!(store.resume_position(&fingerprint(2)).unwrap(), None);
    }
}
