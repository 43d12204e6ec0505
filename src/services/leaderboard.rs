// SPDX-License-Identifier: MIT

//! Leaderboard builder, cache, and snapshot manager.
//!
//! Reads resolve through three tiers, first hit wins:
//! 1. process-local cache (30 second TTL)
//! 2. persisted snapshot (weekly boards only; written by admin activation)
//! 3. live recomputation (populates the cache, never the snapshot)
//!
//! Any submission write clears the whole cache; coarse, but a stale read
//! is the worst outcome of racing on it. Snapshots are superseded only by
//! the next admin activation, never invalidated automatically.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{LeaderboardSnapshot, OverallEntry, WeeklyEntry};
use crate::time_utils::now_rfc3339;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::cmp::Reverse;
use std::time::{Duration, Instant};

/// Live boards are truncated to this many entries.
pub const MAX_ENTRIES: usize = 50;

/// Process-local cache TTL.
pub const CACHE_TTL: Duration = Duration::from_secs(30);

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Cache key: one weekly board per week, one overall board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoardKey {
    Weekly(String),
    Overall,
}

#[derive(Clone)]
enum CachedBoard {
    Weekly(Vec<WeeklyEntry>),
    Overall(Vec<OverallEntry>),
}

struct CacheEntry {
    board: CachedBoard,
    inserted_at: Instant,
}

/// Leaderboard computation with layered caching.
///
/// Owned by `AppState`; handlers share it through the state `Arc` rather
/// than a module-level global, so tests can build isolated instances.
pub struct LeaderboardService {
    cache: DashMap<BoardKey, CacheEntry>,
    ttl: Duration,
}

impl Default for LeaderboardService {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardService {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Custom TTL, for tests.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Drop every cached board. Called on each submission write.
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    fn cache_get(&self, key: &BoardKey) -> Option<CachedBoard> {
        let entry = self.cache.get(key)?;
        if entry.inserted_at.elapsed() < self.ttl {
            Some(entry.board.clone())
        } else {
            drop(entry);
            self.cache.remove(key);
            None
        }
    }

    fn cache_put(&self, key: BoardKey, board: CachedBoard) {
        self.cache.insert(
            key,
            CacheEntry {
                board,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Weekly board: cache, then snapshot, then live computation.
    pub async fn get_weekly(
        &self,
        db: &FirestoreDb,
        week_id: &str,
    ) -> Result<Vec<WeeklyEntry>, AppError> {
        let key = BoardKey::Weekly(week_id.to_string());

        if let Some(CachedBoard::Weekly(entries)) = self.cache_get(&key) {
            tracing::debug!(week_id, "Leaderboard cache hit");
            return Ok(entries);
        }

        if let Some(snapshot) = db.get_snapshot(week_id).await? {
            tracing::debug!(week_id, "Serving leaderboard snapshot");
            self.cache_put(key, CachedBoard::Weekly(snapshot.rankings.clone()));
            return Ok(snapshot.rankings);
        }

        let entries = compute_weekly(db, week_id).await?;
        self.cache_put(key, CachedBoard::Weekly(entries.clone()));
        Ok(entries)
    }

    /// Overall board: cache, then live computation. No snapshot tier;
    /// the all-time board has no activation event to freeze it.
    pub async fn get_overall(&self, db: &FirestoreDb) -> Result<Vec<OverallEntry>, AppError> {
        if let Some(CachedBoard::Overall(entries)) = self.cache_get(&BoardKey::Overall) {
            tracing::debug!("Overall leaderboard cache hit");
            return Ok(entries);
        }

        let entries = compute_overall(db).await?;
        self.cache_put(BoardKey::Overall, CachedBoard::Overall(entries.clone()));
        Ok(entries)
    }

    /// Admin activation: recompute from live data and freeze the result.
    ///
    /// This is the only writer of snapshots, so concurrent activations
    /// cannot interleave partial rankings.
    pub async fn activate(
        &self,
        db: &FirestoreDb,
        week_id: &str,
    ) -> Result<Vec<WeeklyEntry>, AppError> {
        let rankings = compute_weekly(db, week_id).await?;

        let snapshot = LeaderboardSnapshot {
            week_id: week_id.to_string(),
            created_at: now_rfc3339(),
            rankings: rankings.clone(),
        };
        db.set_snapshot(&snapshot).await?;

        self.cache_put(
            BoardKey::Weekly(week_id.to_string()),
            CachedBoard::Weekly(rankings.clone()),
        );

        tracing::info!(week_id, entries = rankings.len(), "Leaderboard snapshot saved");
        Ok(rankings)
    }
}

/// Rank weekly entries: score descending, then time-taken ascending.
///
/// Two stable passes; `sort_by_key` stability is guaranteed by std, which
/// is what preserves the first pass's order through the second (and input
/// order for fully tied entries). Ranks are positional, ties get distinct
/// sequential ranks.
pub fn rank_weekly(mut entries: Vec<WeeklyEntry>) -> Vec<WeeklyEntry> {
    entries.sort_by_key(|e| e.time_taken);
    entries.sort_by_key(|e| Reverse(e.score));
    entries.truncate(MAX_ENTRIES);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    entries
}

/// Rank overall entries: cumulative score descending, then average
/// time-taken ascending. Same two-pass scheme as [`rank_weekly`].
pub fn rank_overall(mut entries: Vec<OverallEntry>) -> Vec<OverallEntry> {
    entries.sort_by(|a, b| {
        a.avg_time_taken
            .partial_cmp(&b.avg_time_taken)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.sort_by_key(|e| Reverse(e.cumulative_score));
    entries.truncate(MAX_ENTRIES);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    entries
}

/// Compute a weekly board from live submission data.
async fn compute_weekly(db: &FirestoreDb, week_id: &str) -> Result<Vec<WeeklyEntry>, AppError> {
    let submissions = db.list_submissions_for_week(week_id).await?;

    let entries = submissions
        .into_iter()
        .map(|s| WeeklyEntry {
            rank: 0,
            name: s.user_name,
            score: s.score,
            time_taken: s.time_taken,
            week_id: s.week_id,
        })
        .collect();

    Ok(rank_weekly(entries))
}

/// Compute the overall board from live user and submission data.
///
/// Submissions carry no owner id, so this walks the top users by
/// cumulative score and fetches each one's submissions (bounded
/// concurrency, order-preserving) for average time and weeks played.
async fn compute_overall(db: &FirestoreDb) -> Result<Vec<OverallEntry>, AppError> {
    let users = db.top_users_by_cumulative_score(MAX_ENTRIES as u32).await?;

    let entries: Vec<OverallEntry> = stream::iter(users)
        .map(|user| async move {
            let submissions = db.list_submissions_for_user(&user.user_id).await?;

            let weeks_played = submissions.len() as u32;
            let avg_time_taken = if submissions.is_empty() {
                0.0
            } else {
                submissions.iter().map(|s| s.time_taken as f64).sum::<f64>()
                    / submissions.len() as f64
            };

            Ok::<_, AppError>(OverallEntry {
                rank: 0,
                name: user.name,
                cumulative_score: user.cumulative_score.unwrap_or(0),
                avg_time_taken,
                weeks_played,
            })
        })
        .buffered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<Result<OverallEntry, AppError>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<OverallEntry>, AppError>>()?;

    Ok(rank_overall(entries))
}
