#![forbid(unsafe_code)]

use super::*;
use navet_core::ids::{PostId, UserId};
use navet_core::model::{DecisiveOutcome, SupportOutcome};
use navet_core::status::{PostStatus, VoteKind, VotePhase};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

impl SqliteStore {
    /// One atomic support-vote insert: dedup via the (post, user, phase)
    /// primary key, recount, denormalize onto the post, and flip
    /// proposal → voting when the threshold is reached. Running it all in
    /// one immediate transaction keeps the threshold boundary exact under
    /// concurrent voters.
    pub fn vote_cast_support(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        threshold: i64,
    ) -> Result<SupportOutcome, StoreError> {
        if threshold < 1 {
            return Err(StoreError::InvalidInput("threshold must be at least 1"));
        }
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM posts WHERE id = ?1",
                params![post_id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(status) = status else {
            return Err(StoreError::UnknownId);
        };
        let status = PostStatus::parse(&status)
            .map_err(|err| StoreError::Corrupt(format!("posts.status: {err}")))?;
        if !status.accepts_support_votes() {
            return Err(StoreError::StatusConflict { actual: status });
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO votes(post_id, user_id, phase, value) VALUES (?1, ?2, ?3, ?4)",
            params![
                post_id.as_i64(),
                user_id.as_i64(),
                VotePhase::Support.as_str(),
                VoteKind::Support.as_str()
            ],
        )?;
        if inserted == 0 {
            return Err(StoreError::DuplicateVote);
        }

        let support_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM votes WHERE post_id = ?1 AND phase = ?2",
            params![post_id.as_i64(), VotePhase::Support.as_str()],
            |row| row.get(0),
        )?;
        tx.execute(
            "UPDATE posts SET support_count = ?2 WHERE id = ?1",
            params![post_id.as_i64(), support_count],
        )?;

        let escalated = support_count >= threshold && status == PostStatus::Proposal;
        if escalated {
            tx.execute(
                "UPDATE posts SET status = ?2 WHERE id = ?1",
                params![post_id.as_i64(), PostStatus::Voting.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(SupportOutcome {
            support_count,
            escalated,
        })
    }

    /// Decisive votes are mutable: a second cast overwrites the stored value
    /// in place; casting the same value again leaves the ledger untouched.
    pub fn vote_cast_decisive(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        vote: VoteKind,
    ) -> Result<DecisiveOutcome, StoreError> {
        if vote.phase() != VotePhase::Decisive {
            return Err(StoreError::InvalidInput("decisive vote must be yes or no"));
        }
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM posts WHERE id = ?1",
                params![post_id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(status) = status else {
            return Err(StoreError::UnknownId);
        };
        let status = PostStatus::parse(&status)
            .map_err(|err| StoreError::Corrupt(format!("posts.status: {err}")))?;
        if !status.accepts_decisive_votes() {
            return Err(StoreError::StatusConflict { actual: status });
        }

        let existing: Option<String> = tx
            .query_row(
                "SELECT value FROM votes WHERE post_id = ?1 AND user_id = ?2 AND phase = ?3",
                params![
                    post_id.as_i64(),
                    user_id.as_i64(),
                    VotePhase::Decisive.as_str()
                ],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            None => {
                tx.execute(
                    "INSERT INTO votes(post_id, user_id, phase, value) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        post_id.as_i64(),
                        user_id.as_i64(),
                        VotePhase::Decisive.as_str(),
                        vote.as_str()
                    ],
                )?;
                DecisiveOutcome::Recorded
            }
            Some(value) if value == vote.as_str() => DecisiveOutcome::Unchanged,
            Some(_) => {
                tx.execute(
                    "UPDATE votes SET value = ?4 WHERE post_id = ?1 AND user_id = ?2 AND phase = ?3",
                    params![
                        post_id.as_i64(),
                        user_id.as_i64(),
                        VotePhase::Decisive.as_str(),
                        vote.as_str()
                    ],
                )?;
                DecisiveOutcome::Changed
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    pub fn vote_decisive_value(
        &mut self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<Option<VoteKind>, StoreError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM votes WHERE post_id = ?1 AND user_id = ?2 AND phase = ?3",
                params![
                    post_id.as_i64(),
                    user_id.as_i64(),
                    VotePhase::Decisive.as_str()
                ],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|raw| {
                VoteKind::parse(&raw)
                    .map_err(|err| StoreError::Corrupt(format!("votes.value: {err}")))
            })
            .transpose()
    }

    pub fn vote_support_count(&mut self, post_id: PostId) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM votes WHERE post_id = ?1 AND phase = ?2",
            params![post_id.as_i64(), VotePhase::Support.as_str()],
            |row| row.get(0),
        )?)
    }
}
