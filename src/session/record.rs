//! Move history in paired records.

use super::SessionError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One numbered line of the move history: the human's move and the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MoveRecord {
    /// 1-based move number.
    index: u32,
    /// Human move in SAN.
    human: String,
    /// Remote reply in SAN, once played.
    remote: Option<String>,
}

impl MoveRecord {
    /// True while the reply is missing.
    pub fn is_open(&self) -> bool {
        self.remote.is_none()
    }
}

/// Ordered move records.
///
/// Only the last record may be open, and a reply only ever completes an
/// open record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLog {
    records: Vec<MoveRecord>,
    plies: u32,
}

impl MoveLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new record with the human's move and returns its number.
    ///
    /// The number is `ceil((N + 1) / 2)` for `N` plies already played.
    #[instrument(skip(self), fields(plies = self.plies))]
    pub fn record_human(&mut self, san: String) -> Result<u32, SessionError> {
        if self.open_record().is_some() {
            return Err(SessionError::OutOfTurn {
                operation: "record human move",
                phase: super::Phase::AwaitingRemoteMove,
            });
        }

        let index = (self.plies + 1).div_ceil(2);
        self.records.push(MoveRecord {
            index,
            human: san,
            remote: None,
        });
        self.plies += 1;
        debug!(index, "Opened move record");
        Ok(index)
    }

    /// Completes the open record with the reply and returns its number.
    #[instrument(skip(self), fields(plies = self.plies))]
    pub fn record_remote(&mut self, san: String) -> Result<u32, SessionError> {
        let record = self
            .records
            .last_mut()
            .filter(|record| record.is_open())
            .ok_or(SessionError::OutOfTurn {
                operation: "record remote move",
                phase: super::Phase::AwaitingHumanMove,
            })?;

        record.remote = Some(san);
        self.plies += 1;
        debug!(index = record.index, "Completed move record");
        Ok(record.index)
    }

    /// The record still waiting for a reply, if any.
    pub fn open_record(&self) -> Option<&MoveRecord> {
        self.records.last().filter(|record| record.is_open())
    }

    /// All records in order.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Plies recorded so far.
    pub fn plies(&self) -> u32 {
        self.plies
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been played.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
