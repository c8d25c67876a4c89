// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Allocation memory.
//!
//! Every instruction appends a [`MemoryEvent`] to the log. The per-slice
//! search history and the active lock of each slice are kept alongside the
//! log so that the algorithm queries and the two tables can be read without
//! replaying it.
//!
//! Both tables have one column group per slice (wavelength, tuner code, lock
//! flag). Row `r` holds the `r`-th candidate of each slice's most recent
//! search. The _search table_ shows every candidate, the _lock table_ only the
//! locked ones.

use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use wdm_engine::types::{SimError, SimResult, check_index};
use wdm_models::tuner::Candidate;
use wdm_models::wavelength::Wavelength;
use wdm_track::entity::Entity;
use wdm_track::trace;

/// One candidate as recorded in the tables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableEntry {
    pub wavelength: Wavelength,
    pub code: usize,
    pub dac_code: u8,
    pub locked: bool,
}

impl From<&Candidate> for TableEntry {
    fn from(candidate: &Candidate) -> Self {
        Self {
            wavelength: candidate.wavelength,
            code: candidate.code,
            dac_code: candidate.dac_code,
            locked: false,
        }
    }
}

/// The result of one search of one slice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchRecord {
    pub entries: Vec<TableEntry>,
}

impl SearchRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn locked_entry(&self) -> Option<&TableEntry> {
        self.entries.iter().find(|e| e.locked)
    }
}

/// Entries of the append-only log.
#[derive(Clone, Debug, PartialEq)]
pub enum MemoryEvent {
    Search {
        slice: usize,
        entries: Vec<TableEntry>,
    },
    Lock {
        slice: usize,
        record: usize,
        entry: usize,
    },
    Unlock {
        slice: usize,
        record: usize,
        entry: usize,
    },
}

pub struct AllocationMemory {
    entity: Rc<Entity>,
    log: Vec<MemoryEvent>,
    history: Vec<Vec<SearchRecord>>,

    /// (record, entry) of the lock each slice currently holds.
    active_lock: Vec<Option<(usize, usize)>>,
}

impl AllocationMemory {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, num_slices: usize) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "memory")),
            log: Vec::new(),
            history: vec![Vec::new(); num_slices],
            active_lock: vec![None; num_slices],
        }
    }

    #[must_use]
    pub fn num_slices(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn events(&self) -> &[MemoryEvent] {
        &self.log
    }

    /// Every search recorded for `slice`, oldest first.
    pub fn history(&self, slice: usize) -> Result<&[SearchRecord], SimError> {
        let slice = check_index(slice, self.history.len())?;
        Ok(&self.history[slice])
    }

    /// The most recent search recorded for `slice`.
    pub fn latest(&self, slice: usize) -> Result<Option<&SearchRecord>, SimError> {
        Ok(self.history(slice)?.last())
    }

    pub fn record_search(&mut self, slice: usize, candidates: &[Candidate]) -> SimResult {
        let slice = check_index(slice, self.history.len())?;
        let entries: Vec<TableEntry> = candidates.iter().map(TableEntry::from).collect();
        trace!(self.entity ; "slice{slice} search row {}: {} entries", self.history[slice].len(), entries.len());
        self.history[slice].push(SearchRecord {
            entries: entries.clone(),
        });
        self.log.push(MemoryEvent::Search { slice, entries });
        Ok(())
    }

    /// Mark `entry` of the latest search of `slice` as locked.
    pub fn record_lock(&mut self, slice: usize, entry: usize) -> SimResult {
        let slice = check_index(slice, self.history.len())?;
        if self.active_lock[slice].is_some() {
            return Err(SimError::AlreadyLocked(format!(
                "slice{slice} already holds a lock in memory"
            )));
        }
        let record = match self.history[slice].len() {
            0 => {
                return Err(SimError::NoCandidate(format!(
                    "slice{slice} has not been searched"
                )));
            }
            len => len - 1,
        };
        let entries = &mut self.history[slice][record].entries;
        let entry = check_index(entry, entries.len())?;
        entries[entry].locked = true;

        self.active_lock[slice] = Some((record, entry));
        self.log.push(MemoryEvent::Lock {
            slice,
            record,
            entry,
        });
        Ok(())
    }

    /// Clear the lock flag of the entry `slice` is locked to.
    ///
    /// Returns false if the slice held no lock.
    pub fn record_unlock(&mut self, slice: usize) -> Result<bool, SimError> {
        let slice = check_index(slice, self.history.len())?;
        let Some((record, entry)) = self.active_lock[slice].take() else {
            return Ok(false);
        };
        self.history[slice][record].entries[entry].locked = false;
        self.log.push(MemoryEvent::Unlock {
            slice,
            record,
            entry,
        });
        Ok(true)
    }

    /// True iff the most recent search of `slice` has its lock flag set.
    pub fn check_lock_done(&self, slice: usize) -> Result<bool, SimError> {
        Ok(self
            .latest(slice)?
            .is_some_and(|record| record.locked_entry().is_some()))
    }

    /// True iff no search of `slice` has ever seen a candidate.
    pub fn check_zero_lock(&self, slice: usize) -> Result<bool, SimError> {
        Ok(self.history(slice)?.iter().all(SearchRecord::is_empty))
    }

    /// The entry each slice is currently locked to, in bus order.
    #[must_use]
    pub fn locked_entries(&self) -> Vec<Option<TableEntry>> {
        self.active_lock
            .iter()
            .zip(&self.history)
            .map(|(lock, history)| lock.map(|(record, entry)| history[record].entries[entry]))
            .collect()
    }

    #[must_use]
    pub fn search_table(&self) -> AllocationTable {
        self.build_table(|_| true)
    }

    #[must_use]
    pub fn lock_table(&self) -> AllocationTable {
        self.build_table(|entry| entry.locked)
    }

    fn build_table(&self, keep: impl Fn(&TableEntry) -> bool) -> AllocationTable {
        let latest: Vec<&[TableEntry]> = self
            .history
            .iter()
            .map(|history| history.last().map_or(&[][..], |r| r.entries.as_slice()))
            .collect();
        let num_rows = latest.iter().map(|entries| entries.len()).max().unwrap_or(0);

        let rows: Vec<Vec<Option<TableEntry>>> = (0..num_rows)
            .map(|row| {
                latest
                    .iter()
                    .map(|entries| entries.get(row).filter(|e| keep(e)).copied())
                    .collect()
            })
            .collect();

        AllocationTable {
            num_slices: self.history.len(),
            rows,
        }
    }
}

/// A table of [`TableEntry`] cells: rows by search position, one column per
/// slice.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocationTable {
    num_slices: usize,
    rows: Vec<Vec<Option<TableEntry>>>,
}

impl AllocationTable {
    #[must_use]
    pub fn num_slices(&self) -> usize {
        self.num_slices
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<TableEntry>>] {
        &self.rows
    }

    #[must_use]
    pub fn cell(&self, row: usize, slice: usize) -> Option<&TableEntry> {
        self.rows.get(row)?.get(slice)?.as_ref()
    }

    /// Every cell of one slice's column, top to bottom.
    pub fn column(&self, slice: usize) -> impl Iterator<Item = Option<&TableEntry>> {
        self.rows.iter().map(move |row| row.get(slice).and_then(Option::as_ref))
    }
}

impl fmt::Display for AllocationTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header = (0..self.num_slices)
            .map(|slice| {
                let (w, c, l) = (
                    format!("R{slice}/W"),
                    format!("R{slice}/C"),
                    format!("R{slice}/L"),
                );
                format!("{w:>8} {c:>5} {l:>5}")
            })
            .join(" |");
        writeln!(f, "{:>4} |{header}", "row")?;

        for (i, row) in self.rows.iter().enumerate() {
            let cells = row
                .iter()
                .map(|cell| match cell {
                    Some(entry) => {
                        let w = entry.wavelength.to_string();
                        let l = if entry.locked { "Y" } else { "N" };
                        format!("{w:>8} {:>5} {l:>5}", entry.code)
                    }
                    None => format!("{:>8} {:>5} {:>5}", "-", "-", "-"),
                })
                .join(" |");
            writeln!(f, "{i:>4} |{cells}")?;
        }
        Ok(())
    }
}
