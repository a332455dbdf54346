use std::collections::HashSet;

use futures::stream::{self, StreamExt};

use crate::matcher::Ranker;
use crate::playlist::{self, ChannelEntry, EntryStatus};
use crate::probe::{Probe, ProbeOutcome};

/// Operator decision over one page of ranked replacement candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairChoice {
    /// Try the candidate at this 0-based page index.
    Select(usize),
    /// Discard the whole shown page and rank the next one.
    More,
    /// Leave this entry unrepaired and move on.
    Skip,
}

/// List-editing command during the organize phase. Positions are 1-based
/// display positions, recomputed after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurateCommand {
    List,
    Move(usize, usize),
    Delete(usize),
    Done,
}

/// Terminal state of one entry's repair loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    Repaired,
    Skipped,
    Exhausted,
}

/// Driver-to-operator notifications, for whatever front end is attached.
#[derive(Debug)]
pub enum Notice<'a> {
    CandidateLive(&'a ChannelEntry),
    CandidateDead(&'a ChannelEntry),
    NoCandidatesLeft,
    Added(&'a ChannelEntry),
    AlreadyPresent(&'a ChannelEntry),
    Moved { name: &'a str, to: usize },
    Deleted { name: &'a str },
    BadPosition,
}

/// The decision collaborator: a terminal UI, a scripted test harness, or
/// anything else that can answer these synchronously.
pub trait Decider {
    /// Repair: pick from the shown candidate page.
    fn choose_replacement(
        &mut self,
        target: &ChannelEntry,
        candidates: &[&ChannelEntry],
    ) -> RepairChoice;

    /// Extend: pick a donor group to browse, or None to finish the phase.
    fn choose_group(&mut self, groups: &[String]) -> Option<usize>;

    /// Extend: 0-based indices within the shown group to append.
    fn choose_additions(&mut self, entries: &[&ChannelEntry]) -> Vec<usize>;

    /// Organize: the next list-editing command.
    fn curate(&mut self, entries: &[ChannelEntry]) -> CurateCommand;

    /// Progress events the operator should see.
    fn notify(&mut self, note: Notice<'_>);
}

/// Owns the working playlist for the duration of one run and sequences the
/// phases: verify, repair, extend, organize, render. Entries are only ever
/// excluded from the output, never destroyed, so earlier phases' results
/// stay addressable throughout.
pub struct Reconciler {
    entries: Vec<ChannelEntry>,
    failed: Vec<usize>,
}

impl Reconciler {
    pub fn new(entries: Vec<ChannelEntry>) -> Self {
        Self {
            entries,
            failed: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    /// Indices of entries that failed verification, in playlist order.
    pub fn failed(&self) -> &[usize] {
        &self.failed
    }

    pub fn repaired_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.replacement_url.is_some())
            .count()
    }

    pub fn unrepaired_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Failed && e.replacement_url.is_none())
            .count()
    }

    /// Probe every entry and record the failures in playlist order.
    ///
    /// Probes run with bounded concurrency; results are still collected and
    /// reported in original order, so `on_result` sees the same sequence a
    /// one-at-a-time scan would produce. Entries that pass are final and
    /// never re-probed.
    pub async fn verify<P: Probe>(
        &mut self,
        prober: &P,
        concurrency: usize,
        mut on_result: impl FnMut(usize, &ChannelEntry, ProbeOutcome),
    ) {
        let mut outcomes = Vec::with_capacity(self.entries.len());
        {
            let mut results = stream::iter(self.entries.iter().map(|e| prober.probe(&e.url)))
                .buffered(concurrency.max(1));
            while let Some(outcome) = results.next().await {
                let i = outcomes.len();
                on_result(i, &self.entries[i], outcome);
                outcomes.push(outcome);
            }
        }

        self.failed.clear();
        for (i, outcome) in outcomes.into_iter().enumerate() {
            self.entries[i].status = if outcome.is_ok() {
                EntryStatus::Ok
            } else {
                EntryStatus::Failed
            };
            if !outcome.is_ok() {
                self.failed.push(i);
            }
        }
    }

    /// Run the repair loop over every failed entry, strictly in order.
    /// Returns how many entries were repaired.
    pub async fn repair<P: Probe, D: Decider>(
        &mut self,
        pool: &[ChannelEntry],
        ranker: &Ranker,
        prober: &P,
        decider: &mut D,
    ) -> usize {
        let failed = self.failed.clone();
        let mut repaired = 0;
        for idx in failed {
            if self.repair_entry(idx, pool, ranker, prober, decider).await
                == RepairOutcome::Repaired
            {
                repaired += 1;
            }
        }
        repaired
    }

    /// Repair one failed entry: rank, let the operator pick, confirm the
    /// pick with a live probe, and either accept it or exclude it and ask
    /// again. Terminates because the exclusion set only grows against a
    /// finite pool. Rejected candidates are never offered again for this
    /// entry.
    pub async fn repair_entry<P: Probe, D: Decider>(
        &mut self,
        idx: usize,
        pool: &[ChannelEntry],
        ranker: &Ranker,
        prober: &P,
        decider: &mut D,
    ) -> RepairOutcome {
        let mut excluded: HashSet<usize> = HashSet::new();
        loop {
            let ranked = ranker.rank(&self.entries[idx], pool, &excluded);
            if ranked.is_empty() {
                decider.notify(Notice::NoCandidatesLeft);
                return RepairOutcome::Exhausted;
            }
            let page: Vec<&ChannelEntry> = ranked.iter().map(|&i| &pool[i]).collect();
            match decider.choose_replacement(&self.entries[idx], &page) {
                RepairChoice::Skip => return RepairOutcome::Skipped,
                RepairChoice::More => excluded.extend(ranked.iter().copied()),
                RepairChoice::Select(n) => {
                    // Out of range: re-enter the same decision, nothing lost.
                    let Some(&pool_idx) = ranked.get(n) else {
                        continue;
                    };
                    let candidate = &pool[pool_idx];
                    if prober.probe(&candidate.url).await.is_ok() {
                        decider.notify(Notice::CandidateLive(candidate));
                        self.entries[idx].replacement_url = Some(candidate.url.clone());
                        return RepairOutcome::Repaired;
                    }
                    decider.notify(Notice::CandidateDead(candidate));
                    excluded.insert(pool_idx);
                }
            }
        }
    }

    /// Append donor entries picked by group, skipping any whose descriptor
    /// line is already present in the working list.
    pub fn extend<D: Decider>(&mut self, pool: &[ChannelEntry], decider: &mut D) {
        if pool.is_empty() {
            return;
        }
        let groups = playlist::group_titles(pool);
        while let Some(g) = decider.choose_group(&groups) {
            let Some(group) = groups.get(g) else {
                decider.notify(Notice::BadPosition);
                continue;
            };
            let members: Vec<&ChannelEntry> = pool.iter().filter(|c| &c.group == group).collect();
            for n in decider.choose_additions(&members) {
                let Some(candidate) = members.get(n).copied() else {
                    decider.notify(Notice::BadPosition);
                    continue;
                };
                if self
                    .entries
                    .iter()
                    .any(|e| e.raw_extinf == candidate.raw_extinf)
                {
                    decider.notify(Notice::AlreadyPresent(candidate));
                } else {
                    self.entries.push(candidate.clone());
                    decider.notify(Notice::Added(candidate));
                }
            }
        }
    }

    /// Reorder or delete entries, addressed by 1-based display position.
    /// Bad positions are reported and the command loop re-entered.
    pub fn organize<D: Decider>(&mut self, decider: &mut D) {
        loop {
            match decider.curate(&self.entries) {
                CurateCommand::Done => return,
                CurateCommand::List => continue,
                CurateCommand::Move(from, to) => {
                    if !self.position_ok(from) || !self.position_ok(to) {
                        decider.notify(Notice::BadPosition);
                        continue;
                    }
                    let entry = self.entries.remove(from - 1);
                    let name = entry.name.clone();
                    self.entries.insert(to - 1, entry);
                    decider.notify(Notice::Moved { name: &name, to });
                }
                CurateCommand::Delete(pos) => {
                    if !self.position_ok(pos) {
                        decider.notify(Notice::BadPosition);
                        continue;
                    }
                    let removed = self.entries.remove(pos - 1);
                    decider.notify(Notice::Deleted {
                        name: &removed.name,
                    });
                }
            }
        }
    }

    fn position_ok(&self, pos: usize) -> bool {
        pos >= 1 && pos <= self.entries.len()
    }

    /// Render the final playlist, replacement URLs substituted where set.
    pub fn render(&self) -> String {
        playlist::serialize(&self.entries)
    }

    pub fn into_entries(self) -> Vec<ChannelEntry> {
        self.entries
    }
}
