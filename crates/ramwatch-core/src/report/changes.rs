use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::{CANDIDATE_LIMIT, PER_RANGE_LIMIT, format_line};
use crate::classify::{Classification, ClassificationPolicy};
use crate::error::Result;
use crate::memory::AddressRange;
use crate::snapshot::Delta;

/// Deltas reported under one range
#[derive(Debug, Clone, PartialEq)]
pub struct RangeGroup {
    pub range: AddressRange,
    pub deltas: Vec<Delta>,
}

impl RangeGroup {
    /// Range label, or its bounds when unlabeled
    pub fn name(&self) -> String {
        self.range
            .label()
            .map(str::to_string)
            .unwrap_or_else(|| self.range.to_string())
    }
}

/// Changes between two captures, grouped by range.
///
/// Ignored addresses and addresses outside every range are left out and
/// only counted.
#[derive(Debug, Clone)]
pub struct ChangeReport {
    title: Option<String>,
    groups: Vec<RangeGroup>,
    candidates: Vec<(Delta, String)>,
    ignored: usize,
    outside: usize,
    per_range_limit: usize,
    candidate_limit: usize,
}

impl ChangeReport {
    pub fn new(deltas: &[Delta], ranges: &[AddressRange], policy: &ClassificationPolicy) -> Self {
        let mut groups: Vec<RangeGroup> = ranges
            .iter()
            .map(|range| RangeGroup {
                range: range.clone(),
                deltas: Vec::new(),
            })
            .collect();
        let mut candidates = Vec::new();
        let mut ignored = 0;
        let mut outside = 0;

        for delta in deltas {
            let classification = policy.classify(delta);
            if classification == Classification::Ignored {
                ignored += 1;
                continue;
            }

            // Last matching range wins, as for snapshot labels
            let Some(group) = groups
                .iter_mut()
                .rev()
                .find(|g| g.range.contains(delta.address()))
            else {
                outside += 1;
                continue;
            };
            group.deltas.push(*delta);

            if classification.is_prominent() {
                candidates.push((*delta, group.name()));
            }
        }

        groups.retain(|g| !g.deltas.is_empty());

        Self {
            title: None,
            groups,
            candidates,
            ignored,
            outside,
            per_range_limit: PER_RANGE_LIMIT,
            candidate_limit: CANDIDATE_LIMIT,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_limits(mut self, per_range: usize, candidates: usize) -> Self {
        self.per_range_limit = per_range;
        self.candidate_limit = candidates;
        self
    }

    pub fn groups(&self) -> &[RangeGroup] {
        &self.groups
    }

    /// Prominent (`1..=50`) changes with the name of their range
    pub fn candidates(&self) -> &[(Delta, String)] {
        &self.candidates
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.deltas.len()).sum()
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Changes at addresses no range covers
    pub fn outside(&self) -> usize {
        self.outside
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            let _ = writeln!(out, "=== {} ===", title);
        }

        if self.groups.is_empty() {
            let _ = writeln!(out, "No changes found - states might be identical");
            return out;
        }

        for group in &self.groups {
            let name = group.name();
            let _ = writeln!(
                out,
                "{} ({}): {} changes",
                name,
                group.range,
                group.deltas.len()
            );
            for delta in group.deltas.iter().take(self.per_range_limit) {
                let _ = writeln!(out, "  {}", format_line(delta, Some(&name)));
            }
            if group.deltas.len() > self.per_range_limit {
                let _ = writeln!(
                    out,
                    "  ... and {} more changes",
                    group.deltas.len() - self.per_range_limit
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "SUMMARY: {} total changes found", self.total());
        if self.ignored > 0 {
            let _ = writeln!(out, "({} ignored)", self.ignored);
        }
        if self.outside > 0 {
            let _ = writeln!(out, "({} outside the watched ranges)", self.outside);
        }

        if !self.candidates.is_empty() {
            let _ = writeln!(out, "Most likely candidates (small meaningful changes):");
            for (delta, name) in self.candidates.iter().take(self.candidate_limit) {
                let _ = writeln!(out, "  {}", format_line(delta, Some(name)));
            }
        }

        out
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}
