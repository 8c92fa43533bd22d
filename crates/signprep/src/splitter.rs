//! Participant-disjoint splitting with a maximal common label set.
//!
//! A single group-disjoint split may isolate a label in one or two
//! subsets, because all of its samples happen to belong to the same
//! participants. The [Splitter] therefore evaluates many candidate
//! splits, keeps the one whose subsets share the most labels and
//! finally drops all samples with a label outside of that common set.

use std::collections::BTreeSet;

use crate::partition::{Partitioner, SampleIndex};
use crate::prelude::*;
use crate::search::{best_of, draw_seeds};
use crate::verify::{verify, SubsetSummary};

const PBAR_SEARCH: &str =
    "Searching splits: {human_pos}/{human_len} ({percent}%) | \
        elapsed: {elapsed_precise}{msg}";

#[derive(Debug, Clone)]
pub(crate) struct Splitter {
    partitioner: Partitioner,
    trials: usize,
    seed: u64,
    strict: bool,
    quiet: bool,
}

/// The result of [Splitter::split].
#[derive(Debug)]
pub(crate) struct Outcome {
    /// The subset of each input sample; `None` if the sample was
    /// dropped.
    pub(crate) subsets: Vec<Option<Subset>>,

    /// The labels shared by all subsets.
    pub(crate) labels: BTreeSet<String>,

    /// Labels, which occur in too few groups to be part of every
    /// subset.
    pub(crate) ineligible: BTreeSet<String>,

    /// Seed of the winning trial.
    pub(crate) seed: u64,

    pub(crate) summary: [SubsetSummary; 3],
}

impl Splitter {
    pub(crate) fn new(ratios: [f64; 3], trials: usize, seed: u64) -> Self {
        Self {
            partitioner: Partitioner::new(ratios),
            trials,
            seed,
            strict: false,
            quiet: true,
        }
    }

    /// Whether labels occurring in fewer groups than there are subsets
    /// cause an error (`strict`) or are dropped.
    pub(crate) fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    pub(crate) fn quiet(mut self, yes: bool) -> Self {
        self.quiet = yes;
        self
    }

    pub(crate) fn split(&self, samples: &[Sample]) -> SignprepResult<Outcome> {
        let ineligible = self.ineligible_labels(samples)?;
        let positions: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| !ineligible.contains(&sample.label))
            .map(|(pos, _)| pos)
            .collect();

        if positions.is_empty() {
            return Err(SignprepError::Empty(
                "no label occurs in enough groups".into(),
            ));
        }

        let eligible: Vec<Sample> =
            positions.iter().map(|pos| samples[*pos].clone()).collect();
        let index = SampleIndex::new(&eligible);

        log::info!(
            "searching {} candidate split(s) of {} samples, {} groups \
                and {} labels",
            self.trials,
            index.num_samples(),
            index.num_groups(),
            index.num_labels()
        );

        let pbar =
            ProgressBarBuilder::new(PBAR_SEARCH, self.trials as u64, self.quiet)
                .build();

        let seeds = draw_seeds(self.seed, self.trials);
        let best = best_of(
            &seeds,
            |seed| self.partitioner.split(&index, seed),
            |split| split.common_labels(&index).len(),
            pbar,
        )?;

        log::info!(
            "best split: trial {} (seed {}) with {} of {} label(s) in \
                common",
            best.trial,
            best.seed,
            best.score,
            index.num_labels()
        );

        let common = best.candidate.common_labels(&index);
        if common.is_empty() {
            return Err(SignprepError::Empty(
                "no label occurs in all subsets".into(),
            ));
        }

        let mut keep = vec![false; index.num_labels()];
        for label in common.iter() {
            keep[*label] = true;
        }

        let mut subsets = vec![None; samples.len()];
        for (idx, pos) in positions.iter().enumerate() {
            if keep[index.label_of(idx)] {
                subsets[*pos] = Some(best.candidate.subset(idx));
            }
        }

        let summary = verify(samples, &subsets)?;

        Ok(Outcome {
            subsets,
            labels: common
                .into_iter()
                .map(|label| index.label(label).to_string())
                .collect(),
            ineligible,
            seed: best.seed,
            summary,
        })
    }

    fn ineligible_labels(
        &self,
        samples: &[Sample],
    ) -> SignprepResult<BTreeSet<String>> {
        let min_groups = Subset::ALL.len();
        let mut ineligible = BTreeSet::new();

        for (label, groups) in SampleIndex::new(samples).label_groups() {
            if groups >= min_groups {
                continue;
            }

            if self.strict {
                return Err(SignprepError::Infeasible(format!(
                    "label '{label}' occurs in {groups} group(s), at \
                        least {min_groups} required"
                )));
            }

            log::warn!(
                "drop label '{label}': occurs in {groups} group(s) only"
            );
            ineligible.insert(label.to_string());
        }

        Ok(ineligible)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    type TestResult = anyhow::Result<()>;

    /// 100 samples of 20 groups and 10 labels; every label occurs in
    /// 10 different groups.
    fn dataset() -> Vec<Sample> {
        let mut samples = vec![];
        for group in 0..20 {
            for offset in 0..5 {
                let id = group * 5 + offset;
                samples.push(Sample::new(
                    format!("{id}"),
                    format!("GLOSS-{}", (group + 2 * offset) % 10),
                    format!("p{group:02}"),
                ));
            }
        }

        samples
    }

    fn splitter(trials: usize) -> Splitter {
        Splitter::new([0.6, 0.2, 0.2], trials, 1)
    }

    fn assert_consistent(samples: &[Sample], outcome: &Outcome) {
        let mut groups: BTreeMap<&str, Subset> = BTreeMap::new();
        let mut labels: [BTreeSet<&str>; 3] = Default::default();

        for (sample, subset) in samples.iter().zip(outcome.subsets.iter()) {
            if let Some(subset) = subset {
                let first =
                    *groups.entry(sample.group.as_str()).or_insert(*subset);
                assert_eq!(first, *subset);
                labels[subset.index()].insert(sample.label.as_str());
            }
        }

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);

        let expected: BTreeSet<&str> =
            outcome.labels.iter().map(String::as_str).collect();
        assert_eq!(labels[0], expected);
    }

    #[test]
    fn all_labels_survive() -> TestResult {
        let samples = dataset();
        let outcome = splitter(100).split(&samples)?;

        assert_consistent(&samples, &outcome);
        assert_eq!(outcome.labels.len(), 10);
        assert!(outcome.ineligible.is_empty());
        assert!(outcome.subsets.iter().all(Option::is_some));
        Ok(())
    }

    #[test]
    fn label_of_single_group_is_dropped() -> TestResult {
        let mut samples = dataset();
        samples.push(Sample::new("x1", "RARE", "p03"));
        samples.push(Sample::new("x2", "RARE", "p03"));

        let outcome = splitter(100).split(&samples)?;
        assert_consistent(&samples, &outcome);

        assert!(!outcome.labels.contains("RARE"));
        assert!(outcome.ineligible.contains("RARE"));
        assert_eq!(outcome.labels.len(), 10);
        assert_eq!(outcome.subsets[100], None);
        assert_eq!(outcome.subsets[101], None);
        Ok(())
    }

    #[test]
    fn strict_mode_rejects_confined_labels() {
        let mut samples = dataset();
        samples.push(Sample::new("x1", "RARE", "p03"));

        assert!(matches!(
            splitter(10).strict(true).split(&samples),
            Err(SignprepError::Infeasible(msg)) if msg.contains("RARE")
        ));
    }

    #[test]
    fn too_few_groups() {
        let samples = vec![
            Sample::new("1", "A", "p1"),
            Sample::new("2", "A", "p2"),
            Sample::new("3", "B", "p1"),
        ];

        assert!(matches!(
            splitter(10).split(&samples),
            Err(SignprepError::Empty(_))
        ));
        assert!(matches!(
            splitter(10).strict(true).split(&samples),
            Err(SignprepError::Infeasible(_))
        ));
    }

    #[test]
    fn no_label_in_enough_groups() {
        let samples = vec![
            Sample::new("1", "A", "p1"),
            Sample::new("2", "A", "p2"),
            Sample::new("3", "B", "p3"),
            Sample::new("4", "B", "p4"),
            Sample::new("5", "C", "p5"),
        ];

        assert!(matches!(
            splitter(10).split(&samples),
            Err(SignprepError::Empty(_))
        ));
    }

    #[test]
    fn labels_of_exactly_three_groups_survive() -> TestResult {
        // label l occurs in the groups l, l + 7 and l + 14 (mod 20)
        let mut labels: Vec<Vec<usize>> = vec![vec![]; 20];
        for label in 0..10 {
            for group in [label, label + 7, (label + 14) % 20] {
                labels[group].push(label);
            }
        }

        let mut samples = vec![];
        for (group, glosses) in labels.iter().enumerate() {
            for offset in 0..5 {
                samples.push(Sample::new(
                    format!("{group}-{offset}"),
                    format!("GLOSS-{}", glosses[offset % glosses.len()]),
                    format!("p{group:02}"),
                ));
            }
        }

        assert_eq!(samples.len(), 100);

        for seed in 0..3 {
            let outcome =
                Splitter::new([0.6, 0.2, 0.2], 200, seed).split(&samples)?;
            assert_consistent(&samples, &outcome);
            assert_eq!(outcome.labels.len(), 10);
            assert!(outcome.subsets.iter().all(Option::is_some));
        }

        Ok(())
    }

    #[test]
    fn deterministic() -> TestResult {
        let samples = dataset();
        let lhs = splitter(50).split(&samples)?;
        let rhs = splitter(50).split(&samples)?;

        assert_eq!(lhs.subsets, rhs.subsets);
        assert_eq!(lhs.labels, rhs.labels);
        assert_eq!(lhs.seed, rhs.seed);
        Ok(())
    }

    #[test]
    fn independent_of_thread_count() -> TestResult {
        let samples = dataset();
        let expected = splitter(50).split(&samples)?;

        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build()?;
        let actual = pool.install(|| splitter(50).split(&samples))?;

        assert_eq!(expected.subsets, actual.subsets);
        Ok(())
    }
}
