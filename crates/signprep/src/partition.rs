//! Group-disjoint partitioning of samples into train, val and test.
//!
//! Groups (participants) are the unit of assignment: all samples of a
//! group end up in the same subset. Groups are visited in a random
//! order (determined by the seed) and each group is placed into the
//! subset which loses the fewest labels for the other subsets. Among
//! those, the subset keeping the label distribution and the subset
//! sizes closest to the target ratios wins. Balance is best effort
//! only, the disjointness of groups is exact.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_stats::DeviationExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::prelude::*;

/// Dense integer view of a sample set.
#[derive(Debug)]
pub(crate) struct SampleIndex<'a> {
    groups: Vec<&'a str>,
    labels: Vec<&'a str>,
    group_of: Vec<usize>,
    label_of: Vec<usize>,

    /// Number of samples per group (rows) and label (columns).
    counts: Array2<f64>,
}

impl<'a> SampleIndex<'a> {
    pub(crate) fn new(samples: &'a [Sample]) -> Self {
        let mut groups = BTreeMap::new();
        let mut labels = BTreeMap::new();

        for sample in samples.iter() {
            groups.insert(sample.group.as_str(), 0);
            labels.insert(sample.label.as_str(), 0);
        }

        for (idx, value) in groups.values_mut().enumerate() {
            *value = idx;
        }

        for (idx, value) in labels.values_mut().enumerate() {
            *value = idx;
        }

        let mut counts = Array2::zeros((groups.len(), labels.len()));
        let mut group_of = Vec::with_capacity(samples.len());
        let mut label_of = Vec::with_capacity(samples.len());

        for sample in samples.iter() {
            let g = groups[sample.group.as_str()];
            let l = labels[sample.label.as_str()];

            counts[[g, l]] += 1.0;
            group_of.push(g);
            label_of.push(l);
        }

        Self {
            groups: groups.into_keys().collect(),
            labels: labels.into_keys().collect(),
            group_of,
            label_of,
            counts,
        }
    }

    #[inline]
    pub(crate) fn num_samples(&self) -> usize {
        self.group_of.len()
    }

    #[inline]
    pub(crate) fn num_groups(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub(crate) fn num_labels(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub(crate) fn label(&self, idx: usize) -> &'a str {
        self.labels[idx]
    }

    #[inline]
    pub(crate) fn label_of(&self, sample: usize) -> usize {
        self.label_of[sample]
    }

    /// Returns the number of distinct groups each label occurs in.
    pub(crate) fn label_groups(&self) -> Vec<(&'a str, usize)> {
        self.counts
            .axis_iter(Axis(1))
            .zip(self.labels.iter())
            .map(|(column, label)| {
                (*label, column.iter().filter(|cnt| **cnt > 0.0).count())
            })
            .collect()
    }
}

/// The subset assignment of every sample of a [SampleIndex].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Split {
    subsets: Vec<Subset>,
    num_labels: usize,
}

impl Split {
    /// Returns the subset of the sample at position `sample`.
    #[inline]
    pub(crate) fn subset(&self, sample: usize) -> Subset {
        self.subsets[sample]
    }

    /// Returns the (sorted) ids of the labels occurring in all subsets.
    pub(crate) fn common_labels(&self, index: &SampleIndex) -> Vec<usize> {
        let mut presence = vec![[false; 3]; self.num_labels];
        for (sample, subset) in self.subsets.iter().enumerate() {
            presence[index.label_of(sample)][subset.index()] = true;
        }

        presence
            .iter()
            .enumerate()
            .filter(|(_, present)| present.iter().all(|p| *p))
            .map(|(label, _)| label)
            .collect()
    }
}

/// Assigns whole groups to subsets according to target ratios.
#[derive(Debug, Clone)]
pub(crate) struct Partitioner {
    ratios: [f64; 3],
}

impl Partitioner {
    /// Creates a new partitioner. The ratios are given in the order of
    /// [Subset::ALL].
    pub(crate) fn new(ratios: [f64; 3]) -> Self {
        Self { ratios }
    }

    /// Computes a group-disjoint split of the indexed samples.
    ///
    /// The function fails, if there are fewer groups than subsets.
    pub(crate) fn split(
        &self,
        index: &SampleIndex,
        seed: u64,
    ) -> SignprepResult<Split> {
        let num_subsets = Subset::ALL.len();
        let num_groups = index.num_groups();

        if num_groups < num_subsets {
            return Err(SignprepError::Infeasible(format!(
                "{num_groups} distinct group(s), at least {num_subsets} \
                    required"
            )));
        }

        let mut order: Vec<usize> = (0..num_groups).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let totals = index.counts.sum_axis(Axis(0));
        let total = totals.sum();

        let mut assigned =
            Array2::<f64>::zeros((num_subsets, index.num_labels()));
        let mut groups_per_subset = [0usize; 3];
        let mut group_subset = vec![Subset::Train; num_groups];
        let mut unassigned: Vec<usize> =
            index.label_groups().iter().map(|(_, cnt)| *cnt).collect();

        for (pos, &group) in order.iter().enumerate() {
            let row = index.counts.row(group);
            let remaining = num_groups - pos;
            let empty: Vec<usize> = (0..num_subsets)
                .filter(|idx| groups_per_subset[*idx] == 0)
                .collect();

            // Every subset must receive at least one group.
            let target = if !empty.is_empty() && remaining <= empty.len() {
                empty[0]
            } else {
                (0..num_subsets)
                    .map(|idx| {
                        let lost =
                            lost_labels(&assigned, idx, row, &unassigned);
                        let cost =
                            self.cost(&assigned, idx, row, &totals, total);
                        (idx, (lost, cost))
                    })
                    .fold(None, |best: Option<(usize, (usize, f64))>, next| {
                        match best {
                            Some((_, min)) if min <= next.1 => best,
                            _ => Some(next),
                        }
                    })
                    .map(|(idx, _)| idx)
                    .unwrap_or(0)
            };

            let mut counts = assigned.row_mut(target);
            counts += &row;

            for (label, cnt) in row.iter().enumerate() {
                if *cnt > 0.0 {
                    unassigned[label] -= 1;
                }
            }

            groups_per_subset[target] += 1;
            group_subset[group] = Subset::ALL[target];
        }

        Ok(Split {
            subsets: index
                .group_of
                .iter()
                .map(|group| group_subset[*group])
                .collect(),
            num_labels: index.num_labels(),
        })
    }

    /// Deviation from the target ratios, if the group with the label
    /// counts `row` is added to the subset `target`.
    fn cost(
        &self,
        assigned: &Array2<f64>,
        target: usize,
        row: ArrayView1<f64>,
        totals: &Array1<f64>,
        total: f64,
    ) -> f64 {
        self.ratios
            .iter()
            .enumerate()
            .map(|(idx, ratio)| {
                let mut counts = assigned.row(idx).to_owned();
                if idx == target {
                    counts += &row;
                }

                let size = counts.sum() / total;
                let fractions = counts / totals;
                let expected = Array1::from_elem(fractions.len(), *ratio);
                let deviation =
                    fractions.l2_dist(&expected).unwrap_or(f64::INFINITY);

                deviation + (size - ratio).abs()
            })
            .sum()
    }
}

/// Number of labels of the group `row`, which can no longer occur in
/// every subset, if the group is added to the subset `target`. A label
/// is lost once fewer of its groups are left than subsets lacking it.
fn lost_labels(
    assigned: &Array2<f64>,
    target: usize,
    row: ArrayView1<f64>,
    unassigned: &[usize],
) -> usize {
    row.iter()
        .enumerate()
        .filter(|(_, cnt)| **cnt > 0.0)
        .filter(|(label, _)| {
            let missing = assigned
                .column(*label)
                .iter()
                .enumerate()
                .filter(|(idx, cnt)| *idx != target && **cnt == 0.0)
                .count();

            unassigned[*label] - 1 < missing
        })
        .count()
}
