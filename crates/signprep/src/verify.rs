use std::collections::{BTreeMap, BTreeSet};

use crate::prelude::*;

/// Key figures of a subset of a verified split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubsetSummary {
    pub(crate) subset: Subset,
    pub(crate) samples: usize,
    pub(crate) groups: usize,
    pub(crate) labels: usize,
}

/// Checks the invariants of a split:
///
/// 1. every subset contains at least one sample,
/// 2. no group occurs in more than one subset, and
/// 3. the label sets of all subsets are identical.
///
/// Samples without a subset (`None`) are not part of the split and are
/// ignored.
pub(crate) fn verify(
    samples: &[Sample],
    subsets: &[Option<Subset>],
) -> SignprepResult<[SubsetSummary; 3]> {
    if samples.len() != subsets.len() {
        return Err(SignprepError::Invariant(format!(
            "{} samples, but {} subset assignments",
            samples.len(),
            subsets.len()
        )));
    }

    let mut group_subset: BTreeMap<&str, Subset> = BTreeMap::new();
    let mut counts = [0usize; 3];
    let mut groups: [BTreeSet<&str>; 3] = Default::default();
    let mut labels: [BTreeSet<&str>; 3] = Default::default();

    for (sample, subset) in samples.iter().zip(subsets.iter()) {
        let Some(subset) = subset else {
            continue;
        };

        let group = sample.group.as_str();
        let first = *group_subset.entry(group).or_insert(*subset);
        if first != *subset {
            return Err(SignprepError::Invariant(format!(
                "group '{group}' occurs in {first} and {subset} \
                    (sample '{}')",
                sample.id
            )));
        }

        let idx = subset.index();
        counts[idx] += 1;
        groups[idx].insert(group);
        labels[idx].insert(sample.label.as_str());
    }

    for subset in Subset::ALL {
        if counts[subset.index()] == 0 {
            return Err(SignprepError::Invariant(format!(
                "subset {subset} is empty"
            )));
        }
    }

    let union: BTreeSet<&str> = labels.iter().flatten().copied().collect();
    for subset in Subset::ALL {
        let missing: Vec<_> =
            union.difference(&labels[subset.index()]).collect();

        if !missing.is_empty() {
            return Err(SignprepError::Invariant(format!(
                "label set of {subset} differs from the other subsets \
                    (missing {} label(s), e.g. '{}')",
                missing.len(),
                missing[0]
            )));
        }
    }

    Ok(Subset::ALL.map(|subset| {
        let idx = subset.index();
        SubsetSummary {
            subset,
            samples: counts[idx],
            groups: groups[idx].len(),
            labels: labels[idx].len(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    use Subset::*;

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new("1", "A", "p1"),
            Sample::new("2", "B", "p1"),
            Sample::new("3", "A", "p2"),
            Sample::new("4", "B", "p2"),
            Sample::new("5", "A", "p3"),
            Sample::new("6", "B", "p3"),
            Sample::new("7", "C", "p3"),
        ]
    }

    #[test]
    fn verify_ok() -> TestResult {
        let subsets = [
            Some(Train),
            Some(Train),
            Some(Val),
            Some(Val),
            Some(Test),
            Some(Test),
            None,
        ];

        let summary = verify(&samples(), &subsets)?;
        assert_eq!(
            summary[2],
            SubsetSummary {
                subset: Test,
                samples: 2,
                groups: 1,
                labels: 2
            }
        );
        Ok(())
    }

    #[test]
    fn verify_group_leakage() {
        let subsets = [
            Some(Train),
            Some(Val),
            Some(Val),
            Some(Val),
            Some(Test),
            Some(Test),
            None,
        ];

        assert!(matches!(
            verify(&samples(), &subsets),
            Err(SignprepError::Invariant(msg)) if msg.contains("'p1'")
        ));
    }

    #[test]
    fn verify_label_mismatch() {
        let subsets = [
            Some(Train),
            Some(Train),
            Some(Val),
            Some(Val),
            Some(Test),
            Some(Test),
            Some(Test),
        ];

        assert!(matches!(
            verify(&samples(), &subsets),
            Err(SignprepError::Invariant(msg)) if msg.contains("'C'")
        ));
    }

    #[test]
    fn verify_empty_subset() {
        let subsets = [
            Some(Train),
            Some(Train),
            Some(Val),
            Some(Val),
            None,
            None,
            None,
        ];

        assert!(verify(&samples(), &subsets).is_err());
    }
}
