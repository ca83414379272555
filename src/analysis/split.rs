/// Stratified, seeded train/test split.
///
/// Sizes: `n_test = ceil(test_ratio * n)`, `n_train = n - n_test`.
///
/// Per-class allocation of the test slots is proportional to class size:
/// each class first gets the floor of its exact share, then the leftover
/// slots go to the classes with the largest fractional remainders (lower
/// label first on equal remainders). Row choice within a class and the
/// final order of each partition come from a `StdRng` seeded with `seed`,
/// so the same labels and seed always give the same split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Ordering;

use crate::model::{ClassLabel, PipelineError, class_counts};

/// Row positions of the two partitions, relative to the input labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits row positions into train and test partitions, preserving class
/// proportions.
///
/// # Errors
/// `InvalidParameter` when the ratio is outside (0, 1), any class has fewer
/// than two rows, or either partition would be smaller than the number of
/// classes.
pub fn stratified_split(
    labels: &[ClassLabel],
    test_ratio: f64,
    seed: u64,
) -> Result<SplitIndices, PipelineError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test_ratio must be strictly between 0 and 1, got {}",
            test_ratio
        )));
    }

    let n = labels.len();
    let counts = class_counts(labels);

    if let Some((label, count)) = counts.iter().find(|(_, count)| *count < 2) {
        return Err(PipelineError::InvalidParameter(format!(
            "class {} has only {} member(s); stratified splitting needs at least 2 per class",
            label, count
        )));
    }

    let n_test = (test_ratio * n as f64).ceil() as usize;
    let n_train = n - n_test;
    let n_classes = counts.len();

    if n_test < n_classes || n_train < n_classes {
        return Err(PipelineError::InvalidParameter(format!(
            "a {}/{} split of {} rows cannot hold all {} classes in both partitions",
            n_train, n_test, n, n_classes
        )));
    }

    let test_allocation = allocate_test_slots(&counts, n, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);

    for ((label, _), n_class_test) in counts.iter().zip(test_allocation) {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| *l == label)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        test.extend_from_slice(&members[..n_class_test]);
        train.extend_from_slice(&members[n_class_test..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

/// Test slots per class, in the order of `counts` (ascending label).
fn allocate_test_slots(counts: &[(ClassLabel, usize)], n: usize, n_test: usize) -> Vec<usize> {
    let exact: Vec<f64> = counts
        .iter()
        .map(|(_, count)| *count as f64 * n_test as f64 / n as f64)
        .collect();

    let mut allocation: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let assigned: usize = allocation.iter().sum();

    let mut by_remainder: Vec<usize> = (0..counts.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(Ordering::Equal).then(a.cmp(&b))
    });

    for &class_idx in by_remainder.iter().take(n_test.saturating_sub(assigned)) {
        allocation[class_idx] += 1;
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_200() -> Vec<ClassLabel> {
        // 70 low, 64 medium, 66 high, interleaved
        let mut labels = Vec::new();
        labels.extend(std::iter::repeat(0).take(70));
        labels.extend(std::iter::repeat(1).take(64));
        labels.extend(std::iter::repeat(2).take(66));
        labels.rotate_left(37);
        labels
    }

    #[test]
    fn test_split_sizes_70_30() {
        let split = stratified_split(&labels_200(), 0.3, 42).unwrap();
        assert_eq!(split.test.len(), 60);
        assert_eq!(split.train.len(), 140);
    }

    #[test]
    fn test_partitions_are_disjoint_and_cover_all_rows() {
        let split = stratified_split(&labels_200(), 0.3, 42).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_class_proportions_preserved() {
        let labels = labels_200();
        let split = stratified_split(&labels, 0.3, 42).unwrap();
        let test_labels: Vec<ClassLabel> = split.test.iter().map(|&i| labels[i]).collect();
        let counts = class_counts(&test_labels);

        // Exact shares: 21.0, 19.2, 19.8
        assert_eq!(counts, vec![(0, 21), (1, 19), (2, 20)]);
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels = labels_200();
        let a = stratified_split(&labels, 0.3, 42).unwrap();
        let b = stratified_split(&labels, 0.3, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_split() {
        let labels = labels_200();
        let a = stratified_split(&labels, 0.3, 42).unwrap();
        let b = stratified_split(&labels, 0.3, 43).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_singleton_class_rejected() {
        let labels = vec![0, 0, 0, 1, 1, 1, 2];
        assert!(matches!(
            stratified_split(&labels, 0.3, 42),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_too_small_test_partition_rejected() {
        // ceil(0.1 * 6) = 1 test row for 3 classes
        let labels = vec![0, 0, 1, 1, 2, 2];
        assert!(matches!(
            stratified_split(&labels, 0.1, 42),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ratio_out_of_range_rejected() {
        assert!(stratified_split(&labels_200(), 0.0, 42).is_err());
        assert!(stratified_split(&labels_200(), 1.0, 42).is_err());
    }

    #[test]
    fn test_allocation_largest_remainder() {
        let counts = vec![(0, 70), (1, 64), (2, 66)];
        assert_eq!(allocate_test_slots(&counts, 200, 60), vec![21, 19, 20]);
    }
}
