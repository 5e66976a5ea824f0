//! FILENAME: core/pivot-engine/src/axis.rs
//! Axis Builder - partitions records into a tree of named buckets.
//!
//! Buckets are evaluated independently against the whole scope, so they may
//! overlap or leave records out. Nodes hold index views into the caller's
//! record slice rather than copies; cells intersect those views.

use crate::definition::CustomBucket;
use crate::filter;
use crate::record::Record;

/// Label of the synthetic node used when an axis has no buckets.
pub const TOTAL_LABEL: &str = "Total";

/// Separator between nested keys, and between a column key and a metric id.
pub const KEY_SEPARATOR: &str = "||";

// ============================================================================
// RECORD SET
// ============================================================================

/// An ascending list of record indices into the source slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    indices: Vec<usize>,
}

impl RecordSet {
    /// Every index of a slice of `len` records.
    pub fn all(len: usize) -> Self {
        RecordSet {
            indices: (0..len).collect(),
        }
    }

    /// Builds a set from indices already in ascending order.
    pub fn from_sorted(indices: Vec<usize>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        RecordSet { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Records present in both sets, by identity (index), via a linear merge.
    pub fn intersect(&self, other: &RecordSet) -> RecordSet {
        let (a, b) = (&self.indices, &other.indices);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        RecordSet { indices: out }
    }

    /// Keeps the indices whose record satisfies `pred`.
    pub fn filter<F>(&self, source: &[Record], mut pred: F) -> RecordSet
    where
        F: FnMut(&Record) -> bool,
    {
        RecordSet {
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| source.get(i).is_some_and(&mut pred))
                .collect(),
        }
    }

    /// Resolves the view against the slice it was built from.
    pub fn records<'a>(&'a self, source: &'a [Record]) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices.iter().filter_map(move |&i| source.get(i))
    }
}

// ============================================================================
// AXIS TREE STRUCTURES
// ============================================================================

/// Which dimension an axis is built for. Only affects the synthetic key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Rows,
    Columns,
}

impl AxisKind {
    pub fn total_key(&self) -> &'static str {
        match self {
            AxisKind::Rows => "total_row",
            AxisKind::Columns => "total_col",
        }
    }
}

/// A node in the axis tree (row or column hierarchy).
#[derive(Debug, Clone)]
pub struct AxisNode {
    pub key: String,
    pub label: String,
    /// The records this node owns.
    pub records: RecordSet,
    /// Child nodes (next level of grouping). Empty for leaves.
    pub children: Vec<AxisNode>,
}

impl AxisNode {
    pub fn leaf(key: impl Into<String>, label: impl Into<String>, records: RecordSet) -> Self {
        AxisNode {
            key: key.into(),
            label: label.into(),
            records,
            children: Vec::new(),
        }
    }

    /// Creates the "Total" node used when an axis has no buckets.
    fn total(kind: AxisKind, records: RecordSet) -> Self {
        AxisNode::leaf(kind.total_key(), TOTAL_LABEL, records)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A leaf of an axis tree in depth-first order, with its full key.
#[derive(Debug, Clone)]
pub struct FlatAxisItem<'a> {
    /// Node keys from the root down, joined with `||`.
    pub key: String,
    pub label: &'a str,
    pub records: &'a RecordSet,
}

// ============================================================================
// BUILDING
// ============================================================================

/// Builds one axis: a node per bucket (in configured order), each holding the
/// records of `scope` that satisfy the bucket. Never returns an empty axis.
pub fn build_axis(
    records: &[Record],
    scope: &RecordSet,
    buckets: &[CustomBucket],
    kind: AxisKind,
) -> Vec<AxisNode> {
    if buckets.is_empty() {
        return vec![AxisNode::total(kind, scope.clone())];
    }

    buckets
        .iter()
        .map(|bucket| {
            let members = scope.filter(records, |record| filter::matches(record, bucket));
            log::trace!(
                "{:?} bucket '{}' matched {} of {} records",
                kind,
                bucket.id,
                members.len(),
                scope.len()
            );
            AxisNode::leaf(bucket.id.clone(), bucket.label.clone(), members)
        })
        .collect()
}

/// Flattens an axis to its leaves, depth-first, left-to-right.
pub fn flatten_leaves(nodes: &[AxisNode]) -> Vec<FlatAxisItem<'_>> {
    let mut out = Vec::new();
    collect_leaves(nodes, None, &mut out);
    out
}

fn collect_leaves<'a>(nodes: &'a [AxisNode], parent_key: Option<&str>, out: &mut Vec<FlatAxisItem<'a>>) {
    for node in nodes {
        let key = match parent_key {
            Some(parent) => format!("{}{}{}", parent, KEY_SEPARATOR, node.key),
            None => node.key.clone(),
        };
        if node.is_leaf() {
            out.push(FlatAxisItem {
                key,
                label: &node.label,
                records: &node.records,
            });
        } else {
            collect_leaves(&node.children, Some(&key), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FilterCondition;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("region", "east").with("amt", 10.0),
            Record::new().with("region", "east").with("amt", 50.0),
            Record::new().with("region", "west").with("amt", 70.0),
            Record::new().with("region", "north").with("amt", 5.0),
        ]
    }

    #[test]
    fn test_intersect() {
        let a = RecordSet::from_sorted(vec![0, 2, 3, 7]);
        let b = RecordSet::from_sorted(vec![1, 2, 7, 9]);
        assert_eq!(a.intersect(&b).indices(), &[2, 7]);
        assert!(a.intersect(&RecordSet::default()).is_empty());
    }

    #[test]
    fn test_empty_bucket_list_yields_total() {
        let data = records();
        let scope = RecordSet::all(data.len());
        let rows = build_axis(&data, &scope, &[], AxisKind::Rows);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "total_row");
        assert_eq!(rows[0].label, "Total");
        assert_eq!(rows[0].records.len(), 4);

        let cols = build_axis(&data, &scope, &[], AxisKind::Columns);
        assert_eq!(cols[0].key, "total_col");
    }

    #[test]
    fn test_buckets_overlap_and_keep_order() {
        let data = records();
        let scope = RecordSet::all(data.len());
        let buckets = vec![
            CustomBucket::new("east", "East")
                .with_filter(FilterCondition::is_in("region", ["east"])),
            CustomBucket::new("big", "Big").with_filter(FilterCondition::between("amt", 40.0, 100.0)),
            CustomBucket::new("south", "South")
                .with_filter(FilterCondition::is_in("region", ["south"])),
        ];
        let nodes = build_axis(&data, &scope, &buckets, AxisKind::Rows);

        let keys: Vec<&str> = nodes.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["east", "big", "south"]);
        assert_eq!(nodes[0].records.indices(), &[0, 1]);
        // Record 1 belongs to both "east" and "big".
        assert_eq!(nodes[1].records.indices(), &[1, 2]);
        // A bucket may match nothing; it still appears.
        assert!(nodes[2].records.is_empty());
    }

    #[test]
    fn test_build_respects_scope() {
        let data = records();
        let scope = RecordSet::from_sorted(vec![1, 3]);
        let nodes = build_axis(&data, &scope, &[CustomBucket::new("all", "All")], AxisKind::Columns);
        assert_eq!(nodes[0].records.indices(), &[1, 3]);
    }

    #[test]
    fn test_flatten_nested_keys() {
        let mut parent = AxisNode::leaf("2024", "2024", RecordSet::default());
        parent.children.push(AxisNode::leaf("q1", "Q1", RecordSet::from_sorted(vec![0])));
        parent.children.push(AxisNode::leaf("q2", "Q2", RecordSet::from_sorted(vec![1])));
        let tree = vec![parent, AxisNode::leaf("other", "Other", RecordSet::default())];

        let flat = flatten_leaves(&tree);
        let keys: Vec<&str> = flat.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["2024||q1", "2024||q2", "other"]);
        assert_eq!(flat[1].label, "Q2");
    }
}
