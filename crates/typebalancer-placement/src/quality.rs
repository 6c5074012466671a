//! Distribution quality report for a balanced sequence

use crate::extract::TypeAccessor;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use typebalancer_common::Result;

/// Statistics for one type
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    /// Type tag
    pub type_name: String,
    /// Number of items
    pub count: usize,
    /// Index of the first item of this type
    pub first_index: usize,
    /// Largest index distance between two consecutive items of this type
    pub max_gap: usize,
}

/// How evenly types are spread over a sequence
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionReport {
    /// Sequence length
    pub total: usize,
    /// Per-type statistics in order of first appearance
    pub types: Vec<TypeStats>,
    /// Length of the longest run of a single type
    pub longest_run: usize,
    /// Type of that run
    pub longest_run_type: Option<String>,
    /// Window size used for the diversity figure
    pub window_size: usize,
    /// Fewest distinct types in any full, aligned window; `None` when the
    /// sequence is shorter than one window
    pub min_window_diversity: Option<usize>,
}

impl DistributionReport {
    /// Analyze a sequence of type tags
    #[must_use]
    pub fn analyze<S: AsRef<str>>(types: &[S], window_size: usize) -> Self {
        let mut stats: Vec<TypeStats> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        let mut last_seen: Vec<usize> = Vec::new();

        let mut longest_run = 0;
        let mut longest_run_type = None;
        let mut run = 0;

        for (index, name) in types.iter().map(AsRef::as_ref).enumerate() {
            match slot.get(name) {
                Some(&i) => {
                    stats[i].count += 1;
                    stats[i].max_gap = stats[i].max_gap.max(index - last_seen[i]);
                    last_seen[i] = index;
                }
                None => {
                    slot.insert(name, stats.len());
                    stats.push(TypeStats {
                        type_name: name.to_string(),
                        count: 1,
                        first_index: index,
                        max_gap: 0,
                    });
                    last_seen.push(index);
                }
            }

            run = if index > 0 && types[index - 1].as_ref() == name {
                run + 1
            } else {
                1
            };
            if run > longest_run {
                longest_run = run;
                longest_run_type = Some(name.to_string());
            }
        }

        let min_window_diversity = if window_size == 0 {
            None
        } else {
            types
                .chunks_exact(window_size)
                .map(|window| window.iter().map(AsRef::as_ref).collect::<HashSet<&str>>().len())
                .min()
        };

        Self {
            total: types.len(),
            types: stats,
            longest_run,
            longest_run_type,
            window_size,
            min_window_diversity,
        }
    }

    /// Resolve every item's tag with `accessor`, then analyze
    ///
    /// # Errors
    /// `MissingType` with the index of the first unresolvable item.
    pub fn from_items<T, A>(items: &[T], accessor: &A, window_size: usize) -> Result<Self>
    where
        A: TypeAccessor<T> + ?Sized,
    {
        let types = items
            .iter()
            .enumerate()
            .map(|(index, item)| accessor.type_of(item).map_err(|e| e.offset_index(index)))
            .collect::<Result<Vec<String>>>()?;
        Ok(Self::analyze(&types, window_size))
    }

    /// Statistics for `type_name`
    #[must_use]
    pub fn type_stats(&self, type_name: &str) -> Option<&TypeStats> {
        self.types.iter().find(|s| s.type_name == type_name)
    }
}
