//! Stable grouping of items by type tag

use crate::extract::TypeAccessor;
use std::collections::HashMap;
use typebalancer_common::{Error, Result};

/// Items bucketed by type, in type priority order.
///
/// Only types with at least one item are kept. Within a group, items keep
/// their input order.
#[derive(Debug)]
pub struct TypeGroups<T> {
    names: Vec<String>,
    groups: Vec<Vec<T>>,
}

impl<T> TypeGroups<T> {
    /// Group `items` by the tag `accessor` resolves.
    ///
    /// With `type_order`, types are ranked by their position in that list and
    /// an item whose type is not listed is rejected. Without it, types are
    /// ranked by first appearance.
    ///
    /// # Errors
    /// `MissingType` if a tag cannot be resolved or is blank; `UnknownType`
    /// if a tag is not in `type_order`.
    pub fn build<A>(items: Vec<T>, accessor: &A, type_order: Option<&[String]>) -> Result<Self>
    where
        A: TypeAccessor<T> + ?Sized,
    {
        let mut names: Vec<String> = type_order.map(<[String]>::to_vec).unwrap_or_default();
        let mut rank: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let mut groups: Vec<Vec<T>> = names.iter().map(|_| Vec::new()).collect();

        for (index, item) in items.into_iter().enumerate() {
            let type_name = accessor.type_of(&item).map_err(|e| e.offset_index(index))?;
            if type_name.trim().is_empty() {
                return Err(Error::missing_type(index, "type value is blank"));
            }

            let slot = match rank.get(&type_name) {
                Some(&slot) => slot,
                None if type_order.is_some() => {
                    return Err(Error::unknown_type(index, type_name));
                }
                None => {
                    let slot = names.len();
                    rank.insert(type_name.clone(), slot);
                    names.push(type_name);
                    groups.push(Vec::new());
                    slot
                }
            };
            groups[slot].push(item);
        }

        let (names, groups) = names
            .into_iter()
            .zip(groups)
            .filter(|(_, group)| !group.is_empty())
            .unzip();

        Ok(Self { names, groups })
    }

    /// Number of non-empty types
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.names.len()
    }

    /// Total number of items across all types
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Whether no items were grouped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Type names in priority order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Item count per type, aligned with [`names`](Self::names)
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// Lay the items out by type index.
    ///
    /// `layout[i]` is the type index of the item at output position `i`.
    /// Each type's items are consumed in input order; a position naming a
    /// type with no items left is skipped.
    #[must_use]
    pub fn arrange(self, layout: &[usize]) -> Vec<T> {
        let mut queues: Vec<std::vec::IntoIter<T>> =
            self.groups.into_iter().map(Vec::into_iter).collect();
        layout
            .iter()
            .filter_map(|&type_idx| queues.get_mut(type_idx).and_then(Iterator::next))
            .collect()
    }

    /// Take the groups, aligned with the names
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<T>>) {
        (self.names, self.groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_prefix(item: &&str) -> Result<String> {
        item.split(':')
            .next()
            .map(str::to_string)
            .ok_or_else(|| Error::missing_type(0, "no prefix"))
    }

    #[test]
    fn test_first_seen_order() {
        let items = vec!["image:1", "video:1", "image:2", "article:1", "video:2"];
        let groups = TypeGroups::build(items, &by_prefix, None).unwrap();

        assert_eq!(groups.names(), &["image", "video", "article"]);
        assert_eq!(groups.counts(), vec![2, 2, 1]);
        assert_eq!(groups.item_count(), 5);

        let (_, parts) = groups.into_parts();
        assert_eq!(parts[0], vec!["image:1", "image:2"]);
    }

    #[test]
    fn test_explicit_order_skips_absent_types() {
        let order = vec!["article".to_string(), "video".to_string(), "image".to_string()];
        let items = vec!["image:1", "video:1"];
        let groups = TypeGroups::build(items, &by_prefix, Some(order.as_slice())).unwrap();

        assert_eq!(groups.names(), &["video", "image"]);
        assert_eq!(groups.type_count(), 2);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let order = vec!["video".to_string()];
        let items = vec!["video:1", "podcast:1"];
        let err = TypeGroups::build(items, &by_prefix, Some(order.as_slice())).unwrap_err();

        assert_eq!(err, Error::unknown_type(1, "podcast"));
    }

    #[test]
    fn test_missing_and_blank_types_rejected() {
        let items = vec!["video:1", "video:2", ":3"];
        let err = TypeGroups::build(items, &by_prefix, None).unwrap_err();
        assert!(matches!(err, Error::MissingType { index: 2, .. }));

        let failing = |item: &&str| -> Result<String> {
            if item.contains(':') {
                Ok("video".to_string())
            } else {
                Err(Error::missing_type(0, "no separator"))
            }
        };
        let err = TypeGroups::build(vec!["a:1", "b"], &failing, None).unwrap_err();
        assert_eq!(err, Error::missing_type(1, "no separator"));
    }

    #[test]
    fn test_arrange_keeps_intra_type_order() {
        let items = vec!["video:1", "image:1", "video:2", "video:3"];
        let groups = TypeGroups::build(items, &by_prefix, None).unwrap();

        let arranged = groups.arrange(&[0, 0, 1, 0, 1]);
        assert_eq!(arranged, vec!["video:1", "video:2", "image:1", "video:3"]);
    }

    #[test]
    fn test_empty_input() {
        let groups = TypeGroups::build(Vec::<&str>::new(), &by_prefix, None).unwrap();
        assert!(groups.is_empty());
        assert_eq!(groups.item_count(), 0);
    }
}
