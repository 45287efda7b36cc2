//! Collapse join rows that repeat a parent key.
//!
//! A shop in three categories comes back from the join as three rows. The
//! listing wants one entry per shop with the categories gathered up, in the
//! order they were first seen.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// A joined row with a parent key and one repeated sub-field.
pub trait Mergeable {
    type Key: Eq + Hash;
    type Value: PartialEq;

    /// Parent identity shared by duplicate rows.
    fn key(&self) -> Self::Key;

    /// Move the repeated sub-field out of the row. `None` contributes nothing.
    fn take_value(&mut self) -> Option<Self::Value>;
}

/// First row seen for a key, with the de-duplicated sub-field values.
#[derive(Debug)]
pub struct Merged<R: Mergeable> {
    pub row: R,
    pub values: Vec<R::Value>,
}

/// Group rows by key, keeping first-seen order of both keys and values.
pub fn merge_duplicates<R, I>(rows: I) -> Vec<Merged<R>>
where
    R: Mergeable,
    I: IntoIterator<Item = R>,
{
    let mut index: HashMap<R::Key, usize> = HashMap::new();
    let mut merged: Vec<Merged<R>> = Vec::new();

    for mut row in rows {
        let value = row.take_value();
        let slot = match index.entry(row.key()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                merged.push(Merged {
                    row,
                    values: Vec::new(),
                });
                *entry.insert(merged.len() - 1)
            }
        };

        if let Some(value) = value {
            let values = &mut merged[slot].values;
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    merged
}
