// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Structural fingerprints of class and struct types and their comparison.
//!
//! A [`TypeStamp`] lists the inheritance chain of a type, most derived class
//! first, and for every class its non-transient fields in declaration order.
//! Stamps travel in the stream next to the type they describe so a reader
//! can compare the layout the bytes were written with against the layout of
//! its own version of the type.

use crate::meta::TypeDescriptor;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldStamp {
    pub name: String,
    pub field_type: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassStamp {
    pub name: String,
    pub module: String,
    pub fields: Vec<FieldStamp>,
}

impl ClassStamp {
    fn same_shape(&self, other: &ClassStamp) -> bool {
        self.fields == other.fields
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeStamp {
    classes: Vec<ClassStamp>,
}

/// A field located in a particular class of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldLocation {
    pub class: String,
    pub name: String,
    pub field_type: TypeDescriptor,
}

/// Differences between the stamp a stream was written with and the stamp of
/// the running type.
///
/// Class lists are ordered root-most first. Pairs are `(previous, current)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StampDiff {
    pub classes_added: Vec<String>,
    pub classes_removed: Vec<String>,
    pub classes_renamed: Vec<(String, String)>,
    pub fields_added: Vec<FieldLocation>,
    pub fields_removed: Vec<FieldLocation>,
    pub fields_moved: Vec<(FieldLocation, FieldLocation)>,
    pub fields_changed: Vec<(FieldLocation, FieldLocation)>,
}

impl StampDiff {
    pub fn is_empty(&self) -> bool {
        self.classes_added.is_empty()
            && self.classes_removed.is_empty()
            && self.classes_renamed.is_empty()
            && self.fields_added.is_empty()
            && self.fields_removed.is_empty()
            && self.fields_moved.is_empty()
            && self.fields_changed.is_empty()
    }

    pub fn has_chain_changes(&self) -> bool {
        !(self.classes_added.is_empty()
            && self.classes_removed.is_empty()
            && self.classes_renamed.is_empty())
    }

    /// Current location of a field that was stored at `class.name` in the stream.
    pub fn moved_to(&self, class: &str, name: &str) -> Option<&FieldLocation> {
        self.fields_moved
            .iter()
            .find(|(from, _)| from.class == class && from.name == name)
            .map(|(_, to)| to)
    }

    pub fn renamed_to(&self, class: &str) -> Option<&str> {
        self.classes_renamed
            .iter()
            .find(|(from, _)| from == class)
            .map(|(_, to)| to.as_str())
    }
}

impl TypeStamp {
    /// `classes` is ordered most derived first.
    pub fn new(classes: Vec<ClassStamp>) -> TypeStamp {
        TypeStamp { classes }
    }

    pub fn classes(&self) -> &[ClassStamp] {
        &self.classes
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    /// Every field with its declaring class, most derived class first.
    pub fn fields(&self) -> impl Iterator<Item = (&ClassStamp, &FieldStamp)> {
        self.classes
            .iter()
            .flat_map(|class| class.fields.iter().map(move |field| (class, field)))
    }

    pub fn field_count(&self) -> usize {
        self.classes.iter().map(|c| c.fields.len()).sum()
    }

    /// Compares this (current) stamp against the `previous` one.
    pub fn compare_with(&self, previous: &TypeStamp) -> StampDiff {
        compare(self, previous)
    }
}

/// Longest common subsequence of class names, as index pairs in increasing order.
fn align_chains(previous: &[&ClassStamp], current: &[&ClassStamp]) -> Vec<(usize, usize)> {
    let (n, m) = (previous.len(), current.len());
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if previous[i].name == current[j].name {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    let mut pairs = Vec::with_capacity(table[0][0]);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if previous[i].name == current[j].name {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

pub fn compare(current: &TypeStamp, previous: &TypeStamp) -> StampDiff {
    let mut diff = StampDiff::default();
    if current == previous {
        return diff;
    }

    // root-most first
    let prev_chain: Vec<&ClassStamp> = previous.classes.iter().rev().collect();
    let curr_chain: Vec<&ClassStamp> = current.classes.iter().rev().collect();
    let anchors = align_chains(&prev_chain, &curr_chain);

    // previous class name -> current class name
    let mut class_map: HashMap<&str, &str> = HashMap::new();
    let (mut pi, mut ci) = (0usize, 0usize);
    let gaps = anchors
        .iter()
        .copied()
        .map(Some)
        .chain(std::iter::once(None));
    for anchor in gaps {
        let (p_end, c_end) = anchor.unwrap_or((prev_chain.len(), curr_chain.len()));
        let removed = &prev_chain[pi..p_end];
        let added = &curr_chain[ci..c_end];
        if removed.len() == 1 && added.len() == 1 && removed[0].same_shape(added[0]) {
            class_map.insert(&removed[0].name, &added[0].name);
            diff.classes_renamed
                .push((removed[0].name.clone(), added[0].name.clone()));
        } else {
            diff.classes_removed
                .extend(removed.iter().map(|c| c.name.clone()));
            diff.classes_added
                .extend(added.iter().map(|c| c.name.clone()));
        }
        if let Some((p, c)) = anchor {
            class_map.insert(&prev_chain[p].name, &curr_chain[c].name);
            pi = p + 1;
            ci = c + 1;
        }
    }

    let current_fields: Vec<FieldLocation> = current
        .fields()
        .map(|(class, field)| FieldLocation {
            class: class.name.clone(),
            name: field.name.clone(),
            field_type: field.field_type.clone(),
        })
        .collect();
    let mut matched = vec![false; current_fields.len()];
    let mut pending = Vec::new();

    for (class, field) in previous.fields() {
        let location = FieldLocation {
            class: class.name.clone(),
            name: field.name.clone(),
            field_type: field.field_type.clone(),
        };
        let mapped = class_map.get(class.name.as_str()).copied();
        let same_place = mapped.and_then(|mapped| {
            current_fields
                .iter()
                .position(|c| c.class == mapped && c.name == field.name)
        });
        match same_place {
            Some(index) => {
                matched[index] = true;
                if current_fields[index].field_type != field.field_type {
                    diff.fields_changed
                        .push((location, current_fields[index].clone()));
                }
            }
            None => pending.push(location),
        }
    }

    for location in pending {
        let target = current_fields.iter().enumerate().position(|(index, c)| {
            !matched[index] && c.name == location.name && c.field_type == location.field_type
        });
        match target {
            Some(index) => {
                matched[index] = true;
                diff.fields_moved
                    .push((location, current_fields[index].clone()));
            }
            None => diff.fields_removed.push(location),
        }
    }

    diff.fields_added.extend(
        current_fields
            .into_iter()
            .zip(matched)
            .filter(|(_, matched)| !matched)
            .map(|(field, _)| field),
    );
    diff
}
