//! Unique, filesystem-safe names for photo assets inside one archive.

use crate::models::NO_PHOTO_SENTINEL;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const EXTENSION: &str = "jpg";
const FALLBACK_BASE: &str = "photo";
const MAX_SUFFIX_ATTEMPTS: u32 = 100;

/// Allocates a name for `source_ref` that is not in `already_allocated`.
///
/// The base is the last path segment of the reference with everything but
/// ASCII letters and digits removed, so `content://media/external/images/media/1000000255`
/// becomes `1000000255.jpg`. Collisions get `_1`, `_2`, ... suffixes; after
/// 100 of those a random UUID name is used instead.
pub fn allocate_name(source_ref: &str, already_allocated: &HashSet<String>) -> String {
    let base = sanitized_base(source_ref);

    let candidate = format!("{}.{}", base, EXTENSION);
    if !already_allocated.contains(&candidate) {
        return candidate;
    }

    for counter in 1..=MAX_SUFFIX_ATTEMPTS {
        let candidate = format!("{}_{}.{}", base, counter, EXTENSION);
        if !already_allocated.contains(&candidate) {
            return candidate;
        }
    }

    log::debug!(
        "Name base '{}' exhausted after {} attempts, using random name",
        base,
        MAX_SUFFIX_ATTEMPTS
    );
    loop {
        let candidate = format!("{}.{}", Uuid::new_v4(), EXTENSION);
        if !already_allocated.contains(&candidate) {
            return candidate;
        }
    }
}

fn sanitized_base(source_ref: &str) -> String {
    let base: String = last_path_segment(source_ref)
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

/// Last non-empty path segment, ignoring scheme, authority, query and fragment
fn last_path_segment(source_ref: &str) -> Option<&str> {
    let without_fragment = source_ref.split_once('#').map_or(source_ref, |(head, _)| head);
    let without_query = without_fragment
        .split_once('?')
        .map_or(without_fragment, |(head, _)| head);

    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |slash| &rest[slash..]),
        None => without_query,
    };

    path.split('/').filter(|s| !s.is_empty()).last()
}

/// Per-operation allocator: the same source reference always maps to the same name.
///
/// The "no photo" sentinel is reserved from the start so a reference like
/// `content://media/null` can never be mistaken for a photo-less entry.
#[derive(Debug, Clone)]
pub struct AssetNamer {
    by_source: HashMap<String, String>,
    by_name: HashMap<String, String>,
    allocated: HashSet<String>,
    order: Vec<String>,
}

impl Default for AssetNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetNamer {
    pub fn new() -> Self {
        let mut allocated = HashSet::new();
        allocated.insert(NO_PHOTO_SENTINEL.to_string());
        Self {
            by_source: HashMap::new(),
            by_name: HashMap::new(),
            allocated,
            order: Vec::new(),
        }
    }

    /// Returns the name for `source_ref`, allocating one on first use
    pub fn allocate(&mut self, source_ref: &str) -> String {
        if let Some(name) = self.by_source.get(source_ref) {
            return name.clone();
        }

        let name = allocate_name(source_ref, &self.allocated);
        self.allocated.insert(name.clone());
        self.by_source.insert(source_ref.to_string(), name.clone());
        self.by_name.insert(name.clone(), source_ref.to_string());
        self.order.push(name.clone());
        name
    }

    /// `(source_ref, name)` pairs in allocation order
    pub fn allocations(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name).map(|s| (s.as_str(), name.as_str())))
    }

    pub fn source_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
