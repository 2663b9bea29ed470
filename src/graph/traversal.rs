//! Cycle-safe traversal over `depends_on` edges.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::Document;

/// Hard cap on chain depth. The per-branch visited set already guarantees
/// termination; the cap bounds stack usage on very long acyclic chains.
pub const MAX_CHAIN_DEPTH: usize = 512;

/// Id lookups over a document slice, built once per call.
///
/// Dangling ids simply miss in both maps.
#[derive(Debug)]
pub struct DependencyIndex<'a> {
    by_id: HashMap<&'a str, &'a Document>,
    dependents: HashMap<&'a str, Vec<&'a str>>,
    /// Ids from which no `depends_on` cycle is reachable
    acyclic: HashSet<&'a str>,
    /// Traced chains of acyclic ids, shared by every trace over this index
    chains: RefCell<HashMap<String, Vec<String>>>,
}

impl<'a> DependencyIndex<'a> {
    pub fn new(documents: &'a [Document]) -> Self {
        let mut by_id = HashMap::with_capacity(documents.len());
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for doc in documents {
            by_id.entry(doc.id.as_str()).or_insert(doc);

            let mut seen = HashSet::new();
            for target in &doc.depends_on {
                if seen.insert(target.as_str()) {
                    dependents
                        .entry(target.as_str())
                        .or_default()
                        .push(doc.id.as_str());
                }
            }
        }

        let acyclic = acyclic_ids(&by_id);

        Self {
            by_id,
            dependents,
            acyclic,
            chains: RefCell::new(HashMap::new()),
        }
    }

    /// First document with `id`
    pub fn get(&self, id: &str) -> Option<&'a Document> {
        self.by_id.get(id).copied()
    }

    /// Ids of documents whose `depends_on` contains `id`, in input order
    pub fn dependents_of(&self, id: &str) -> &[&'a str] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids reachable through "depends on me" edges starting from the direct
    /// dependents of `id`, excluding the direct dependents themselves.
    ///
    /// Breadth-first; every id is reported once, so cycles terminate.
    pub fn transitive_dependents(&self, id: &str) -> Vec<String> {
        let direct: HashSet<&str> = self.dependents_of(id).iter().copied().collect();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = self.dependents_of(id).iter().copied().collect();
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &dependent in self.dependents_of(current) {
                if direct.contains(dependent) || !visited.insert(dependent) {
                    continue;
                }
                result.push(dependent.to_string());
                queue.push_back(dependent);
            }
        }

        result
    }
}

/// Ids that cannot reach a `depends_on` cycle.
///
/// Peels sinks (no targets, or only dangling ones) repeatedly; whatever is
/// never peeled lies on a cycle or leads into one.
fn acyclic_ids<'a>(by_id: &HashMap<&'a str, &'a Document>) -> HashSet<&'a str> {
    let mut remaining: HashMap<&'a str, usize> = HashMap::new();
    let mut reverse: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    let mut ready: Vec<&'a str> = Vec::new();

    for (&id, &doc) in by_id {
        let targets: HashSet<&'a str> = doc.depends_on.iter().map(String::as_str).collect();
        for &target in &targets {
            reverse.entry(target).or_default().push(id);
        }
        if targets.is_empty() {
            ready.push(id);
        } else {
            remaining.insert(id, targets.len());
        }
    }
    ready.extend(reverse.keys().copied().filter(|target| !by_id.contains_key(target)));

    let mut acyclic = HashSet::new();
    while let Some(id) = ready.pop() {
        if !acyclic.insert(id) {
            continue;
        }
        for &dependent in reverse.get(id).into_iter().flatten() {
            if let Some(count) = remaining.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push(dependent);
                }
            }
        }
    }

    acyclic
}

/// Longest `depends_on` path starting at `doc_id`.
///
/// Each branch gets its own copy of the visited set. Reaching a node already
/// on the current path ends that branch with the repeated node included once,
/// so a chain whose last element equals its first is a cycle back to the start.
///
/// Chains of ids that cannot reach a cycle do not depend on the path above
/// them, so they are traced once per index and reused.
pub fn trace_dependency_chain(doc_id: &str, index: &DependencyIndex<'_>) -> Vec<String> {
    trace(doc_id, index, HashSet::new())
}

fn trace<'a>(doc_id: &'a str, index: &DependencyIndex<'a>, mut visited: HashSet<&'a str>) -> Vec<String> {
    if visited.contains(doc_id) || visited.len() >= MAX_CHAIN_DEPTH {
        return vec![doc_id.to_string()];
    }

    let depth = visited.len();
    let acyclic = index.acyclic.contains(doc_id);
    if acyclic {
        // A cached chain is exact as long as it fits under the depth cap here
        let cached = index.chains.borrow().get(doc_id).cloned();
        if let Some(chain) = cached.filter(|chain| depth + chain.len() <= MAX_CHAIN_DEPTH) {
            return chain;
        }
    }

    let doc = match index.get(doc_id) {
        Some(doc) if !doc.depends_on.is_empty() => doc,
        _ => return vec![doc_id.to_string()],
    };

    visited.insert(doc_id);
    let mut longest = vec![doc_id.to_string()];

    for dep_id in &doc.depends_on {
        let dep_chain = trace(dep_id.as_str(), index, visited.clone());
        if dep_chain.len() + 1 > longest.len() {
            longest = std::iter::once(doc_id.to_string()).chain(dep_chain).collect();
        }
    }

    // Shorter than the remaining depth budget means the cap never cut it
    if acyclic && depth + longest.len() <= MAX_CHAIN_DEPTH {
        index
            .chains
            .borrow_mut()
            .insert(doc_id.to_string(), longest.clone());
    }

    longest
}
