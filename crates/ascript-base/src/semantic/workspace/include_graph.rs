//! Include dependencies between files, with a reverse index for finding
//! the records to re-analyze after a change.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct IncludeGraph {
    /// file → files it includes
    dependencies: HashMap<PathBuf, HashSet<PathBuf>>,
    /// file → files that include it
    dependents: HashMap<PathBuf, HashSet<PathBuf>>,
}

impl IncludeGraph {
    /// Replaces the include set of `from`.
    pub fn set_includes(&mut self, from: &Path, includes: impl IntoIterator<Item = PathBuf>) {
        self.remove_file(from);
        let set: HashSet<PathBuf> = includes.into_iter().collect();
        for to in &set {
            self.dependents
                .entry(to.clone())
                .or_default()
                .insert(from.to_path_buf());
        }
        self.dependencies.insert(from.to_path_buf(), set);
    }

    pub fn remove_file(&mut self, from: &Path) {
        if let Some(old) = self.dependencies.remove(from) {
            for to in old {
                if let Some(set) = self.dependents.get_mut(&to) {
                    set.remove(from);
                }
            }
        }
    }

    /// Files that directly include `path`.
    pub fn dependents_of(&self, path: &Path) -> Vec<PathBuf> {
        self.dependents
            .get(path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every file transitively affected by a change to `path`, in BFS
    /// order (direct dependents first), excluding `path` itself. Cycles
    /// terminate through the visited set.
    pub fn all_affected(&self, path: &Path) -> Vec<PathBuf> {
        let mut affected = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(path.to_path_buf());
        let mut pending: VecDeque<PathBuf> = VecDeque::new();
        pending.push_back(path.to_path_buf());
        while let Some(current) = pending.pop_front() {
            let mut direct = self.dependents_of(&current);
            direct.sort();
            for dependent in direct {
                if visited.insert(dependent.clone()) {
                    affected.push(dependent.clone());
                    pending.push_back(dependent);
                }
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affected_is_transitive_and_cycle_safe() {
        let mut graph = IncludeGraph::default();
        // b includes a; c includes b; a includes c (cycle)
        graph.set_includes(Path::new("b.as"), [PathBuf::from("a.as")]);
        graph.set_includes(Path::new("c.as"), [PathBuf::from("b.as")]);
        graph.set_includes(Path::new("a.as"), [PathBuf::from("c.as")]);

        let affected = graph.all_affected(Path::new("a.as"));
        assert_eq!(affected, vec![PathBuf::from("b.as"), PathBuf::from("c.as")]);
    }

    #[test]
    fn test_set_includes_replaces_old_edges() {
        let mut graph = IncludeGraph::default();
        graph.set_includes(Path::new("b.as"), [PathBuf::from("a.as")]);
        graph.set_includes(Path::new("b.as"), [PathBuf::from("x.as")]);
        assert!(graph.dependents_of(Path::new("a.as")).is_empty());
        assert_eq!(graph.dependents_of(Path::new("x.as")), vec![PathBuf::from("b.as")]);
    }
}
