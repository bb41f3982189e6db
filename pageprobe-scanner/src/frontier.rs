use crate::links::normalize_url;
use std::collections::HashSet;

/// Visited and discovered URL sets driving the breadth-first traversal.
///
/// Both sets only grow. Every key is normalized on the way in.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    visited: HashSet<String>,
    discovered: Vec<String>,
    discovered_keys: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark seeds visited before they are processed. Returns them normalized
    /// and de-duplicated, in the order given.
    pub fn seed<I, S>(&mut self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .map(|u| normalize_url(u.as_ref()))
            .filter(|u| self.visited.insert(u.clone()))
            .collect()
    }

    /// Union `links` into the discovered set, returning how many were new
    pub fn record_discovered<I, S>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.discovered.len();
        for link in links {
            let key = normalize_url(link.as_ref());
            if self.discovered_keys.insert(key.clone()) {
                self.discovered.push(key);
            }
        }
        self.discovered.len() - before
    }

    /// Discovered but not yet visited, in discovery order
    pub fn next_batch(&self) -> Vec<String> {
        self.discovered
            .iter()
            .filter(|u| !self.visited.contains(*u))
            .cloned()
            .collect()
    }

    /// Returns true if `url` had not been visited yet
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(normalize_url(url))
    }

    pub fn is_exhausted(&self) -> bool {
        self.discovered.iter().all(|u| self.visited.contains(u))
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }
}
