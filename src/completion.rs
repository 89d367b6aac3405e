/// Ordered set of candidate strings assembled by the host's completion
/// producer for the current buffer. Owned by the engine for the duration of
/// `Completion` mode and released when that mode is exited.
#[derive(Default, Clone)]
pub struct CompletionSet {
    candidates: Vec<String>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Host-side helper mirroring `add_completion`: copies `candidate` in.
    pub fn add(&mut self, candidate: &str) {
        self.candidates.push(candidate.to_string());
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.candidates.get(idx).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}

/// Populates a [`CompletionSet`] from the current buffer contents.
pub trait CompletionProducer {
    fn complete(&mut self, buf: &str, out: &mut CompletionSet);
}

/// Default producer for hosts with no completion source.
pub struct NoCompletions;

impl CompletionProducer for NoCompletions {
    fn complete(&mut self, _buf: &str, _out: &mut CompletionSet) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_copies_the_string() {
        let mut set = CompletionSet::new();
        let mut s = String::from("status");
        set.add(&s);
        s.push_str("-mutated");
        assert_eq!(set.get(0), Some("status"));
    }
}
