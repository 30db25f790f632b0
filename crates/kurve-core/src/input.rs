use std::collections::HashSet;

/// Level-triggered keyboard view supplied by the host each frame.
///
/// The game only asks whether a key is currently held; press edges are
/// derived inside the game where it needs them.
pub trait KeyboardState {
    fn is_held(&self, key: &str) -> bool;
}

/// Set of currently held key names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: HashSet<String>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    pub fn release(&mut self, key: &str) {
        self.keys.remove(key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl KeyboardState for HeldKeys {
    fn is_held(&self, key: &str) -> bool {
        !key.is_empty() && self.keys.contains(key)
    }
}

/// Nothing held.
pub struct NoKeys;

impl KeyboardState for NoKeys {
    fn is_held(&self, _key: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = HeldKeys::new();
        keys.press("a");
        assert!(keys.is_held("a"));
        assert!(!keys.is_held("d"));
        keys.release("a");
        assert!(!keys.is_held("a"));
    }

    #[test]
    fn collect_from_names() {
        let keys: HeldKeys = ["n", "m"].into_iter().collect();
        assert!(keys.is_held("n") && keys.is_held("m"));
    }

    #[test]
    fn empty_binding_never_held() {
        let keys: HeldKeys = [""].into_iter().collect();
        assert!(!keys.is_held(""));
        assert!(!NoKeys.is_held("a"));
    }
}
