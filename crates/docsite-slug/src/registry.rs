use std::collections::HashSet;

use crate::{slugify_with, WordChars};

/// Hands out document-unique anchors.
///
/// The first heading producing a slug gets it verbatim; later collisions get
/// `-1`, `-2`, … appended, skipping any suffixed form that is already taken.
#[derive(Clone, Debug, Default)]
pub struct SlugRegistry {
    policy: WordChars,
    used: HashSet<String>,
}

impl SlugRegistry {
    pub fn new(policy: WordChars) -> Self {
        Self {
            policy,
            used: HashSet::new(),
        }
    }

    pub fn policy(&self) -> WordChars {
        self.policy
    }

    /// Slugify `text` and claim a unique anchor for it. Returns `None` when the
    /// text has no characters that survive slugification.
    pub fn register(&mut self, text: &str) -> Option<String> {
        let slug = slugify_with(text, self.policy);
        self.claim(slug)
    }

    /// Claim an explicitly chosen anchor id, suffixing it on collision.
    pub fn reserve(&mut self, id: &str) -> Option<String> {
        self.claim(id.trim().to_string())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.used.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    fn claim(&mut self, base: String) -> Option<String> {
        if base.is_empty() {
            return None;
        }

        if self.used.insert(base.clone()) {
            return Some(base);
        }

        let mut index = 1usize;
        loop {
            let candidate = format!("{base}-{index}");
            if self.used.insert(candidate.clone()) {
                return Some(candidate);
            }
            index += 1;
        }
    }
}
