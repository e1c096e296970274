use std::collections::HashSet;

/// Derives a URL-safe slug from heading text.
///
/// Lowercases the text, replaces each run of non-alphanumeric characters with
/// a single hyphen, and trims leading and trailing hyphens. Unicode letters
/// and digits are preserved. Text with no alphanumeric content falls back to
/// `"section"` so slugs are never empty.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("section");
    }

    slug
}

/// Per-document slug generator enforcing uniqueness.
///
/// Colliding slugs get the first available integer suffix (`-1`, `-2`, …)
/// in document order.
#[derive(Debug, Default)]
pub struct Slugger {
    taken: HashSet<String>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next unique slug for the given heading text.
    pub fn next_slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        let mut suffix = 0usize;
        while !self.taken.insert(slug.clone()) {
            suffix += 1;
            slug = format!("{base}-{suffix}");
        }
        slug
    }

    /// Reserves a slug so future generated slugs won't collide with it.
    pub fn reserve(&mut self, slug: &str) {
        self.taken.insert(slug.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn punctuation_runs_collapse_to_single_hyphen() {
        assert_eq!(slugify("TypeScript & JSX"), "typescript-jsx");
        assert_eq!(slugify("a --- b"), "a-b");
    }

    #[test]
    fn leading_and_trailing_hyphens_trimmed() {
        assert_eq!(slugify("  Getting Started!  "), "getting-started");
        assert_eq!(slugify("<Image />"), "image");
    }

    #[test]
    fn dots_become_separators() {
        assert_eq!(slugify("import.meta.glob"), "import-meta-glob");
    }

    #[test]
    fn unicode_preserved() {
        assert_eq!(slugify("多言語 ガイド"), "多言語-ガイド");
        assert_eq!(slugify("Héllo Wörld"), "héllo-wörld");
    }

    #[test]
    fn empty_falls_back() {
        assert_eq!(slugify("!!!"), "section");
        assert_eq!(slugify(""), "section");
    }

    #[test]
    fn deduplication_in_document_order() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Getting Started"), "getting-started");
        assert_eq!(slugger.next_slug("Getting Started"), "getting-started-1");
        assert_eq!(slugger.next_slug("Getting Started"), "getting-started-2");
    }

    #[test]
    fn dedup_skips_occupied_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Intro 1"), "intro-1");
        assert_eq!(slugger.next_slug("Intro"), "intro");
        // "intro-1" is taken by the literal heading above.
        assert_eq!(slugger.next_slug("Intro"), "intro-2");
    }

    #[test]
    fn reserve_prevents_collision() {
        let mut slugger = Slugger::new();
        slugger.reserve("intro");
        assert_eq!(slugger.next_slug("Intro"), "intro-1");
    }
}
