//! Repeated-Block Detector
//!
//! Fingerprints every direct child of `<body>` and treats a fingerprint
//! found on every sampled page as boilerplate.

use super::MIN_OBSERVED_PAGES;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};

/// Characters per text-length bucket
const TEXT_BUCKET: usize = 50;

/// Structural shape of a body-level block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockSignature {
    pub tag: String,
    /// Tag names of the element children, in document order
    pub child_tags: Vec<String>,
    /// Class names, sorted
    pub classes: Vec<String>,
    pub id: Option<String>,
    /// Number of `a[href]` descendants
    pub link_count: usize,
    /// Trimmed text length divided by the bucket width
    pub text_bucket: usize,
}

impl BlockSignature {
    pub fn of(element: ElementRef<'_>) -> Self {
        let value = element.value();

        let child_tags = element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| child.value().name().to_string())
            .collect();

        let mut classes: Vec<String> = value.classes().map(str::to_string).collect();
        classes.sort();

        let link_count = Selector::parse("a[href]")
            .map(|selector| element.select(&selector).count())
            .unwrap_or(0);

        let text: String = element.text().collect();

        Self {
            tag: value.name().to_string(),
            child_tags,
            classes,
            id: value.id().map(str::to_string),
            link_count,
            text_bucket: text.trim().chars().count() / TEXT_BUCKET,
        }
    }
}

/// Direct element children of `<body>`
///
/// A document without a body has no blocks.
pub fn body_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    let Ok(selector) = Selector::parse("body") else {
        return Vec::new();
    };
    match document.root_element().select(&selector).next() {
        Some(body) => body.children().filter_map(ElementRef::wrap).collect(),
        None => Vec::new(),
    }
}

/// Signature page counts gathered while sampling
#[derive(Debug, Clone, Default)]
pub struct RepeatedBlockTable {
    counts: HashMap<BlockSignature, usize>,
    pages: usize,
}

impl RepeatedBlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the distinct block signatures of one page
    pub fn observe(&mut self, document: &Html) {
        let distinct: HashSet<BlockSignature> = body_blocks(document)
            .into_iter()
            .map(BlockSignature::of)
            .collect();
        for signature in distinct {
            *self.counts.entry(signature).or_insert(0) += 1;
        }
        self.pages += 1;
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Keeps the signatures present on every observed page
    ///
    /// Fewer than [`MIN_OBSERVED_PAGES`] pages give an empty set.
    pub fn freeze(self) -> RepeatedSignatures {
        let pages = self.pages;
        if pages < MIN_OBSERVED_PAGES {
            return RepeatedSignatures::default();
        }
        let signatures = self
            .counts
            .into_iter()
            .filter(|(_, count)| *count == pages)
            .map(|(signature, _)| signature)
            .collect();
        RepeatedSignatures { signatures }
    }
}

/// Frozen set of boilerplate block signatures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatedSignatures {
    signatures: HashSet<BlockSignature>,
}

impl RepeatedSignatures {
    pub fn contains(&self, signature: &BlockSignature) -> bool {
        self.signatures.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Detaches every body block whose signature is in the set
    ///
    /// Returns the number of blocks removed. Detached subtrees are only
    /// unreachable from `document.root_element()`, so read the pruned
    /// document through it.
    pub fn remove_repeated_blocks(&self, document: &mut Html) -> usize {
        if self.signatures.is_empty() {
            return 0;
        }

        let doomed: Vec<_> = body_blocks(document)
            .into_iter()
            .filter(|block| self.contains(&BlockSignature::of(*block)))
            .map(|block| block.id())
            .collect();

        for id in &doomed {
            if let Some(mut node) = document.tree.get_mut(*id) {
                node.detach();
            }
        }
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"<header class="top site"><a href="/">Logo</a></header>"#;
    const NAV: &str =
        r#"<nav id="menu"><a href="/a">A</a><a href="/b">B</a><h2>Menu</h2></nav>"#;

    fn page(content: &str) -> Html {
        Html::parse_document(&format!(
            "<html><body>{}{}<main>{}</main></body></html>",
            HEADER, NAV, content
        ))
    }

    fn sample() -> Vec<Html> {
        vec![
            page("<h1>One</h1>"),
            page("<h1>Two</h1><p>text</p>"),
            page("<article><h1>Three</h1></article>"),
        ]
    }

    fn learn(pages: &[Html]) -> RepeatedSignatures {
        let mut table = RepeatedBlockTable::new();
        for document in pages {
            table.observe(document);
        }
        table.freeze()
    }

    #[test]
    fn test_signature_shape() {
        let document = page("");
        let blocks = body_blocks(&document);
        assert_eq!(blocks.len(), 3);

        let header = BlockSignature::of(blocks[0]);
        assert_eq!(header.tag, "header");
        assert_eq!(header.classes, vec!["site".to_string(), "top".to_string()]);
        assert_eq!(header.child_tags, vec!["a".to_string()]);
        assert_eq!(header.link_count, 1);

        let nav = BlockSignature::of(blocks[1]);
        assert_eq!(nav.id.as_deref(), Some("menu"));
        assert_eq!(nav.link_count, 2);
        assert_eq!(nav.text_bucket, 0);
    }

    #[test]
    fn test_only_blocks_on_every_page_repeat() {
        let signatures = learn(&sample());
        // header and nav; the three <main> blocks all differ
        assert_eq!(signatures.len(), 2);
    }

    #[test]
    fn test_partial_overlap_is_not_repeated() {
        let mut pages = sample();
        pages.push(Html::parse_document("<html><body><main>bare</main></body></html>"));
        assert!(learn(&pages).is_empty());
    }

    #[test]
    fn test_no_pages_no_signatures() {
        assert!(RepeatedBlockTable::new().freeze().is_empty());
    }

    #[test]
    fn test_one_page_is_not_a_sample() {
        let signatures = learn(&sample()[..1]);
        assert!(signatures.is_empty());

        let mut document = page("<h1>One</h1>");
        assert_eq!(signatures.remove_repeated_blocks(&mut document), 0);

        assert_eq!(learn(&sample()[..2]).len(), 2);
    }

    #[test]
    fn test_remove_repeated_blocks() {
        let signatures = learn(&sample());
        let mut document = page("<h1>Fresh</h1>");

        assert_eq!(signatures.remove_repeated_blocks(&mut document), 2);

        let remaining: Vec<String> = body_blocks(&document)
            .iter()
            .map(|block| block.value().name().to_string())
            .collect();
        assert_eq!(remaining, vec!["main".to_string()]);
        let h2 = Selector::parse("h2").unwrap();
        assert_eq!(document.root_element().select(&h2).count(), 0);
        let links = Selector::parse("a[href]").unwrap();
        assert_eq!(document.root_element().select(&links).count(), 0);
    }

    #[test]
    fn test_removal_is_idempotent() {
        let signatures = learn(&sample());
        let mut pruned = sample();
        for document in &mut pruned {
            signatures.remove_repeated_blocks(document);
        }

        for document in &mut pruned {
            assert_eq!(signatures.remove_repeated_blocks(document), 0);
        }
        assert!(learn(&pruned).is_empty());
    }

    #[test]
    fn test_document_without_blocks() {
        let signatures = learn(&sample());
        let mut document = Html::parse_fragment("just text");
        assert_eq!(signatures.remove_repeated_blocks(&mut document), 0);
    }
}
