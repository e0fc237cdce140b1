//! Page segmentation into per-account blocks.

use tracing::debug;

use super::rules::{AccountIdExtractor, FieldExtractor};
use crate::models::record::AccountBlock;

/// Splits page text into account blocks.
#[derive(Debug, Clone)]
pub struct Segmenter {
    skip_marker_less_first_page: bool,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            skip_marker_less_first_page: true,
        }
    }

    /// Whether a first page without markers is skipped as a summary page.
    pub fn with_first_page_skip(mut self, skip: bool) -> Self {
        self.skip_marker_less_first_page = skip;
        self
    }

    /// Split one page into blocks.
    ///
    /// Every account marker starts a block that runs until the next marker or the
    /// end of the page; text before the first marker belongs to no block. A page
    /// without markers yields nothing when it is the first page of the document
    /// (a summary page), and one whole-page block otherwise.
    pub fn segment(&self, page_text: &str, document: &str, page_index: usize) -> Vec<AccountBlock> {
        let starts: Vec<usize> = AccountIdExtractor::new()
            .extract_all(page_text)
            .into_iter()
            .filter_map(|m| m.position.map(|(start, _)| start))
            .collect();

        if starts.is_empty() {
            if page_index == 0 && self.skip_marker_less_first_page {
                debug!(document, "first page has no account marker, skipping as summary");
                return Vec::new();
            }
            return vec![AccountBlock {
                raw_text: page_text.to_string(),
                source_document: document.to_string(),
                page_index,
                whole_page: true,
            }];
        }

        let blocks: Vec<AccountBlock> = starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(page_text.len());
                AccountBlock {
                    raw_text: page_text[start..end].to_string(),
                    source_document: document.to_string(),
                    page_index,
                    whole_page: false,
                }
            })
            .collect();

        debug!(document, page = page_index + 1, blocks = blocks.len(), "segmented page");
        blocks
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment with default settings.
pub fn segment(page_text: &str, document: &str, page_index: usize) -> Vec<AccountBlock> {
    Segmenter::new().segment(page_text, document, page_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_per_marker() {
        let page = "Cabeçalho\nUC: 111\nValor: R$ 10,00\nUnidade Consumidora: 222\nValor: R$ 20,00\nRodapé";
        let blocks = segment(page, "a.pdf", 1);

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].raw_text.starts_with("UC: 111"));
        assert!(blocks[1].raw_text.starts_with("Unidade Consumidora: 222"));
        assert!(blocks[1].raw_text.ends_with("Rodapé"));
        assert!(blocks.iter().all(|b| !b.whole_page && b.page_index == 1));
    }

    #[test]
    fn test_blocks_reconstruct_text_from_first_marker() {
        let pages = [
            "UC: 1 a UC: 2 b UC: 3 c",
            "preamble\nUC: 10\nx\nx\nUC: 20",
            "UC: 5",
            "header Unidade Consumidora: 7 tail UC: 8 UC: 9\n\n",
        ];

        for page in pages {
            let blocks = segment(page, "doc.pdf", 0);
            let markers = AccountIdExtractor::new().extract_all(page);
            let first = markers[0].position.unwrap().0;

            assert_eq!(blocks.len(), markers.len());
            let joined: String = blocks.iter().map(|b| b.raw_text.as_str()).collect();
            assert_eq!(joined, &page[first..]);
        }
    }

    #[test]
    fn test_first_page_without_marker_is_skipped() {
        assert!(segment("Resumo da fatura consolidada", "a.pdf", 0).is_empty());
    }

    #[test]
    fn test_later_page_without_marker_is_whole_block() {
        let blocks = segment("Conta sem marcador", "a.pdf", 3);

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].whole_page);
        assert_eq!(blocks[0].raw_text, "Conta sem marcador");
    }

    #[test]
    fn test_first_page_skip_can_be_disabled() {
        let blocks = Segmenter::new()
            .with_first_page_skip(false)
            .segment("Conta sem marcador", "a.pdf", 0);
        assert_eq!(blocks.len(), 1);
    }
}
