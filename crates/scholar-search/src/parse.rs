//! Result Page Extraction
//!
//! Pulls result entries out of a Google Scholar results page. Each entry is a
//! `gs_r gs_or gs_scl` block holding a `gs_rt` title link, a `gs_a` author
//! line and a `gs_rs` snippet.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScholarError};
use crate::model::ScholarResult;

const NO_AUTHORS: &str = "No authors available";
const NO_ABSTRACT: &str = "No abstract available";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScholarError::Selector(format!("{css}: {e}")))
}

/// Compiled result selectors
pub struct ResultParser {
    block: Selector,
    title_link: Selector,
    authors: Selector,
    snippet: Selector,
}

impl ResultParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            block: selector(".gs_r.gs_or.gs_scl")?,
            title_link: selector(".gs_rt a")?,
            authors: selector(".gs_a")?,
            snippet: selector(".gs_rs")?,
        })
    }

    /// Extract at most `limit` entries, in page order
    ///
    /// Entries without a linked title are skipped.
    pub fn parse(&self, html: &str, limit: usize) -> Vec<ScholarResult> {
        let document = Html::parse_document(html);

        document
            .select(&self.block)
            .filter_map(|block| self.parse_block(block))
            .take(limit)
            .collect()
    }

    fn parse_block(&self, block: ElementRef<'_>) -> Option<ScholarResult> {
        let link = block.select(&self.title_link).next()?;

        let title = text(link);
        if title.is_empty() {
            return None;
        }

        let url = link.value().attr("href").unwrap_or_default().to_string();
        let field = |selector: &Selector, fallback: &str| {
            block
                .select(selector)
                .next()
                .map(text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        Some(ScholarResult {
            title,
            authors: field(&self.authors, NO_AUTHORS),
            abstract_text: field(&self.snippet, NO_ABSTRACT),
            url,
        })
    }
}

/// Visible text of an element, whitespace collapsed
fn text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div id="gs_res_ccl_mid">
  <div class="gs_r gs_or gs_scl" data-cid="abc" data-rp="0">
    <div class="gs_ri">
      <h3 class="gs_rt" ontouchstart="gs_evt_dsp(event)">
        <span class="gs_ctg2">[PDF]</span>
        <a id="abc" href="https://arxiv.org/abs/1706.03762?a=1&amp;b=2" data-clk="hl=en">Attention is <b>all</b> you need</a>
      </h3>
      <div class="gs_a">A <b>Vaswani</b>, N Shazeer, N Parmar&hellip; - Advances in neural &#8230;, 2017 - proceedings.neurips.cc</div>
      <div class="gs_rs">The dominant sequence transduction models are based on complex recurrent or
        convolutional neural networks &hellip;</div>
    </div>
  </div>
  <div class="gs_r gs_or gs_scl" data-cid="def">
    <div class="gs_ri">
      <h3 class="gs_rt"><span class="gs_ctu">[CITATION]</span> Untitled citation</h3>
      <div class="gs_a">Someone</div>
    </div>
  </div>
  <div class="gs_r gs_or gs_scl" data-cid="ghi">
    <div class="gs_ri">
      <h3 class="gs_rt"><a href="https://example.org/bert">BERT: Pre-training of deep bidirectional transformers</a></h3>
    </div>
  </div>
</div>
"#;

    #[test]
    fn test_parse_page() {
        let parser = ResultParser::new().unwrap();
        let results = parser.parse(PAGE, 10);

        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.title, "Attention is all you need");
        assert_eq!(first.url, "https://arxiv.org/abs/1706.03762?a=1&b=2");
        assert_eq!(
            first.authors,
            "A Vaswani, N Shazeer, N Parmar… - Advances in neural …, 2017 - proceedings.neurips.cc"
        );
        assert!(first.abstract_text.starts_with("The dominant sequence transduction models"));
        assert!(!first.abstract_text.contains('\n'));

        let second = &results[1];
        assert_eq!(second.title, "BERT: Pre-training of deep bidirectional transformers");
        assert_eq!(second.authors, NO_AUTHORS);
        assert_eq!(second.abstract_text, NO_ABSTRACT);
    }

    #[test]
    fn test_parse_respects_limit() {
        let parser = ResultParser::new().unwrap();
        assert_eq!(parser.parse(PAGE, 1).len(), 1);
        assert!(parser.parse("<html><body>captcha</body></html>", 10).is_empty());
    }

    #[test]
    fn test_inline_markup_does_not_split_words() {
        let page = r#"
<div class="gs_r gs_or gs_scl">
  <h3 class="gs_rt"><a href="https://example.org/vit?x=1&amp;y=2"><b>Trans</b>formers for vision</a></h3>
  <div class="gs_a">A&nbsp;Dosovitskiy, L Beyer&#8230; - arXiv, 2020</div>
  <div class="gs_rs">An image is worth 16x16 <b>words</b>: &quot;ViT&quot;</div>
</div>
"#;
        let parser = ResultParser::new().unwrap();
        let results = parser.parse(page, 10);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Transformers for vision");
        assert_eq!(results[0].url, "https://example.org/vit?x=1&y=2");
        assert_eq!(results[0].authors, "A Dosovitskiy, L Beyer… - arXiv, 2020");
        assert_eq!(results[0].abstract_text, "An image is worth 16x16 words: \"ViT\"");
    }
}
