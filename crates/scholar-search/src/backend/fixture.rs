//! In-memory backend for tests and offline demos

use async_trait::async_trait;

use super::SearchBackend;
use crate::error::Result;
use crate::model::{ScholarResult, SearchQuery};

/// Serves a fixed corpus
///
/// A record matches when every query word appears in its title or abstract
/// and, when an author filter is set, the author line contains it. Year
/// bounds match against the last four-digit year on the author line.
pub struct StaticBackend {
    corpus: Vec<ScholarResult>,
}

impl StaticBackend {
    pub fn new(corpus: Vec<ScholarResult>) -> Self {
        Self { corpus }
    }

    /// Small corpus of well-known papers
    pub fn sample() -> Self {
        let paper = |title: &str, authors: &str, abstract_text: &str, url: &str| ScholarResult {
            title: title.into(),
            authors: authors.into(),
            abstract_text: abstract_text.into(),
            url: url.into(),
        };

        Self::new(vec![
            paper(
                "Attention is all you need",
                "A Vaswani, N Shazeer, N Parmar, J Uszkoreit - Advances in neural information processing systems, 2017",
                "The dominant sequence transduction models are based on complex recurrent or convolutional neural networks. We propose the Transformer, based solely on attention mechanisms.",
                "https://arxiv.org/abs/1706.03762",
            ),
            paper(
                "BERT: Pre-training of deep bidirectional transformers for language understanding",
                "J Devlin, MW Chang, K Lee, K Toutanova - Proceedings of NAACL-HLT, 2019",
                "We introduce a new language representation model called BERT, designed to pre-train deep bidirectional representations from unlabeled text.",
                "https://arxiv.org/abs/1810.04805",
            ),
            paper(
                "Deep residual learning for image recognition",
                "K He, X Zhang, S Ren, J Sun - Proceedings of the IEEE conference on computer vision and pattern recognition, 2016",
                "We present a residual learning framework to ease the training of networks that are substantially deeper than those used previously.",
                "https://arxiv.org/abs/1512.03385",
            ),
            paper(
                "ImageNet classification with deep convolutional neural networks",
                "A Krizhevsky, I Sutskever, GE Hinton - Advances in neural information processing systems, 2012",
                "We trained a large, deep convolutional neural network to classify the 1.2 million high-resolution images in the ImageNet LSVRC-2010 contest.",
                "https://papers.nips.cc/paper/4824",
            ),
        ])
    }

    fn matches(record: &ScholarResult, query: &SearchQuery) -> bool {
        let haystack = format!("{} {}", record.title, record.abstract_text).to_lowercase();
        let words_match = query
            .query
            .split_whitespace()
            .all(|word| haystack.contains(&word.to_lowercase()));

        let author_match = query
            .author
            .as_ref()
            .is_none_or(|a| record.authors.to_lowercase().contains(&a.to_lowercase()));

        let year = publication_year(&record.authors);
        let year_match = match year {
            Some(y) => {
                query.start_year.is_none_or(|s| y >= s) && query.end_year.is_none_or(|e| y <= e)
            }
            None => query.start_year.is_none() && query.end_year.is_none(),
        };

        words_match && author_match && year_match
    }
}

fn publication_year(authors: &str) -> Option<i32> {
    authors
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| s.len() == 4)
        .filter_map(|s| s.parse().ok())
        .next_back()
}

#[async_trait]
impl SearchBackend for StaticBackend {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScholarResult>> {
        Ok(self
            .corpus
            .iter()
            .filter(|record| Self::matches(record, query))
            .take(query.num_results as usize)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}
