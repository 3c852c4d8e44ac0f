//! Domain Models for Scholar Search

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use url::Url;

use agent_core::ValidatedArgs;

use crate::error::{Result, ScholarError};

pub const SCHOLAR_URL: &str = "https://scholar.google.com/scholar";
pub const DEFAULT_NUM_RESULTS: u32 = 10;
pub const MAX_NUM_RESULTS: u32 = 20;
pub const MIN_YEAR: i32 = 1900;

/// One search hit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarResult {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Authors")]
    pub authors: String,

    #[serde(rename = "Abstract")]
    pub abstract_text: String,

    #[serde(rename = "URL")]
    pub url: String,
}

/// Current calendar year (UTC), the upper bound for year filters
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// A validated search request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub num_results: u32,
    pub author: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            num_results: DEFAULT_NUM_RESULTS,
            author: None,
            start_year: None,
            end_year: None,
        }
    }

    pub fn num_results(mut self, n: u32) -> Self {
        self.num_results = n;
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    /// Build from tool arguments and check every rule
    pub fn from_args(args: &ValidatedArgs, current_year: i32) -> Result<Self> {
        let query = args
            .get_str("query")
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ScholarError::invalid("Query parameter is required and must be a string"))?;

        let num_results = match args.get_f64("numResults") {
            Some(n) => whole(n)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    ScholarError::invalid(format!(
                        "numResults must be a number between 1 and {MAX_NUM_RESULTS}"
                    ))
                })?,
            None => DEFAULT_NUM_RESULTS,
        };

        let year = |name: &str| -> Result<Option<i32>> {
            args.get_f64(name)
                .map(|y| {
                    whole(y)
                        .and_then(|y| i32::try_from(y).ok())
                        .ok_or_else(|| year_error(name, current_year))
                })
                .transpose()
        };

        let search = Self {
            query: query.to_string(),
            num_results,
            author: args
                .get_str("author")
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from),
            start_year: year("startYear")?,
            end_year: year("endYear")?,
        };
        search.validate(current_year)?;
        Ok(search)
    }

    /// Check ranges and the year ordering
    pub fn validate(&self, current_year: i32) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ScholarError::invalid("Query parameter is required and must be a string"));
        }
        if !(1..=MAX_NUM_RESULTS).contains(&self.num_results) {
            return Err(ScholarError::invalid(format!(
                "numResults must be a number between 1 and {MAX_NUM_RESULTS}"
            )));
        }
        for (name, year) in [("startYear", self.start_year), ("endYear", self.end_year)] {
            if year.is_some_and(|y| !(MIN_YEAR..=current_year).contains(&y)) {
                return Err(year_error(name, current_year));
            }
        }
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(ScholarError::invalid("Start year cannot be greater than end year"));
            }
        }
        Ok(())
    }

    /// Query text sent to the search engine, author filter included
    pub fn search_text(&self) -> String {
        match &self.author {
            Some(author) => format!("{} author:\"{author}\"", self.query),
            None => self.query.clone(),
        }
    }

    /// Search URL against `base` (normally [`SCHOLAR_URL`])
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &self.search_text());
            pairs.append_pair("num", &self.num_results.to_string());
            if self.start_year.is_some() || self.end_year.is_some() {
                pairs.append_pair("as_ylo", &self.start_year.map(|y| y.to_string()).unwrap_or_default());
                pairs.append_pair("as_yhi", &self.end_year.map(|y| y.to_string()).unwrap_or_default());
            }
        }
        Ok(url)
    }

    /// Filter summary echoed back in the response
    pub fn filters(&self) -> Filters {
        let year_range = if self.start_year.is_some() || self.end_year.is_some() {
            format!(
                "{}-{}",
                self.start_year.map_or_else(|| "any".into(), |y| y.to_string()),
                self.end_year.map_or_else(|| "any".into(), |y| y.to_string()),
            )
        } else {
            "none".into()
        };

        Filters {
            author: self.author.clone().unwrap_or_else(|| "none".into()),
            year_range,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.is_finite()).then_some(n as i64)
}

fn year_error(name: &str, current_year: i32) -> ScholarError {
    ScholarError::invalid(format!(
        "{name} must be a number between {MIN_YEAR} and {current_year}"
    ))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub author: String,
    pub year_range: String,
}

/// Tool payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub filters: Filters,
    pub total_results: usize,
    pub results: Vec<ScholarResult>,
}

impl SearchResponse {
    pub fn new(search: &SearchQuery, results: Vec<ScholarResult>) -> Self {
        Self {
            query: search.query.clone(),
            filters: search.filters(),
            total_results: results.len(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> ValidatedArgs {
        ValidatedArgs::validate(&[], &value).unwrap()
    }

    #[test]
    fn test_url_plain() {
        let url = SearchQuery::new("machine learning").url(SCHOLAR_URL).unwrap();
        assert_eq!(
            url.as_str(),
            "https://scholar.google.com/scholar?q=machine+learning&num=10"
        );
    }

    #[test]
    fn test_url_with_author_and_open_year_range() {
        let url = SearchQuery::new("deep learning")
            .author("Geoffrey Hinton")
            .num_results(5)
            .years(Some(2015), None)
            .url(SCHOLAR_URL)
            .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".into(), "deep learning author:\"Geoffrey Hinton\"".into()),
                ("num".into(), "5".into()),
                ("as_ylo".into(), "2015".into()),
                ("as_yhi".into(), String::new()),
            ]
        );
    }

    #[test]
    fn test_from_args_defaults() {
        let search = SearchQuery::from_args(&args(json!({"query": "transformers"})), 2025).unwrap();
        assert_eq!(search, SearchQuery::new("transformers"));
        assert_eq!(
            search.filters(),
            Filters {
                author: "none".into(),
                year_range: "none".into()
            }
        );
    }

    #[test]
    fn test_from_args_rules() {
        let err = SearchQuery::from_args(&args(json!({"query": "x", "numResults": 21})), 2025).unwrap_err();
        assert_eq!(err.to_string(), "numResults must be a number between 1 and 20");

        let err = SearchQuery::from_args(&args(json!({"query": "x", "startYear": 1899})), 2025).unwrap_err();
        assert_eq!(err.to_string(), "startYear must be a number between 1900 and 2025");

        let err = SearchQuery::from_args(
            &args(json!({"query": "x", "startYear": 2020, "endYear": 2010})),
            2025,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Start year cannot be greater than end year");

        let err = SearchQuery::from_args(&args(json!({"query": "  "})), 2025).unwrap_err();
        assert!(matches!(err, ScholarError::InvalidQuery(_)));
    }

    #[test]
    fn test_year_range_summary() {
        let search = SearchQuery::new("x").years(None, Some(2020));
        assert_eq!(search.filters().year_range, "any-2020");
        let search = SearchQuery::new("x").years(Some(2015), Some(2020));
        assert_eq!(search.filters().year_range, "2015-2020");
    }

    #[test]
    fn test_result_field_names() {
        let result = ScholarResult {
            title: "Attention is all you need".into(),
            authors: "A Vaswani, N Shazeer".into(),
            abstract_text: "The dominant sequence transduction models".into(),
            url: "https://arxiv.org/abs/1706.03762".into(),
        };
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["Title"], "Attention is all you need");
        assert_eq!(value["URL"], "https://arxiv.org/abs/1706.03762");
    }
}
