//! Scholar Search Tool
//!
//! Searches academic literature and returns structured results.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    ParamType, ParameterSchema, Result as CoreResult, Tool, ToolDescriptor, ToolOutput,
    ValidatedArgs,
};

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::model::{
    DEFAULT_NUM_RESULTS, MAX_NUM_RESULTS, MIN_YEAR, SearchQuery, SearchResponse, current_year,
};

pub const TOOL_NAME: &str = "search_google_scholar";

/// Tool for searching Google Scholar
pub struct ScholarSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl ScholarSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    async fn run(&self, args: &ValidatedArgs) -> Result<SearchResponse> {
        let query = SearchQuery::from_args(args, current_year())?;
        tracing::info!(
            backend = self.backend.name(),
            query = %query.query,
            num_results = query.num_results,
            author = query.author.as_deref().unwrap_or("none"),
            "Searching Google Scholar"
        );

        let results = self.backend.search(&query).await?;
        tracing::info!(found = results.len(), "Google Scholar search completed");
        Ok(SearchResponse::new(&query, results))
    }
}

#[async_trait]
impl Tool for ScholarSearchTool {
    fn descriptor(&self) -> ToolDescriptor {
        let year = f64::from(current_year());

        ToolDescriptor::new(
            TOOL_NAME,
            "Search Google Scholar for academic papers and research articles. Supports filtering \
             by author, publication year range, and returns structured results with titles, \
             authors, abstracts, and URLs.",
            vec![
                ParameterSchema::new(
                    "query",
                    ParamType::String,
                    "The search query string (e.g., 'machine learning', 'neural networks')",
                )
                .required(),
                ParameterSchema::new(
                    "numResults",
                    ParamType::Number,
                    format!("Number of results to return (default: {DEFAULT_NUM_RESULTS}, max: {MAX_NUM_RESULTS})"),
                )
                .with_range(1.0, f64::from(MAX_NUM_RESULTS))
                .with_default(json!(DEFAULT_NUM_RESULTS)),
                ParameterSchema::new(
                    "author",
                    ParamType::String,
                    "Filter results by specific author name (optional)",
                ),
                ParameterSchema::new(
                    "startYear",
                    ParamType::Number,
                    "Filter results from this year onwards (optional)",
                )
                .with_range(f64::from(MIN_YEAR), year),
                ParameterSchema::new(
                    "endYear",
                    ParamType::Number,
                    "Filter results up to this year (optional)",
                )
                .with_range(f64::from(MIN_YEAR), year),
            ],
        )
    }

    async fn execute(&self, args: &ValidatedArgs) -> CoreResult<ToolOutput> {
        match self.run(args).await {
            Ok(response) => Ok(ToolOutput::json(serde_json::to_value(response)?)),
            Err(e) => {
                tracing::warn!(error = %e, "Google Scholar search failed");
                Ok(ToolOutput::error(format!("Error searching Google Scholar: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StaticBackend;
    use agent_core::{LocalToolProvider, ToolProvider};

    fn provider() -> LocalToolProvider {
        let mut provider = LocalToolProvider::new();
        provider.register(ScholarSearchTool::new(Arc::new(StaticBackend::sample())));
        provider
    }

    #[test]
    fn test_descriptor_schema() {
        let tool = ScholarSearchTool::new(Arc::new(StaticBackend::sample()));
        let descriptor = tool.descriptor();
        let schema = descriptor.input_schema();

        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["numResults"]["maximum"], json!(20));
        assert_eq!(schema["properties"]["numResults"]["default"], json!(10));
        assert_eq!(schema["properties"]["startYear"]["minimum"], json!(1900));
        assert_eq!(schema["properties"]["author"]["type"], "string");
    }

    #[tokio::test]
    async fn test_search_output() {
        let output = provider()
            .call_tool(TOOL_NAME, &json!({"query": "attention", "numResults": 1}))
            .await
            .unwrap();

        assert!(!output.is_error);
        let data = output.data.unwrap();
        assert_eq!(data["query"], "attention");
        assert_eq!(data["filters"], json!({"author": "none", "yearRange": "none"}));
        assert_eq!(data["totalResults"], 1);
        assert_eq!(data["results"][0]["Title"], "Attention is all you need");
        assert!(output.text.contains("\"totalResults\": 1"));
    }

    #[tokio::test]
    async fn test_year_order_reported_as_tool_error() {
        let output = provider()
            .call_tool(TOOL_NAME, &json!({"query": "x", "startYear": 2020, "endYear": 2010}))
            .await
            .unwrap();

        assert!(output.is_error);
        assert_eq!(
            output.text,
            "Error searching Google Scholar: Start year cannot be greater than end year"
        );
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_by_schema() {
        let output = provider()
            .call_tool(TOOL_NAME, &json!({"query": "x", "numResults": 50}))
            .await
            .unwrap();

        assert!(output.is_error);
        assert!(output.text.contains("numResults"));
    }
}
