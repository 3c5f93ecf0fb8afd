use crate::document::PageUnit;
use crate::error::{Result, StudypackError};
use crate::generate::prompts::page_summary_prompt;
use crate::generate::schema::page_summary_schema;
use crate::generate::StructuredGenerator;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Both summary aggregates accumulated over a whole lecture.
#[derive(Debug, Clone)]
pub struct LectureSummary {
    pub concise: String,
    pub detailed: String,
    pub pages: usize,
}

/// Stamp one page's summary for appending to a lecture aggregate.
fn stamp_page(number: usize, text: &str) -> String {
    format!("\n\n#### Page {} Summary:\n{}\n", number, text)
}

/// Summarize a lecture page by page, strictly in order.
///
/// Each page's prompt carries the concise aggregate of every page before
/// it, so a concept explained on page 3 is not re-summarized on page 7.
/// Both aggregate files are rewritten after every page, which keeps them
/// current on disk even if a later page fails. Existing stamped entries
/// are only ever appended to, never rewritten.
pub async fn summarize_pages(
    generator: &dyn StructuredGenerator,
    pages: &[PageUnit],
    concise_file: &Path,
    detailed_file: &Path,
) -> Result<LectureSummary> {
    let schema = page_summary_schema();
    let mut concise = String::new();
    let mut detailed = String::new();

    for page in pages {
        debug!("Summarizing page {}/{}", page.index, pages.len());

        let prompt = page_summary_prompt(&page.text, &concise);
        let value = generator.generate(&prompt, &schema).await?;
        let summary: PageSummaryResponse = serde_json::from_value(value).map_err(|e| {
            StudypackError::Generation(format!("page {} summary malformed: {e}", page.index))
        })?;

        concise.push_str(&stamp_page(page.index, &summary.concise_page_summary));
        detailed.push_str(&stamp_page(page.index, &summary.detail_page_summary));

        fs::write(concise_file, &concise).await?;
        fs::write(detailed_file, &detailed).await?;
    }

    info!("Summarized {} pages", pages.len());

    Ok(LectureSummary {
        concise,
        detailed,
        pages: pages.len(),
    })
}

// Wire type

#[derive(Debug, Deserialize)]
struct PageSummaryResponse {
    detail_page_summary: String,
    concise_page_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct EchoSummarizer {
        prompts: Mutex<Vec<String>>,
    }

    impl EchoSummarizer {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StructuredGenerator for EchoSummarizer {
        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            let n = prompts.len();
            Ok(json!({
                "detail_page_summary": format!("detail {}", n),
                "concise_page_summary": format!("concise {}", n),
            }))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn pages(texts: &[&str]) -> Vec<PageUnit> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| PageUnit {
                index: i + 1,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_stamp_format() {
        assert_eq!(
            stamp_page(3, "the summary"),
            "\n\n#### Page 3 Summary:\nthe summary\n"
        );
    }

    #[tokio::test]
    async fn test_aggregates_are_ordered_stamps() {
        let dir = tempfile::tempdir().unwrap();
        let concise_file = dir.path().join("concise.txt");
        let detailed_file = dir.path().join("detailed.txt");
        let generator = EchoSummarizer::new();

        let summary = summarize_pages(
            &generator,
            &pages(&["first page", "second page"]),
            &concise_file,
            &detailed_file,
        )
        .await
        .unwrap();

        let expected_concise =
            format!("{}{}", stamp_page(1, "concise 1"), stamp_page(2, "concise 2"));
        assert_eq!(summary.concise, expected_concise);
        assert_eq!(summary.pages, 2);

        let on_disk = fs::read_to_string(&concise_file).await.unwrap();
        assert_eq!(on_disk, expected_concise);

        let detailed_on_disk = fs::read_to_string(&detailed_file).await.unwrap();
        assert!(detailed_on_disk.contains("#### Page 1 Summary:\ndetail 1"));
        assert!(detailed_on_disk.contains("#### Page 2 Summary:\ndetail 2"));
    }

    #[tokio::test]
    async fn test_each_page_sees_prior_concise_context() {
        let dir = tempfile::tempdir().unwrap();
        let generator = EchoSummarizer::new();

        summarize_pages(
            &generator,
            &pages(&["alpha body", "beta body", "gamma body"]),
            &dir.path().join("c.txt"),
            &dir.path().join("d.txt"),
        )
        .await
        .unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);

        // Page 1 starts with no context
        assert!(!prompts[0].contains("concise 1"));
        // Page 2 sees page 1's summary but not its raw text
        assert!(prompts[1].contains("concise 1"));
        assert!(prompts[1].contains("beta body"));
        assert!(!prompts[1].contains("alpha body"));
        // Page 3 sees both earlier summaries
        assert!(prompts[2].contains("concise 1"));
        assert!(prompts[2].contains("concise 2"));
    }

    struct FailsOnSecondPage {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl StructuredGenerator for FailsOnSecondPage {
        async fn generate(&self, _prompt: &str, _schema: &Value) -> Result<Value> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls >= 2 {
                return Err(StudypackError::Generation("backend down".to_string()));
            }
            Ok(json!({
                "detail_page_summary": "detail 1",
                "concise_page_summary": "concise 1",
            }))
        }

        fn name(&self) -> &str {
            "fails-on-second"
        }
    }

    #[tokio::test]
    async fn test_failure_leaves_earlier_pages_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let concise_file = dir.path().join("concise.txt");
        let generator = FailsOnSecondPage {
            calls: Mutex::new(0),
        };

        let result = summarize_pages(
            &generator,
            &pages(&["first page", "second page"]),
            &concise_file,
            &dir.path().join("detailed.txt"),
        )
        .await;

        assert!(result.is_err());
        let on_disk = fs::read_to_string(&concise_file).await.unwrap();
        assert_eq!(on_disk, stamp_page(1, "concise 1"));
    }

    #[tokio::test]
    async fn test_empty_page_still_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let generator = EchoSummarizer::new();

        let summary = summarize_pages(
            &generator,
            &pages(&[""]),
            &dir.path().join("c.txt"),
            &dir.path().join("d.txt"),
        )
        .await
        .unwrap();

        assert_eq!(summary.pages, 1);
        assert!(summary.concise.contains("#### Page 1 Summary:"));
    }
}
