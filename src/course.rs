use crate::error::{Result, StudypackError};
use crate::generate::prompts::combine_prompt;
use crate::generate::schema::combined_summary_schema;
use crate::generate::StructuredGenerator;
use crate::questions::QuestionSet;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Everything retained from one finished lecture.
#[derive(Debug, Clone)]
pub struct LectureRecord {
    /// 1-based position in the course.
    pub number: usize,
    pub concise_summary: String,
    pub detailed_summary: String,
    pub questions: QuestionSet,
}

/// Cross-lecture state carried through a request, in course order.
#[derive(Debug, Default)]
pub struct CourseState {
    pub lectures: Vec<LectureRecord>,
    pub combined_summary: String,
}

impl CourseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lecture_count(&self) -> usize {
        self.lectures.len()
    }

    /// Fold a finished lecture into the course.
    ///
    /// The first lecture's concise summary becomes the combined summary
    /// verbatim; every later lecture is merged in by the combiner, which
    /// only ever sees the running summary and the new lecture. The
    /// combined summary file is rewritten on every absorb.
    pub async fn absorb(
        &mut self,
        combiner: &dyn StructuredGenerator,
        record: LectureRecord,
        combined_file: &Path,
    ) -> Result<()> {
        if self.lectures.is_empty() {
            debug!("Lecture {} seeds the combined summary", record.number);
            self.combined_summary = record.concise_summary.clone();
        } else {
            info!(
                "Combining lecture {} into the course summary with {}",
                record.number,
                combiner.name()
            );

            let prompt = combine_prompt(
                &self.combined_summary,
                &record.concise_summary,
                record.number,
            );
            let value = combiner
                .generate(&prompt, &combined_summary_schema())
                .await?;
            let parsed: CombinedSummaryResponse = serde_json::from_value(value).map_err(|e| {
                StudypackError::Generation(format!(
                    "combined summary for lecture {} malformed: {e}",
                    record.number
                ))
            })?;
            self.combined_summary = parsed.combined_summary;
        }

        fs::write(combined_file, &self.combined_summary).await?;
        self.lectures.push(record);
        Ok(())
    }
}

// Wire type

#[derive(Debug, Deserialize)]
struct CombinedSummaryResponse {
    combined_summary: String,
}
