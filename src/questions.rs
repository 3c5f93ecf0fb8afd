use crate::error::{Result, StudypackError};
use crate::generate::prompts::{question_prompt, selection_prompt};
use crate::generate::schema::question_set_schema;
use crate::generate::StructuredGenerator;
use crate::sanitize::sanitize_value;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 21;

/// Validated question-count request: the total splits evenly across the
/// easy, medium and hard tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionPlan {
    pub total: usize,
    pub per_tier: usize,
}

impl QuestionPlan {
    pub fn new(total: usize) -> Result<Self> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&total) || total % 3 != 0 {
            return Err(StudypackError::Validation(format!(
                "Number of questions must be a multiple of 3 between {} and {}, got {}",
                MIN_QUESTIONS, MAX_QUESTIONS, total
            )));
        }
        Ok(Self {
            total,
            per_tier: total / 3,
        })
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub answer_explanation: String,
}

/// A full three-tier question set, in its wire shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSet {
    pub easy_difficult_questions: Vec<Question>,
    pub medium_difficult_questions: Vec<Question>,
    pub hard_difficult_questions: Vec<Question>,
}

impl QuestionSet {
    pub fn total(&self) -> usize {
        self.easy_difficult_questions.len()
            + self.medium_difficult_questions.len()
            + self.hard_difficult_questions.len()
    }

    /// Check the set against the plan: even tiers, 4 options per question.
    pub fn verify_shape(&self, plan: &QuestionPlan) -> Result<()> {
        let tiers = [
            ("easy", &self.easy_difficult_questions),
            ("medium", &self.medium_difficult_questions),
            ("hard", &self.hard_difficult_questions),
        ];

        for (tier, tier_questions) in tiers {
            if tier_questions.len() != plan.per_tier {
                return Err(StudypackError::Generation(format!(
                    "selection returned {} {} questions, expected {}",
                    tier_questions.len(),
                    tier,
                    plan.per_tier
                )));
            }
            for question in tier_questions {
                if question.options.len() != 4 {
                    return Err(StudypackError::Generation(format!(
                        "{} question has {} options, expected 4",
                        tier,
                        question.options.len()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Merge candidate sets keyed by the backend that drafted them. A model
/// configured twice gets a numbered key so no draft is lost.
fn merge_candidates(drafts: Vec<(String, QuestionSet)>) -> Result<Value> {
    let mut merged = serde_json::Map::new();

    for (name, set) in drafts {
        let mut key = name.clone();
        let mut n = 2;
        while merged.contains_key(&key) {
            key = format!("{}#{}", name, n);
            n += 1;
        }
        merged.insert(key, serde_json::to_value(&set)?);
    }

    Ok(Value::Object(merged))
}

/// Draft questions on every backend in parallel, then have the selector
/// arbitrate one final set.
///
/// Any backend failing fails the whole operation; the merged candidates
/// and the final selection are both sanitized to plain ASCII before the
/// selection is shape-checked against the plan.
pub async fn generate_question_set(
    pool: &[Arc<dyn StructuredGenerator>],
    selector: &dyn StructuredGenerator,
    summary: &str,
    plan: &QuestionPlan,
) -> Result<QuestionSet> {
    if pool.is_empty() {
        return Err(StudypackError::Generation(
            "no question backends configured".to_string(),
        ));
    }

    let schema = question_set_schema();
    let draft_prompt = question_prompt(summary, plan);

    info!("Drafting questions on {} backends", pool.len());

    let drafts = try_join_all(pool.iter().map(|backend| {
        let draft_prompt = &draft_prompt;
        let schema = &schema;
        async move {
            let value = backend.generate(draft_prompt, schema).await?;
            let set: QuestionSet = serde_json::from_value(value).map_err(|e| {
                StudypackError::Generation(format!("draft from {} malformed: {e}", backend.name()))
            })?;
            debug!("{} drafted {} questions", backend.name(), set.total());
            Ok::<(String, QuestionSet), StudypackError>((backend.name().to_string(), set))
        }
    }))
    .await?;

    let mut candidates = merge_candidates(drafts)?;
    sanitize_value(&mut candidates);

    let select_prompt = selection_prompt(
        &serde_json::to_string_pretty(&candidates)?,
        summary,
        plan,
    );
    let mut selected = selector.generate(&select_prompt, &schema).await?;
    sanitize_value(&mut selected);

    let set: QuestionSet = serde_json::from_value(selected)
        .map_err(|e| StudypackError::Generation(format!("selection malformed: {e}")))?;
    set.verify_shape(plan)?;

    info!("Selected {} questions", set.total());
    Ok(set)
}
