//! Prompt builders for every structured generation call. Wording here is
//! load-bearing: the sentinel phrases, the self-containment rules and the
//! word caps are what keep the model output usable downstream.

use crate::questions::QuestionPlan;

/// Prompt for summarizing one page against the cumulative context of all
/// earlier pages.
pub fn page_summary_prompt(page_text: &str, cumulative_concise: &str) -> String {
    format!(
        "You are an expert note maker working through a lecture transcript page by page.\n\
         \n\
         # PREVIOUS PAGES CONTEXT\n\
         {cumulative_concise}\n\
         \n\
         # TASK\n\
         Summarize the current page. Use the previous pages context only to avoid \
         repeating material that is already covered; summarize only what is new on this page.\n\
         \n\
         Rules:\n\
         - Write in clear English prose, regardless of the transcript language.\n\
         - detail_page_summary: a thorough summary preserving definitions, formulas, \
         examples and reasoning steps.\n\
         - concise_page_summary: 2-4 sentences capturing only the essential points.\n\
         - If the page has no content, put \"Empty page\" in both fields.\n\
         - If the page only introduces or wraps up topics covered elsewhere, put \
         \"Transition/overview only\".\n\
         - If the page is only copyright or housekeeping text, put \"Copyright notice\".\n\
         - If everything on the page is already covered by the previous pages context, put \
         \"No new information\".\n\
         \n\
         # CURRENT PAGE CONTENT\n\
         {page_text}"
    )
}

/// Prompt for drafting a full three-tier question set from lecture notes.
pub fn question_prompt(summary: &str, plan: &QuestionPlan) -> String {
    format!(
        "You are an expert examiner creating multiple-choice questions from lecture notes.\n\
         \n\
         # LECTURE NOTES\n\
         {summary}\n\
         \n\
         # TASK\n\
         Create exactly {total} multiple-choice questions from the notes: {per_tier} easy, \
         {per_tier} medium and {per_tier} hard.\n\
         \n\
         Difficulty levels:\n\
         - easy: direct recall of a single stated fact or definition.\n\
         - medium: understanding a concept well enough to apply it or relate two facts.\n\
         - hard: multi-step reasoning, edge cases, or combining several concepts.\n\
         \n\
         Rules for every question:\n\
         - Exactly 4 answer options, with exactly one correct option.\n\
         - Options must be distinct and plausible.\n\
         - No letter or number prefixes on options: write \"Paris\", never \"A. Paris\".\n\
         - correct_answer repeats the correct option verbatim.\n\
         - answer_explanation explains why the correct option is right.\n\
         - Every question must stand on its own. Never reference the notes themselves: \
         no \"according to the text\", \"as mentioned in the lecture\", \"based on the \
         passage\" or similar phrasing.\n\
         - Write everything in English.",
        total = plan.total,
        per_tier = plan.per_tier,
    )
}

/// Prompt for arbitrating between candidate question sets drafted by
/// several models.
pub fn selection_prompt(candidates_json: &str, summary: &str, plan: &QuestionPlan) -> String {
    format!(
        "You are the head examiner reviewing question drafts from several assistants.\n\
         \n\
         # LECTURE NOTES\n\
         {summary}\n\
         \n\
         # CANDIDATE QUESTIONS BY ASSISTANT\n\
         {candidates_json}\n\
         \n\
         # TASK\n\
         Select the best {total} questions overall: exactly {per_tier} easy, {per_tier} \
         medium and {per_tier} hard.\n\
         \n\
         Selection criteria, in priority order:\n\
         - Factual accuracy against the notes.\n\
         - Distractor quality: wrong options plausible to someone who skimmed, clearly \
         wrong to someone who understood.\n\
         - Clarity: one defensible answer, no ambiguous wording.\n\
         - Cognitive level matching the tier: recall for easy, application for medium, \
         multi-step reasoning for hard.\n\
         - Topic diversity across the selected set.\n\
         - Explanation quality.\n\
         \n\
         Rules:\n\
         - Drop duplicates and near-duplicates, keeping the best-worded version.\n\
         - Drop any question that references the notes themselves.\n\
         - No letter or number prefixes on options.\n\
         - You may polish the wording of a selected question, but never change what it tests.\n\
         - Keep every selected question's difficulty tier.",
        total = plan.total,
        per_tier = plan.per_tier,
    )
}

/// Prompt for folding a newly finished lecture into the running course
/// summary.
pub fn combine_prompt(previous_combined: &str, new_summary: &str, lecture_number: usize) -> String {
    format!(
        "You are maintaining one running summary of a lecture course.\n\
         \n\
         # RUNNING COURSE SUMMARY (lectures 1 to {previous_count})\n\
         {previous_combined}\n\
         \n\
         # NEW LECTURE {lecture_number} SUMMARY\n\
         {new_summary}\n\
         \n\
         # TASK\n\
         Merge the new lecture into the running summary.\n\
         \n\
         Rules:\n\
         - Keep the result under 2000 words.\n\
         - Weight the content roughly 50-60% toward the new lecture, compressing older \
         material rather than dropping it.\n\
         - Write smooth transitions so the result reads as one continuous summary, not a \
         list of lectures.\n\
         - Preserve definitions and terminology introduced earlier; later lectures rely on them.",
        previous_count = lecture_number - 1,
    )
}
