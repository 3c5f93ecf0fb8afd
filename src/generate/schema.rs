//! Response schemas declared on every Gemini call. The schema names here
//! are the wire contract: the serde types in `summarize`, `questions` and
//! `course` deserialize exactly these shapes.

use serde_json::{json, Value};

/// Schema for one page's summary pass.
pub fn page_summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "detail_page_summary": { "type": "STRING" },
            "concise_page_summary": { "type": "STRING" }
        },
        "required": ["detail_page_summary", "concise_page_summary"]
    })
}

/// Schema for a full three-tier question set.
pub fn question_set_schema() -> Value {
    let question = json!({
        "type": "OBJECT",
        "properties": {
            "question": { "type": "STRING" },
            "options": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": 4,
                "maxItems": 4
            },
            "correct_answer": { "type": "STRING" },
            "answer_explanation": { "type": "STRING" }
        },
        "required": ["question", "options", "correct_answer", "answer_explanation"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "easy_difficult_questions": { "type": "ARRAY", "items": question.clone() },
            "medium_difficult_questions": { "type": "ARRAY", "items": question.clone() },
            "hard_difficult_questions": { "type": "ARRAY", "items": question }
        },
        "required": [
            "easy_difficult_questions",
            "medium_difficult_questions",
            "hard_difficult_questions"
        ]
    })
}

/// Schema for folding a new lecture into the running course summary.
pub fn combined_summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "combined_summary": { "type": "STRING" }
        },
        "required": ["combined_summary"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_summary_schema_fields() {
        let schema = page_summary_schema();
        assert!(schema["properties"]["detail_page_summary"].is_object());
        assert!(schema["properties"]["concise_page_summary"].is_object());
        assert_eq!(schema["required"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_question_set_schema_tiers() {
        let schema = question_set_schema();
        for tier in [
            "easy_difficult_questions",
            "medium_difficult_questions",
            "hard_difficult_questions",
        ] {
            assert_eq!(schema["properties"][tier]["type"], "ARRAY");
            let item = &schema["properties"][tier]["items"];
            assert_eq!(item["properties"]["options"]["minItems"], 4);
            assert_eq!(item["properties"]["options"]["maxItems"], 4);
        }
    }

    #[test]
    fn test_combined_summary_schema() {
        let schema = combined_summary_schema();
        assert_eq!(
            schema["required"],
            serde_json::json!(["combined_summary"])
        );
    }
}
