//! Fixed instruction, task prompt, and response schema sent to the provider.

use super::SummarizationRequest;
use serde_json::{Value, json};

/// System instruction forcing a single JSON object as output.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional article summarizer. Your response \
must STRICTLY be a single JSON object using the following structure. Do not include any text \
outside the JSON block.";

/// Task prompt placed ahead of the article text.
pub fn task_prompt(language: &str) -> String {
    format!(
        "Summarize the article, extract 3 main keywords, and generate 2 frequently asked \
         questions (FAQs) about the content. Response must be in {language}."
    )
}

/// Response schema: `summary`, `keywords`, and `faqs` are all required, as are each FAQ's
/// `question` and `answer`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "Summary of the article content"
            },
            "keywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "faqs": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "answer": { "type": "STRING" }
                    },
                    "required": ["question", "answer"]
                }
            }
        },
        "required": ["summary", "keywords", "faqs"]
    })
}

/// Assemble the full provider request for an article.
pub fn build_request(article: String, language: &str) -> SummarizationRequest {
    SummarizationRequest {
        instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt: task_prompt(language),
        article,
        schema: response_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::{FaqPair, SummaryResult};

    #[test]
    fn schema_requires_all_top_level_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["summary", "keywords", "faqs"]));
        assert_eq!(schema["properties"]["summary"]["type"], "STRING");
        assert_eq!(schema["properties"]["keywords"]["items"]["type"], "STRING");
    }

    #[test]
    fn faq_items_require_question_and_answer() {
        let schema = response_schema();
        let item = &schema["properties"]["faqs"]["items"];
        assert_eq!(item["type"], "OBJECT");
        assert_eq!(item["required"], json!(["question", "answer"]));
        assert_eq!(item["properties"]["question"]["type"], "STRING");
        assert_eq!(item["properties"]["answer"]["type"], "STRING");
    }

    fn object_keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn required_keys(schema: &Value) -> Vec<String> {
        let mut keys: Vec<String> = schema["required"]
            .as_array()
            .expect("required list")
            .iter()
            .filter_map(|key| key.as_str().map(str::to_string))
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn summary_result_fields_match_schema() {
        let result = SummaryResult {
            summary: "s".into(),
            keywords: vec!["k".into()],
            faqs: vec![FaqPair {
                question: "q".into(),
                answer: "a".into(),
            }],
        };
        let encoded = serde_json::to_value(&result).expect("encode");
        let schema = response_schema();

        assert_eq!(object_keys(&encoded), object_keys(&schema["properties"]));
        assert_eq!(object_keys(&encoded), required_keys(&schema));

        let item_schema = &schema["properties"]["faqs"]["items"];
        assert_eq!(object_keys(&encoded["faqs"][0]), object_keys(&item_schema["properties"]));
        assert_eq!(object_keys(&encoded["faqs"][0]), required_keys(item_schema));
    }

    #[test]
    fn request_embeds_article_verbatim() {
        let article = "  Line one\nLine two  ".to_string();
        let request = build_request(article.clone(), "English");
        assert_eq!(request.article, article);
        assert_eq!(request.instruction, SYSTEM_INSTRUCTION);
        assert!(request.prompt.ends_with("Response must be in English."));
        assert!(request.prompt.contains("3 main keywords"));
    }
}
