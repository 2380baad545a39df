use serde_json::{json, Value};
use wq_core::{GenerationRequest, Result, SourceDocument, SynthesisConfig};

const INSTRUCTIONS: &str = "\
You are an assistant that writes a fact-checked multiple-choice quiz from a Wikipedia article.
Follow ALL rules:
1) Use ONLY the article text given below.
2) Write 5-10 questions with exactly four options each; the answer must repeat one option word for word.
3) Mix easy, medium and hard questions and keep explanations short.
4) Draw questions from the article sections and set \"section\" on every question.
5) List key entities (people, organizations, locations), the top-level sections and a short summary.
6) Suggest 3-8 related Wikipedia topics.
7) Reply with JSON only, matching this schema:
";

/// Schema the model is instructed to follow.
pub fn quiz_schema() -> Value {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });
    json!({
        "type": "object",
        "properties": {
            "url": { "type": "string" },
            "title": { "type": "string" },
            "summary": { "type": "string" },
            "key_entities": {
                "type": "object",
                "properties": {
                    "people": string_list,
                    "organizations": string_list,
                    "locations": string_list
                },
                "required": ["people", "organizations", "locations"]
            },
            "sections": string_list,
            "quiz": {
                "type": "array",
                "minItems": 5,
                "maxItems": 10,
                "items": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string" },
                        "options": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 4,
                            "maxItems": 4
                        },
                        "answer": { "type": "string" },
                        "difficulty": { "type": "string", "enum": ["easy", "medium", "hard"] },
                        "explanation": { "type": "string" },
                        "section": { "type": "string" }
                    },
                    "required": ["question", "options", "answer", "difficulty", "explanation", "section"]
                }
            },
            "related_topics": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 3,
                "maxItems": 8
            }
        },
        "required": ["url", "title", "summary", "key_entities", "sections", "quiz", "related_topics"]
    })
}

/// Summary and body joined, cut to at most `max_chars` characters.
pub fn article_text(doc: &SourceDocument, max_chars: usize) -> String {
    format!("{}\n\n{}", doc.summary, doc.body_text)
        .chars()
        .take(max_chars)
        .collect()
}

pub fn build_prompt(doc: &SourceDocument, schema: &Value, max_chars: usize) -> Result<String> {
    Ok(format!(
        "{INSTRUCTIONS}{schema}\n\n\
         ARTICLE_TITLE: {title}\n\
         ARTICLE_URL: {url}\n\
         ARTICLE_SUMMARY: {summary}\n\
         ARTICLE_SECTIONS: {sections}\n\
         SECTION_TEXTS: {section_texts}\n\
         ARTICLE_TEXT (truncated if very long):\n{article}",
        schema = serde_json::to_string_pretty(schema)?,
        title = doc.title,
        url = doc.url,
        summary = doc.summary,
        sections = doc.sections.join(", "),
        section_texts = serde_json::to_string(&doc.section_text)?,
        article = article_text(doc, max_chars),
    ))
}

pub fn build_request(doc: &SourceDocument, config: &SynthesisConfig) -> Result<GenerationRequest> {
    let schema = quiz_schema();
    let prompt = build_prompt(doc, &schema, config.max_chars)?;
    Ok(GenerationRequest {
        prompt,
        schema,
        temperature: config.temperature,
    })
}
