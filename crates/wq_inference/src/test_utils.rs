//! Fixtures shared by the tests of this crate and its dependents.

use serde_json::{json, Value};
use wq_core::{SectionTextBuilder, SourceDocument};

/// A small article with sections `["Introduction", "History", "Legacy"]`.
pub fn source_document() -> SourceDocument {
    let mut builder = SectionTextBuilder::new();
    builder.append("Introduction", "Ada Lovelace was an English mathematician. ");
    builder.open("History");
    builder.append("History", "She worked with Charles Babbage on the Analytical Engine. ");
    builder.open("Legacy");
    builder.append("Legacy", "Ada Lovelace Day is held every October. ");

    SourceDocument {
        url: "https://en.wikipedia.org/wiki/Ada_Lovelace".to_string(),
        title: "Ada Lovelace".to_string(),
        summary: "Ada Lovelace was an English mathematician.".to_string(),
        body_text: "Ada Lovelace was an English mathematician. She worked with Charles Babbage \
                    on the Analytical Engine. Ada Lovelace Day is held every October."
            .to_string(),
        sections: vec!["Introduction".to_string(), "History".to_string(), "Legacy".to_string()],
        section_text: builder.finish(),
    }
}

/// A well-formed question whose answer is its first option.
pub fn question_json(index: usize) -> Value {
    let difficulty = ["easy", "medium", "hard"][index % 3];
    json!({
        "question": format!("Question {}?", index),
        "options": [
            format!("Answer {}", index),
            "Wrong A",
            "Wrong B",
            "Wrong C"
        ],
        "answer": format!("Answer {}", index),
        "difficulty": difficulty,
        "explanation": "Stated in the article.",
        "section": "History"
    })
}

/// A model response with `questions` questions and the usual auxiliary fields.
pub fn quiz_json(questions: usize) -> Value {
    json!({
        "id": null,
        "url": "https://en.wikipedia.org/wiki/Ada_Lovelace",
        "title": "Ada Lovelace",
        "summary": "English mathematician and writer.",
        "key_entities": {
            "people": ["Ada Lovelace", "Charles Babbage"],
            "organizations": [],
            "locations": ["London"]
        },
        "sections": ["Early life"],
        "quiz": (0..questions).map(question_json).collect::<Vec<_>>(),
        "related_topics": ["Analytical Engine", "Charles Babbage", "Computer programming"]
    })
}
