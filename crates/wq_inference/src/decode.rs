//! Validating decoder from untrusted model output to `QuizDocument`.
//!
//! The quiz itself is checked strictly: a question count outside 5..=10, a
//! question without exactly four options or with an unknown difficulty is an
//! error. The auxiliary lists are normalized instead: entities are capped at
//! 10 per kind, related topics at 8, and non-list values become empty lists.
//! `sections` always comes from the source document and `id` is always unset.

use serde_json::{Map, Value};
use wq_core::quiz::{MAX_ENTITIES, MAX_QUESTIONS, MAX_RELATED_TOPICS, MIN_QUESTIONS, OPTIONS_PER_QUESTION};
use wq_core::{DecodeError, Difficulty, KeyEntities, QuizDocument, QuizQuestion, SourceDocument};

pub fn decode_quiz(value: Value, source: &SourceDocument) -> Result<QuizDocument, DecodeError> {
    let mut object = match value {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(kind(&other))),
    };

    let quiz = decode_questions(object.remove("quiz"))?;
    let key_entities = decode_entities(object.remove("key_entities"));
    let related_topics = capped_strings(object.remove("related_topics"), MAX_RELATED_TOPICS);

    Ok(QuizDocument {
        id: None,
        url: string_or(object.remove("url"), &source.url),
        title: string_or(object.remove("title"), &source.title),
        summary: string_or(object.remove("summary"), &source.summary),
        key_entities,
        sections: source.sections.clone(),
        quiz,
        related_topics,
    })
}

fn decode_questions(value: Option<Value>) -> Result<Vec<QuizQuestion>, DecodeError> {
    let items = match value {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("quiz".to_string())),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: "quiz".to_string(),
                expected: "a list",
            })
        }
    };

    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&items.len()) {
        return Err(DecodeError::QuestionCount {
            min: MIN_QUESTIONS,
            max: MAX_QUESTIONS,
            got: items.len(),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_question(index, item))
        .collect()
}

fn decode_question(index: usize, value: Value) -> Result<QuizQuestion, DecodeError> {
    let mut object = match value {
        Value::Object(map) => map,
        _ => {
            return Err(DecodeError::WrongType {
                field: format!("quiz[{}]", index),
                expected: "an object",
            })
        }
    };

    let question = required_string(&mut object, index, "question")?;
    let options = decode_options(index, object.remove("options"))?;
    let answer = required_string(&mut object, index, "answer")?;
    let difficulty_label = required_string(&mut object, index, "difficulty")?;
    let difficulty = Difficulty::parse(&difficulty_label).ok_or(DecodeError::Difficulty {
        index,
        value: difficulty_label,
    })?;

    Ok(QuizQuestion {
        question,
        options,
        answer,
        difficulty,
        explanation: optional_string(&mut object, index, "explanation")?,
        section: optional_string(&mut object, index, "section")?,
    })
}

fn decode_options(index: usize, value: Option<Value>) -> Result<Vec<String>, DecodeError> {
    let field = format!("quiz[{}].options", index);
    let items = match value {
        None | Some(Value::Null) => return Err(DecodeError::MissingField(field)),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(DecodeError::WrongType { field, expected: "a list" }),
    };

    if items.len() != OPTIONS_PER_QUESTION {
        return Err(DecodeError::OptionCount {
            index,
            got: items.len(),
        });
    }

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(DecodeError::WrongType {
                field: field.clone(),
                expected: "a list of strings",
            }),
        })
        .collect()
}

fn required_string(object: &mut Map<String, Value>, index: usize, key: &str) -> Result<String, DecodeError> {
    let field = format!("quiz[{}].{}", index, key);
    match object.remove(key) {
        Some(Value::String(s)) => Ok(s),
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(_) => Err(DecodeError::WrongType { field, expected: "a string" }),
    }
}

fn optional_string(object: &mut Map<String, Value>, index: usize, key: &str) -> Result<String, DecodeError> {
    match object.remove(key) {
        Some(Value::String(s)) => Ok(s),
        None | Some(Value::Null) => Ok(String::new()),
        Some(_) => Err(DecodeError::WrongType {
            field: format!("quiz[{}].{}", index, key),
            expected: "a string",
        }),
    }
}

fn decode_entities(value: Option<Value>) -> KeyEntities {
    let mut object = match value {
        Some(Value::Object(map)) => map,
        _ => return KeyEntities::default(),
    };

    KeyEntities {
        people: capped_strings(object.remove("people"), MAX_ENTITIES),
        organizations: capped_strings(object.remove("organizations"), MAX_ENTITIES),
        locations: capped_strings(object.remove("locations"), MAX_ENTITIES),
    }
}

/// First `limit` string items of a list; anything that is not a list yields `[]`.
fn capped_strings(value: Option<Value>, limit: usize) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .take(limit)
            .collect(),
        _ => Vec::new(),
    }
}

fn string_or(value: Option<Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) => s,
        _ => fallback.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
