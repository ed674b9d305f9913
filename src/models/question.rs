// src/models/question.rs

use std::{ops::Range, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};

/// `[blankId]` tokens inside cloze text.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("placeholder pattern is valid"));

/// Yields every `[id]` placeholder in `text` as (byte span of the whole token, id).
pub fn placeholders(text: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    PLACEHOLDER.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let id = caps.get(1)?;
        Some((whole.range(), id.as_str()))
    })
}

/// A single question of a form.
///
/// Stored and transmitted as a JSON object discriminated by its `type` field
/// (`categorize`, `cloze` or `comprehension`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Question {
    Categorize(CategorizeQuestion),
    Cloze(ClozeQuestion),
    Comprehension(ComprehensionQuestion),
}

impl Question {
    /// Stable identifier minted at authoring time, if the question has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Question::Categorize(q) => q.id.as_deref(),
            Question::Cloze(q) => q.id.as_deref(),
            Question::Comprehension(q) => q.id.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Question::Categorize(_) => "categorize",
            Question::Cloze(_) => "cloze",
            Question::Comprehension(_) => "comprehension",
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Question::Categorize(q) => q.image_url.as_deref(),
            Question::Cloze(q) => q.image_url.as_deref(),
            Question::Comprehension(q) => q.image_url.as_deref(),
        }
    }
}

/// Drag items into named buckets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub categories: Vec<String>,
    pub items: Vec<CategorizeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CategorizeQuestion {
    pub fn item(&self, item_id: &str) -> Option<&CategorizeItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeItem {
    pub id: String,
    pub text: String,
    /// Must name one of the question's categories when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_category: Option<String>,
}

/// Fill-in-the-blank text. Blanks are referenced from `text` as `[blankId]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClozeQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub blanks: Vec<ClozeBlank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Draggable answer pool. Without it every blank is a free-text input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ClozeQuestion {
    pub fn blank(&self, blank_id: &str) -> Option<&ClozeBlank> {
        self.blanks.iter().find(|blank| blank.id == blank_id)
    }

    /// Ids referenced from `text`, in order of appearance (duplicates kept).
    pub fn placeholder_ids(&self) -> Vec<&str> {
        placeholders(&self.text).map(|(_, id)| id).collect()
    }

    pub fn option_pool(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClozeBlank {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_hint: Option<String>,
}

/// A reading passage followed by single-choice sub-questions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensionQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub passage: String,
    pub questions: Vec<SubQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestion {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    #[serde(deserialize_with = "whole_number")]
    pub correct_index: usize,
}

/// Accepts `1` and `1.0` alike; clients built on JSON numbers send either.
fn whole_number<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_u64() {
        return usize::try_from(n).map_err(de::Error::custom);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && (0.0..=usize::MAX as f64).contains(&f) => Ok(f as usize),
        _ => Err(de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            number
        ))),
    }
}
