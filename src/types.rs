//! Shared data model: learning items, quizzes and the capability trait
//! the scheduling code is generic over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::Level;

// ==================== Constants ====================

/// Options shown in every quiz
pub const OPTION_COUNT: usize = 4;

/// Wrong options shown in every quiz
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Weight of an item that has never been answered
pub const DEFAULT_WEIGHT: f64 = 1.0;

pub type ItemId = i64;

// ==================== Enums ====================

/// Which of the two item collections a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// User-curated items, the target of scheduling
    Personal,
    /// Read-only seed catalog used to backfill distractors
    Reference,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Personal => "personal",
            Collection::Reference => "reference",
        }
    }
}

/// Flashcard family. Fixes how attributes are joined for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// attributes: on-reading, kun-reading, meaning
    Kanji,
    /// attributes: reading, meaning
    Word,
    /// attributes: reading, translation
    Sentence,
}

impl ItemKind {
    pub fn attribute_separator(&self) -> &'static str {
        match self {
            ItemKind::Kanji | ItemKind::Word => " / ",
            ItemKind::Sentence => "\n",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Kanji => "kanji",
            ItemKind::Word => "word",
            ItemKind::Sentence => "sentence",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "kanji" => Some(ItemKind::Kanji),
            "word" => Some(ItemKind::Word),
            "sentence" => Some(ItemKind::Sentence),
            _ => None,
        }
    }
}

/// Which side of an item is the question and which is the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// prompt = primary form, options = joined attributes
    PrimaryToAttributes,
    /// prompt = joined attributes, options = primary form
    AttributesToPrimary,
}

/// How the correct item of a quiz is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizMode {
    /// Uniformly from the resolved candidate pool
    Random,
    /// From the least-mastered items first
    Learning,
}

// ==================== Capability Trait ====================

/// What the scheduler needs to know about a flashcard-like unit
pub trait Recallable {
    fn id(&self) -> ItemId;
    fn level(&self) -> Level;
    fn weight(&self) -> f64;
    /// The prompt-side form (the character or word itself)
    fn primary_text(&self) -> String;
    /// Auxiliary attributes joined with the type's display convention
    fn attribute_text(&self) -> String;

    fn prompt(&self, direction: Direction) -> String {
        match direction {
            Direction::PrimaryToAttributes => self.primary_text(),
            Direction::AttributesToPrimary => self.attribute_text(),
        }
    }

    fn answer(&self, direction: Direction) -> String {
        match direction {
            Direction::PrimaryToAttributes => self.attribute_text(),
            Direction::AttributesToPrimary => self.primary_text(),
        }
    }
}

// ==================== Data Structures ====================

/// One learnable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    /// Unique within its collection only
    pub id: ItemId,
    pub kind: ItemKind,
    pub primary_form: String,
    /// Order is significant and fixed per kind
    pub attributes: Vec<String>,
    pub level: Level,
    /// Mastery-inverse score in [0, 1]; higher = needs more review
    pub weight: f64,
    pub last_updated_at: DateTime<Utc>,
    /// Collection this record was read from
    pub origin: Collection,
}

impl LearningItem {
    pub fn new(
        id: ItemId,
        kind: ItemKind,
        primary_form: impl Into<String>,
        attributes: Vec<String>,
        level: Level,
    ) -> Self {
        Self {
            id,
            kind,
            primary_form: primary_form.into(),
            attributes,
            level,
            weight: DEFAULT_WEIGHT,
            last_updated_at: Utc::now(),
            origin: Collection::Personal,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = crate::weight::sanitize_weight(weight);
        self
    }

    pub fn with_origin(mut self, origin: Collection) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_reference(&self) -> bool {
        self.origin == Collection::Reference
    }

    /// Draft for copying this item into the personal collection
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            kind: self.kind,
            primary_form: self.primary_form.clone(),
            attributes: self.attributes.clone(),
            level: self.level,
        }
    }
}

impl Recallable for LearningItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn level(&self) -> Level {
        self.level
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn primary_text(&self) -> String {
        self.primary_form.clone()
    }

    fn attribute_text(&self) -> String {
        self.attributes.join(self.kind.attribute_separator())
    }
}

/// Content of an item before the store assigns it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub kind: ItemKind,
    pub primary_form: String,
    pub attributes: Vec<String>,
    pub level: Level,
}

/// What the presentation layer asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub level: Level,
    pub direction: Direction,
    pub mode: QuizMode,
}

impl QuizRequest {
    pub fn new(level: Level, direction: Direction, mode: QuizMode) -> Self {
        Self {
            level,
            direction,
            mode,
        }
    }
}

/// A rendered 4-option multiple-choice question. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub prompt: String,
    pub answer: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: usize,
    /// Id of the item the answer belongs to
    pub item_id: ItemId,
    /// Weight of that item when the quiz was built
    pub item_weight: f64,
    /// Level the quiz was requested for
    pub level: Level,
    pub direction: Direction,
    pub is_hybrid: bool,
}

impl Quiz {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn is_correct_choice(&self, index: usize) -> bool {
        index == self.correct_index
    }
}
