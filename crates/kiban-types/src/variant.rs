//! Block variants and the enums shared by their payloads.
//!
//! `BlockVariant` is the closed set of payload-shape tags. The variant is fixed
//! at block creation and drives everything schema-related: which defaults a new
//! block gets, which validator runs on its data, and which parent/child
//! pairings the tree engine accepts. Payload *contents* stay free-form JSON —
//! the variant only names the shape, the registry enforces it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// What a block *is* (payload shape tag).
///
/// Covers the document surface of the productivity backend: rich-text pages,
/// layout containers, Kanban, tables, lists, AI blocks, and lightweight
/// databases. Adding a variant here means registering a schema for it — the
/// tree engine itself never matches on individual variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum BlockVariant {
    /// Plain paragraph text.
    #[default]
    Text,
    /// Section heading with a level 1–6.
    Heading,
    /// Checkable todo item.
    Todo,
    /// Embedded image.
    Image,
    /// Horizontal rule.
    Divider,
    /// Block quote.
    Quote,
    /// Fenced code with optional language.
    Code,
    /// Ordered or bulleted list container.
    List,
    /// Item inside a list.
    #[serde(rename = "list_item")]
    #[strum(serialize = "list_item", serialize = "listitem")]
    ListItem,
    /// Table container.
    Table,
    /// Row inside a table.
    #[serde(rename = "table_row")]
    #[strum(serialize = "table_row", serialize = "tablerow")]
    TableRow,
    /// Cell inside a table row.
    #[serde(rename = "table_cell")]
    #[strum(serialize = "table_cell", serialize = "tablecell")]
    TableCell,
    /// Top-level document page.
    Page,
    /// Horizontal layout container.
    Row,
    /// Column inside a layout row.
    Column,
    /// Kanban board container.
    #[serde(rename = "kanban_board")]
    #[strum(serialize = "kanban_board", serialize = "kanbanboard")]
    KanbanBoard,
    /// Column (lane) on a Kanban board.
    #[serde(rename = "kanban_column")]
    #[strum(serialize = "kanban_column", serialize = "kanbancolumn")]
    KanbanColumn,
    /// Card inside a Kanban column.
    #[serde(rename = "kanban_card")]
    #[strum(serialize = "kanban_card", serialize = "kanbancard")]
    KanbanCard,
    /// Horizontal swimlane grouping Kanban columns.
    #[serde(rename = "kanban_swimlane")]
    #[strum(serialize = "kanban_swimlane", serialize = "kanbanswimlane")]
    KanbanSwimlane,
    /// Single AI prompt/response exchange.
    #[serde(rename = "ai_block")]
    #[strum(serialize = "ai_block", serialize = "aiblock")]
    AiBlock,
    /// AI conversation container.
    #[serde(rename = "ai_chat")]
    #[strum(serialize = "ai_chat", serialize = "aichat")]
    AiChat,
    /// AI-generated suggestion with a confidence score.
    #[serde(rename = "ai_suggestion")]
    #[strum(serialize = "ai_suggestion", serialize = "aisuggestion")]
    AiSuggestion,
    /// Structured database container.
    Database,
    /// Row inside a database.
    #[serde(rename = "database_row")]
    #[strum(serialize = "database_row", serialize = "databaserow")]
    DatabaseRow,
}

impl BlockVariant {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockVariant::Text => "text",
            BlockVariant::Heading => "heading",
            BlockVariant::Todo => "todo",
            BlockVariant::Image => "image",
            BlockVariant::Divider => "divider",
            BlockVariant::Quote => "quote",
            BlockVariant::Code => "code",
            BlockVariant::List => "list",
            BlockVariant::ListItem => "list_item",
            BlockVariant::Table => "table",
            BlockVariant::TableRow => "table_row",
            BlockVariant::TableCell => "table_cell",
            BlockVariant::Page => "page",
            BlockVariant::Row => "row",
            BlockVariant::Column => "column",
            BlockVariant::KanbanBoard => "kanban_board",
            BlockVariant::KanbanColumn => "kanban_column",
            BlockVariant::KanbanCard => "kanban_card",
            BlockVariant::KanbanSwimlane => "kanban_swimlane",
            BlockVariant::AiBlock => "ai_block",
            BlockVariant::AiChat => "ai_chat",
            BlockVariant::AiSuggestion => "ai_suggestion",
            BlockVariant::Database => "database",
            BlockVariant::DatabaseRow => "database_row",
        }
    }

    /// Check if this is a Kanban-family variant.
    pub fn is_kanban(&self) -> bool {
        matches!(
            self,
            BlockVariant::KanbanBoard
                | BlockVariant::KanbanColumn
                | BlockVariant::KanbanCard
                | BlockVariant::KanbanSwimlane
        )
    }

    /// Check if this is a table-family variant.
    pub fn is_table(&self) -> bool {
        matches!(
            self,
            BlockVariant::Table | BlockVariant::TableRow | BlockVariant::TableCell
        )
    }

    /// Check if this is an AI-family variant.
    pub fn is_ai(&self) -> bool {
        matches!(
            self,
            BlockVariant::AiBlock | BlockVariant::AiChat | BlockVariant::AiSuggestion
        )
    }
}

impl std::fmt::Display for BlockVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority scale shared by todo items and Kanban cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse grouping of variants, used by schema records for palette/UI grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SchemaCategory {
    /// Text-like content blocks.
    Basic,
    /// Images and other embeds.
    Media,
    /// Pages, rows, columns.
    Layout,
    /// Lists and list items.
    List,
    /// Tables, rows, cells.
    Table,
    /// Boards, lanes, cards.
    Kanban,
    /// AI blocks, chats, suggestions.
    Ai,
    /// Databases and database rows.
    Data,
}

impl SchemaCategory {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaCategory::Basic => "basic",
            SchemaCategory::Media => "media",
            SchemaCategory::Layout => "layout",
            SchemaCategory::List => "list",
            SchemaCategory::Table => "table",
            SchemaCategory::Kanban => "kanban",
            SchemaCategory::Ai => "ai",
            SchemaCategory::Data => "data",
        }
    }
}

impl std::fmt::Display for SchemaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =========================================================================
// Tests
// =========================================================================
