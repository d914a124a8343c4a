//! Built-in schema definitions for the productivity-backend block set.
//!
//! One entry per variant: display info, structural constraints, default
//! payload, validator. The constraint table is bidirectional — e.g. `Row`
//! whitelists `Column` children while `Column` whitelists `Row` parents, so
//! a column can never land directly under a page even though pages are open
//! containers.

use serde_json::json;

use kiban_types::{BlockVariant, JsonMap, SchemaCategory};

use crate::schema::BlockSchema;
use crate::validate::{
    optional_bool, optional_int_min, optional_int_range, optional_min_number, optional_priority,
    optional_str, optional_unit_interval, require_json_str, require_non_empty_str,
    require_unit_interval, FieldError,
};

/// Every built-in schema, in registration order.
pub(crate) fn schemas() -> Vec<BlockSchema> {
    use BlockVariant as V;
    use SchemaCategory as C;

    vec![
        // ── Basic content ───────────────────────────────────────────────
        BlockSchema::new(V::Text, "Text", "Plain paragraph text", C::Basic)
            .validator(validate_text),
        BlockSchema::new(V::Heading, "Heading", "Section heading, level 1-6", C::Basic)
            .leaf()
            .defaults(json!({ "level": 1 }))
            .validator(validate_heading),
        BlockSchema::new(V::Todo, "Todo", "Checkable todo item", C::Basic)
            .defaults(json!({ "completed": false }))
            .validator(validate_todo),
        BlockSchema::new(V::Quote, "Quote", "Block quote", C::Basic)
            .validator(validate_quote),
        BlockSchema::new(V::Code, "Code", "Fenced code with a language", C::Basic)
            .leaf()
            .defaults(json!({ "language": "plain" }))
            .validator(validate_code),
        BlockSchema::new(V::Divider, "Divider", "Horizontal rule", C::Basic).leaf(),
        // ── Media ───────────────────────────────────────────────────────
        BlockSchema::new(V::Image, "Image", "Embedded image", C::Media)
            .leaf()
            .validator(validate_image),
        // ── Layout ──────────────────────────────────────────────────────
        BlockSchema::new(V::Page, "Page", "Top-level document page", C::Layout)
            .defaults(json!({ "title": "Untitled" }))
            .validator(validate_page),
        BlockSchema::new(V::Row, "Row", "Horizontal layout container", C::Layout)
            .children(&[V::Column]),
        BlockSchema::new(V::Column, "Column", "Column inside a layout row", C::Layout)
            .parents(&[V::Row])
            .validator(validate_column),
        // ── Lists ───────────────────────────────────────────────────────
        BlockSchema::new(V::List, "List", "Ordered or bulleted list", C::List)
            .children(&[V::ListItem])
            .defaults(json!({ "style": "bulleted" }))
            .validator(validate_list),
        BlockSchema::new(V::ListItem, "List Item", "Item inside a list", C::List)
            .parents(&[V::List, V::ListItem])
            .validator(validate_list_item),
        // ── Tables ──────────────────────────────────────────────────────
        BlockSchema::new(V::Table, "Table", "Table container", C::Table)
            .children(&[V::TableRow])
            .defaults(json!({ "hasHeader": true }))
            .validator(validate_table),
        BlockSchema::new(V::TableRow, "Table Row", "Row inside a table", C::Table)
            .parents(&[V::Table])
            .children(&[V::TableCell]),
        BlockSchema::new(V::TableCell, "Table Cell", "Cell inside a table row", C::Table)
            .parents(&[V::TableRow])
            .validator(validate_table_cell),
        // ── Kanban ──────────────────────────────────────────────────────
        BlockSchema::new(V::KanbanBoard, "Kanban Board", "Board of columns and swimlanes", C::Kanban)
            .children(&[V::KanbanColumn, V::KanbanSwimlane])
            .defaults(json!({ "title": "Untitled Board" }))
            .validator(validate_kanban_board),
        BlockSchema::new(V::KanbanSwimlane, "Kanban Swimlane", "Horizontal grouping of columns", C::Kanban)
            .parents(&[V::KanbanBoard])
            .children(&[V::KanbanColumn])
            .validator(validate_kanban_swimlane),
        BlockSchema::new(V::KanbanColumn, "Kanban Column", "Column (lane) on a board", C::Kanban)
            .parents(&[V::KanbanBoard, V::KanbanSwimlane])
            .children(&[V::KanbanCard])
            .defaults(json!({ "title": "New Column" }))
            .validator(validate_kanban_column),
        BlockSchema::new(V::KanbanCard, "Kanban Card", "Card inside a column", C::Kanban)
            .parents(&[V::KanbanColumn])
            .defaults(json!({ "priority": "medium" }))
            .validator(validate_kanban_card),
        // ── AI ──────────────────────────────────────────────────────────
        BlockSchema::new(V::AiChat, "AI Chat", "AI conversation container", C::Ai)
            .children(&[V::AiBlock, V::AiSuggestion])
            .validator(validate_ai_chat),
        BlockSchema::new(V::AiBlock, "AI Block", "Single prompt/response exchange", C::Ai)
            .leaf()
            .validator(validate_ai_block),
        BlockSchema::new(V::AiSuggestion, "AI Suggestion", "Suggestion with a confidence score", C::Ai)
            .leaf()
            .validator(validate_ai_suggestion),
        // ── Data ────────────────────────────────────────────────────────
        BlockSchema::new(V::Database, "Database", "Structured database container", C::Data)
            .children(&[V::DatabaseRow])
            .defaults(json!({ "properties": "{}" }))
            .validator(validate_database),
        BlockSchema::new(V::DatabaseRow, "Database Row", "Row inside a database", C::Data)
            .parents(&[V::Database])
            .defaults(json!({ "values": "{}" }))
            .validator(validate_database_row),
    ]
}

// =========================================================================
// Validators
// =========================================================================

fn validate_text(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "content", &mut errors);
    errors
}

fn validate_heading(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "content", &mut errors);
    optional_int_range(data, "level", 1, 6, &mut errors);
    errors
}

fn validate_todo(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "content", &mut errors);
    optional_bool(data, "completed", &mut errors);
    optional_priority(data, "priority", &mut errors);
    optional_str(data, "dueDate", &mut errors);
    errors
}

fn validate_quote(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "content", &mut errors);
    optional_str(data, "attribution", &mut errors);
    errors
}

fn validate_code(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "content", &mut errors);
    optional_str(data, "language", &mut errors);
    errors
}

fn validate_image(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "url", &mut errors);
    optional_str(data, "alt", &mut errors);
    optional_min_number(data, "width", 0.0, &mut errors);
    optional_min_number(data, "height", 0.0, &mut errors);
    errors
}

fn validate_page(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "title", &mut errors);
    optional_str(data, "icon", &mut errors);
    errors
}

fn validate_column(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    // Fractional width of the parent row, when the layout pins one.
    optional_min_number(data, "width", 0.0, &mut errors);
    errors
}

fn validate_list(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "style", &mut errors);
    errors
}

fn validate_list_item(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "content", &mut errors);
    errors
}

fn validate_table(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_bool(data, "hasHeader", &mut errors);
    errors
}

fn validate_table_cell(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "content", &mut errors);
    errors
}

fn validate_kanban_board(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "title", &mut errors);
    optional_str(data, "description", &mut errors);
    errors
}

fn validate_kanban_swimlane(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "title", &mut errors);
    errors
}

fn validate_kanban_column(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "title", &mut errors);
    optional_str(data, "color", &mut errors);
    optional_int_min(data, "wipLimit", 0, &mut errors);
    errors
}

fn validate_kanban_card(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "title", &mut errors);
    optional_str(data, "description", &mut errors);
    optional_str(data, "assignee", &mut errors);
    optional_priority(data, "priority", &mut errors);
    optional_min_number(data, "estimatedHours", 0.0, &mut errors);
    errors
}

fn validate_ai_chat(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "title", &mut errors);
    optional_str(data, "model", &mut errors);
    errors
}

fn validate_ai_block(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_non_empty_str(data, "prompt", &mut errors);
    require_non_empty_str(data, "response", &mut errors);
    optional_str(data, "model", &mut errors);
    optional_unit_interval(data, "confidence", &mut errors);
    errors
}

fn validate_ai_suggestion(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "content", &mut errors);
    require_unit_interval(data, "confidence", &mut errors);
    errors
}

fn validate_database(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    optional_str(data, "name", &mut errors);
    require_json_str(data, "properties", &mut errors);
    errors
}

fn validate_database_row(data: &JsonMap) -> Vec<FieldError> {
    let mut errors = Vec::new();
    require_json_str(data, "values", &mut errors);
    errors
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use crate::registry::SchemaRegistry;
    use crate::validate::codes;
    use kiban_types::{BlockVariant, JsonMap};
    use serde_json::json;

    fn map(pairs: &[(&str, serde_json::Value)]) -> JsonMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin()
    }

    #[test]
    fn test_text_requires_content() {
        let r = registry();
        let report = r.validate(BlockVariant::Text, &map(&[]));
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "content");

        let report = r.validate(BlockVariant::Text, &map(&[("content", json!("hi"))]));
        assert!(report.valid);
    }

    #[test]
    fn test_heading_level_bounds() {
        let r = registry();
        for level in 1..=6 {
            let data = map(&[("content", json!("Title")), ("level", json!(level))]);
            assert!(r.validate(BlockVariant::Heading, &data).valid, "level {level}");
        }
        for level in [0, 7, -1] {
            let data = map(&[("content", json!("Title")), ("level", json!(level))]);
            let report = r.validate(BlockVariant::Heading, &data);
            assert!(!report.valid, "level {level}");
            assert_eq!(report.errors[0].code, codes::OUT_OF_RANGE);
        }
    }

    #[test]
    fn test_todo_priority_enum() {
        let r = registry();
        for p in ["low", "medium", "high", "critical"] {
            let data = map(&[("content", json!("task")), ("priority", json!(p))]);
            assert!(r.validate(BlockVariant::Todo, &data).valid, "{p}");
        }
        let data = map(&[("content", json!("task")), ("priority", json!("whenever"))]);
        let report = r.validate(BlockVariant::Todo, &data);
        assert!(!report.valid);
        assert_eq!(report.errors[0].code, codes::INVALID_ENUM);
    }

    #[test]
    fn test_image_dimensions() {
        let r = registry();
        let data = map(&[("url", json!("https://example.com/x.png")), ("width", json!(-10))]);
        let report = r.validate(BlockVariant::Image, &data);
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "width");

        let data = map(&[
            ("url", json!("https://example.com/x.png")),
            ("width", json!(640)),
            ("height", json!(480)),
        ]);
        assert!(r.validate(BlockVariant::Image, &data).valid);
    }

    #[test]
    fn test_kanban_column_wip_limit() {
        let r = registry();
        let report = r.validate(BlockVariant::KanbanColumn, &map(&[("wipLimit", json!(-1))]));
        assert!(!report.valid);

        let report = r.validate(BlockVariant::KanbanColumn, &map(&[("wipLimit", json!(2.5))]));
        assert!(!report.valid);
        assert_eq!(report.errors[0].code, codes::INVALID_TYPE);

        assert!(r.validate(BlockVariant::KanbanColumn, &map(&[("wipLimit", json!(0))])).valid);
        assert!(r.validate(BlockVariant::KanbanColumn, &map(&[])).valid);
    }

    #[test]
    fn test_kanban_card_rules() {
        let r = registry();
        let data = map(&[("estimatedHours", json!(-3))]);
        let report = r.validate(BlockVariant::KanbanCard, &data);
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "estimatedHours");

        let data = map(&[
            ("title", json!("Fix the build")),
            ("priority", json!("critical")),
            ("estimatedHours", json!(1.5)),
        ]);
        assert!(r.validate(BlockVariant::KanbanCard, &data).valid);
    }

    #[test]
    fn test_ai_block_rules() {
        let r = registry();
        let report = r.validate(BlockVariant::AiBlock, &map(&[]));
        assert!(!report.valid);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"prompt"));
        assert!(fields.contains(&"response"));

        let data = map(&[
            ("prompt", json!("summarize")),
            ("response", json!("done")),
            ("confidence", json!(1.5)),
        ]);
        let report = r.validate(BlockVariant::AiBlock, &data);
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "confidence");
    }

    #[test]
    fn test_ai_suggestion_requires_confidence() {
        let r = registry();
        let report = r.validate(BlockVariant::AiSuggestion, &map(&[]));
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "confidence");
        assert_eq!(report.errors[0].code, codes::REQUIRED);

        assert!(r
            .validate(BlockVariant::AiSuggestion, &map(&[("confidence", json!(0.9))]))
            .valid);
    }

    #[test]
    fn test_database_payloads_must_parse() {
        let r = registry();
        // Defaults carry parseable payloads.
        let defaults = r.get(BlockVariant::Database).unwrap().default_data();
        assert!(r.validate(BlockVariant::Database, &defaults).valid);

        let report = r.validate(
            BlockVariant::Database,
            &map(&[("properties", json!("{broken"))]),
        );
        assert!(!report.valid);
        assert_eq!(report.errors[0].code, codes::INVALID_JSON);

        let report = r.validate(
            BlockVariant::DatabaseRow,
            &map(&[("values", json!("[1, 2, 3]"))]),
        );
        assert!(report.valid);
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let r = registry();
        let data = map(&[("level", json!(9))]);
        let report = r.validate(BlockVariant::Heading, &data);
        // Missing content AND out-of-range level, one pass.
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_structural_table_spot_checks() {
        let r = registry();
        // Kanban: board → column → card, cards open underneath.
        assert!(r.can_have_child(BlockVariant::KanbanBoard, BlockVariant::KanbanColumn));
        assert!(r.can_have_child(BlockVariant::KanbanColumn, BlockVariant::KanbanCard));
        assert!(!r.can_have_child(BlockVariant::KanbanBoard, BlockVariant::KanbanCard));
        assert!(r.can_have_child(BlockVariant::KanbanCard, BlockVariant::Todo));
        // Tables: strict three-level nesting.
        assert!(r.can_have_child(BlockVariant::Table, BlockVariant::TableRow));
        assert!(!r.can_have_child(BlockVariant::Table, BlockVariant::TableCell));
        assert!(r.can_have_parent(BlockVariant::TableCell, BlockVariant::TableRow));
        assert!(!r.can_have_parent(BlockVariant::TableRow, BlockVariant::Page));
        // Lists nest through items.
        assert!(r.can_have_parent(BlockVariant::ListItem, BlockVariant::ListItem));
        assert!(!r.can_have_parent(BlockVariant::ListItem, BlockVariant::Page));
    }
}
