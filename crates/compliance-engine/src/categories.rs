//! Display categories for rule identifiers
//!
//! The checker backend reports a `rule_type` per violation. The sidebar and
//! legend group violations by the category looked up here. Rule types that
//! are not in the table land in [`Category::Other`]; they are logged so the
//! table can be extended.

use serde::{Deserialize, Serialize};
use shared_types::Violation;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Margins,
    Font,
    Paragraph,
    Typography,
    Structure,
    Content,
    PageSetup,
    Tables,
    Formulas,
    Other,
}

pub const ALL_CATEGORIES: [Category; 10] = [
    Category::Margins,
    Category::Font,
    Category::Paragraph,
    Category::Typography,
    Category::Structure,
    Category::Content,
    Category::PageSetup,
    Category::Tables,
    Category::Formulas,
    Category::Other,
];

const RULE_CATEGORIES: &[(&str, Category)] = &[
    // Margins
    ("margins", Category::Margins),
    ("margin_left", Category::Margins),
    ("margin_right", Category::Margins),
    ("margin_top", Category::Margins),
    ("margin_bottom", Category::Margins),
    ("gutter", Category::Margins),
    // Font
    ("font_name", Category::Font),
    ("font_size", Category::Font),
    ("font_style", Category::Font),
    ("font_color", Category::Font),
    ("font_bold", Category::Font),
    ("font_italic", Category::Font),
    ("heading_font", Category::Font),
    // Paragraph
    ("line_spacing", Category::Paragraph),
    ("paragraph_indent", Category::Paragraph),
    ("first_line_indent", Category::Paragraph),
    ("paragraph_spacing", Category::Paragraph),
    ("spacing_before", Category::Paragraph),
    ("spacing_after", Category::Paragraph),
    ("alignment", Category::Paragraph),
    ("text_alignment", Category::Paragraph),
    // Typography
    ("double_spaces", Category::Typography),
    ("quotes_style", Category::Typography),
    ("dash_usage", Category::Typography),
    ("hyphenation", Category::Typography),
    ("non_breaking_space", Category::Typography),
    ("trailing_punctuation", Category::Typography),
    // Structure
    ("heading_format", Category::Structure),
    ("heading_numbering", Category::Structure),
    ("heading_style", Category::Structure),
    ("section_order", Category::Structure),
    ("required_section", Category::Structure),
    ("toc_missing", Category::Structure),
    ("title_page", Category::Structure),
    // Content
    ("bibliography_format", Category::Content),
    ("citation_format", Category::Content),
    ("abbreviations", Category::Content),
    ("empty_paragraph", Category::Content),
    ("figure_caption", Category::Content),
    ("figure_numbering", Category::Content),
    ("list_format", Category::Content),
    // Page setup
    ("page_size", Category::PageSetup),
    ("page_orientation", Category::PageSetup),
    ("page_numbering", Category::PageSetup),
    ("page_number_position", Category::PageSetup),
    ("header_footer", Category::PageSetup),
    // Tables
    ("table_caption", Category::Tables),
    ("table_caption_format", Category::Tables),
    ("table_numbering", Category::Tables),
    ("table_reference", Category::Tables),
    ("table_font", Category::Tables),
    ("table_alignment", Category::Tables),
    // Formulas
    ("formula_numbering", Category::Formulas),
    ("formula_alignment", Category::Formulas),
    ("formula_reference", Category::Formulas),
    ("formula_explanation", Category::Formulas),
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Margins => "margins",
            Category::Font => "font",
            Category::Paragraph => "paragraph",
            Category::Typography => "typography",
            Category::Structure => "structure",
            Category::Content => "content",
            Category::PageSetup => "page_setup",
            Category::Tables => "tables",
            Category::Formulas => "formulas",
            Category::Other => "other",
        }
    }

    /// Sidebar heading
    pub fn label(&self) -> &'static str {
        match self {
            Category::Margins => "Поля",
            Category::Font => "Шрифт",
            Category::Paragraph => "Абзац",
            Category::Typography => "Типографика",
            Category::Structure => "Структура",
            Category::Content => "Содержание",
            Category::PageSetup => "Параметры страницы",
            Category::Tables => "Таблицы",
            Category::Formulas => "Формулы",
            Category::Other => "Прочее",
        }
    }

    /// Icon name hint for the legend
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Margins => "border_outer",
            Category::Font => "text_fields",
            Category::Paragraph => "format_align_justify",
            Category::Typography => "format_quote",
            Category::Structure => "account_tree",
            Category::Content => "article",
            Category::PageSetup => "description",
            Category::Tables => "table_chart",
            Category::Formulas => "functions",
            Category::Other => "help_outline",
        }
    }
}

/// Category of a raw rule identifier. Never fails.
pub fn category_for_rule(rule_type: &str) -> Category {
    let rule = rule_type.trim().to_ascii_lowercase();
    match RULE_CATEGORIES.iter().find(|(name, _)| *name == rule) {
        Some((_, category)) => *category,
        None => {
            tracing::warn!(rule_type, "unknown rule type, categorized as other");
            Category::Other
        }
    }
}

pub fn categorize(violation: &Violation) -> Category {
    category_for_rule(&violation.rule_type)
}

/// Violations grouped by category, categories in legend order
pub fn group_by_category<'v>(violations: &'v [Violation]) -> BTreeMap<Category, Vec<&'v Violation>> {
    let mut groups: BTreeMap<Category, Vec<&Violation>> = BTreeMap::new();
    for violation in violations {
        groups.entry(categorize(violation)).or_default().push(violation);
    }
    groups
}
