//! Text rendering of an inferred hierarchy

use crate::inspect::hierarchy::Hierarchy;

const TITLE: &str = "Dataset Structure Found";
const FIELD_HEADER: &str = "Field";
const TYPE_HEADER: &str = "Type/Hierarchy";

/// Render a two-column table of top-level fields and their type strings.
///
/// Column widths count `char`s, not terminal cells, so double-width text
/// (CJK, most emoji) in field names will misalign the borders.
pub fn render_table(hierarchy: &Hierarchy) -> String {
    let rows: Vec<(String, String)> = hierarchy
        .iter()
        .map(|(name, desc)| (name.to_string(), desc.to_string()))
        .collect();

    let field_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(std::iter::once(FIELD_HEADER.len()))
        .max()
        .unwrap_or(0);
    let type_width = rows
        .iter()
        .map(|(_, ty)| ty.chars().count())
        .chain(std::iter::once(TYPE_HEADER.len()))
        .max()
        .unwrap_or(0);

    let border = format!("+-{}-+-{}-+", "-".repeat(field_width), "-".repeat(type_width));
    let mut out = String::new();

    let table_width = border.chars().count();
    let title_pad = table_width.saturating_sub(TITLE.len()) / 2;
    out.push_str(&" ".repeat(title_pad));
    out.push_str(TITLE);
    out.push('\n');

    out.push_str(&border);
    out.push('\n');
    out.push_str(&row(FIELD_HEADER, field_width, TYPE_HEADER, type_width));
    out.push_str(&border);
    out.push('\n');
    for (name, ty) in &rows {
        out.push_str(&row(name, field_width, ty, type_width));
    }
    out.push_str(&border);
    out.push('\n');

    out
}

fn row(left: &str, left_width: usize, right: &str, right_width: usize) -> String {
    format!(
        "| {}{} | {}{} |\n",
        left,
        " ".repeat(left_width - left.chars().count()),
        right,
        " ".repeat(right_width - right.chars().count()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::analyze;
    use serde_json::json;

    #[test]
    fn test_render_rows() {
        let sample = vec![json!({"id": 1, "meta": {"lang": "en"}, "tags": []})
            .as_object()
            .unwrap()
            .clone()];
        let table = render_table(&analyze(&sample));

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0].trim(), "Dataset Structure Found");
        assert!(lines[2].contains("Field") && lines[2].contains("Type/Hierarchy"));
        assert!(lines[4].starts_with("| id "));
        assert!(lines[5].contains("{lang: str}"));
        assert!(lines[6].contains("List[Empty]"));

        // every body line has the same width
        let widths: Vec<usize> = lines[1..].iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_render_empty() {
        let table = render_table(&Hierarchy::default());
        assert_eq!(table.lines().count(), 5);
    }
}
