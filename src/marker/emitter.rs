use super::types::{Candidate, Coordinate};

/// Project each candidate to its click point and descriptive fields
pub fn emit_coordinates<N>(candidates: &[Candidate<N>]) -> Vec<Coordinate> {
    candidates
        .iter()
        .map(|candidate| {
            let (x, y) = candidate.bounding_box.center();
            Coordinate {
                x,
                y,
                element_type: candidate.element_type.clone(),
                text: candidate.text.clone(),
                aria_label: candidate.aria_label.clone(),
            }
        })
        .collect()
}

/// Safely truncate a string at character boundaries
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect::<String>() + "..."
    }
}

/// Describe marked elements for an LLM prompt, one line each:
/// `<index> (<type>): "<label>"`
pub fn format_bboxes(bboxes: &[Coordinate]) -> String {
    let mut output = String::new();

    for (index, bbox) in bboxes.iter().enumerate() {
        // Prefer the accessible name, fall back to visible text
        let label = if bbox.aria_label.trim().is_empty() {
            bbox.text.as_str()
        } else {
            bbox.aria_label.as_str()
        };

        let line = format!(
            "{} ({}): \"{}\"",
            index,
            bbox.element_type,
            truncate_str(label.trim(), 60)
        );

        output.push_str(&line);
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinate(element_type: &str, text: &str, aria_label: &str) -> Coordinate {
        Coordinate {
            x: 0.0,
            y: 0.0,
            element_type: element_type.to_string(),
            text: text.to_string(),
            aria_label: aria_label.to_string(),
        }
    }

    #[test]
    fn test_format_prefers_aria_label() {
        let bboxes = vec![
            coordinate("button", "X", "Close dialog"),
            coordinate("a", "Pricing", ""),
            coordinate("input", "", ""),
        ];

        let output = format_bboxes(&bboxes);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "0 (button): \"Close dialog\"");
        assert_eq!(lines[1], "1 (a): \"Pricing\"");
        assert_eq!(lines[2], "2 (input): \"\"");
    }

    #[test]
    fn test_format_truncates_long_text() {
        let long = "é".repeat(80);
        let output = format_bboxes(&[coordinate("a", &long, "")]);
        assert!(output.contains(&format!("{}...", "é".repeat(60))));
    }
}
