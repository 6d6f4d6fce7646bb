//! Line formatting helpers shared by the emitter and driver.

/// Indentation unit, one per nesting level.
pub const INDENT: &str = "\t";

/// Indent every non-empty line by `level` units. Blank separator lines stay
/// empty so declaration blocks never carry trailing whitespace.
pub fn indent_lines(lines: Vec<String>, level: usize) -> Vec<String> {
    if level == 0 {
        return lines;
    }
    let prefix = INDENT.repeat(level);
    lines
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                line
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect()
}

/// Sanitize a declaration name: the host's reserved `:` separator is not
/// valid in declaration syntax and becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.replace(':', "_")
}

/// Split a message into trimmed comment lines.
pub fn comment_lines(message: &str) -> Vec<String> {
    message
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                "#".to_string()
            } else {
                format!("# {}", trimmed)
            }
        })
        .collect()
}
