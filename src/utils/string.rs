pub fn indent_lines(input: &str, indent_level: usize) -> String {
    let mut output = String::new();

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n')
        }

        let indented_line = format!("{:indent$}{}", "", line, indent = indent_level);
        output.push_str(&indented_line)
    }

    if input.ends_with('\n') {
        output.push('\n')
    }

    output
}

/// Prefix every line with `prefix`, keeping a trailing newline
pub fn indent_with(prefix: &str, input: &str) -> String {
    let mut output = String::new();

    for line in input.split_inclusive('\n') {
        output.push_str(prefix);
        output.push_str(line);
    }

    if input.is_empty() {
        output.push_str(prefix);
    }

    output
}

/// Replace every `{param}` placeholder
pub fn substitute_param(input: &str, param: Option<&str>) -> String {
    match param {
        Some(value) => input.replace("{param}", value),
        None => input.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_lines() {
        assert_eq!(indent_lines("a\nb\n", 2), "  a\n  b\n");
        assert_eq!(indent_lines("a", 3), "   a");
    }

    #[test]
    fn test_indent_with() {
        assert_eq!(indent_with("│ ", "a\nb"), "│ a\n│ b");
        assert_eq!(indent_with("│ ", "a\n"), "│ a\n");
        assert_eq!(indent_with("│ ", ""), "│ ");
    }

    #[test]
    fn test_substitute_param() {
        assert_eq!(
            substitute_param("Input/{param}.cpp", Some("21")),
            "Input/21.cpp"
        );
        assert_eq!(substitute_param("Input/{param}.cpp", None), "Input/{param}.cpp");
    }
}
