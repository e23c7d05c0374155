/// Joins backslash-continued lines and strips comments, with one
/// exception: a comment that starts a line (only whitespace before it) is
/// kept verbatim so it can become a doc-comment node downstream. Inline
/// block comments are replaced with a single space; inline `//` comments
/// are dropped to the end of the line. Line endings are normalized to
/// `\n`.
pub(crate) fn process_line_continuations_and_comments(source: &str) -> String {
    let mut spliced = String::with_capacity(source.len());
    {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        let mut chars = normalized.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' && chars.peek() == Some(&'\n') {
                chars.next();
            } else {
                spliced.push(c);
            }
        }
    }

    let bytes: Vec<char> = spliced.chars().collect();
    let mut out = String::with_capacity(spliced.len());
    let mut i = 0;
    // true while everything on the current output line is whitespace
    let mut line_is_blank = true;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            '\n' => {
                out.push(c);
                line_is_blank = true;
                i += 1;
            }
            '"' | '\'' => {
                line_is_blank = false;
                out.push(c);
                i += 1;
                while i < bytes.len() && bytes[i] != c {
                    if bytes[i] == '\\' && i + 1 < bytes.len() {
                        out.push(bytes[i]);
                        i += 1;
                    }
                    if bytes[i] == '\n' {
                        break;
                    }
                    out.push(bytes[i]);
                    i += 1;
                }
                if i < bytes.len() && bytes[i] == c {
                    out.push(c);
                    i += 1;
                }
            }
            '/' if i + 1 < bytes.len() && bytes[i + 1] == '/' => {
                if line_is_blank {
                    while i < bytes.len() && bytes[i] != '\n' {
                        out.push(bytes[i]);
                        i += 1;
                    }
                } else {
                    while i < bytes.len() && bytes[i] != '\n' {
                        i += 1;
                    }
                }
            }
            '/' if i + 1 < bytes.len() && bytes[i + 1] == '*' => {
                let keep = line_is_blank;
                if keep {
                    out.push_str("/*");
                } else {
                    out.push(' ');
                }
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == '*' && i + 1 < bytes.len() && bytes[i + 1] == '/' {
                        if keep {
                            out.push_str("*/");
                        }
                        i += 2;
                        break;
                    }
                    if keep {
                        out.push(bytes[i]);
                    }
                    i += 1;
                }
            }
            _ => {
                if !c.is_whitespace() {
                    line_is_blank = false;
                }
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_continuations() {
        assert_eq!(
            process_line_continuations_and_comments("#define A \\\n1\n"),
            "#define A 1\n"
        );
    }

    #[test]
    fn keeps_full_line_comments() {
        let src = "// heading\nint a;\n";
        assert_eq!(process_line_continuations_and_comments(src), src);
    }

    #[test]
    fn strips_trailing_comments() {
        assert_eq!(
            process_line_continuations_and_comments("int a; // note\n"),
            "int a; \n"
        );
    }

    #[test]
    fn inline_block_comment_becomes_space() {
        assert_eq!(
            process_line_continuations_and_comments("int/* x */a;\n"),
            "int a;\n"
        );
    }

    #[test]
    fn keeps_block_comment_lines() {
        let src = "/* multi\n * line */\nint a;\n";
        assert_eq!(process_line_continuations_and_comments(src), src);
    }

    #[test]
    fn comment_markers_in_strings_survive() {
        let src = "char* c = \"hello /* world */\";\n";
        assert_eq!(process_line_continuations_and_comments(src), src);
    }
}
