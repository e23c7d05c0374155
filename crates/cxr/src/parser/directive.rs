//! Line-level recognition of preprocessor directives.

use lazy_static::lazy_static;
use regex::Regex;

/// One recognized directive line. The payload strings are kept verbatim
/// (trimmed); nothing is macro-expanded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    Define { name: String, body: String },
    Undef(String),
    Include(String),
    Pragma(String),
    If(String),
    IfDef(String),
    IfNDef(String),
    ElIf(String),
    /// `#else` has no condition grammatically, but any trailing text is
    /// preserved and re-emitted.
    Else(String),
    EndIf,
    /// Anything else (`#error`, `#line`, a stray `#`); the full raw line.
    Unknown(String),
}

impl Directive {
    pub(crate) fn opens_group(&self) -> bool {
        matches!(
            self,
            Directive::If(_) | Directive::IfDef(_) | Directive::IfNDef(_)
        )
    }
}

/// Parses a single source line as a directive. Returns `None` when the
/// line is not a directive at all.
pub(crate) fn parse_directive(line: &str) -> Option<Directive> {
    lazy_static! {
        static ref DIRECTIVE_PATTERN: Regex =
            Regex::new(r"^\s*#\s*([A-Za-z_]+)(?:\s+(.*?))?\s*$").expect("regex must always be valid");
        static ref BARE_HASH: Regex = Regex::new(r"^\s*#\s*$").expect("regex must always be valid");
        static ref DEFINE_PATTERN: Regex =
            Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(?:\([^)]*\))?)\s*(.*)$")
                .expect("regex must always be valid");
    }

    if BARE_HASH.is_match(line) {
        return Some(Directive::Unknown(line.trim_end().to_string()));
    }

    let captures = DIRECTIVE_PATTERN.captures(line)?;
    let key = captures.get(1).map(|x| x.as_str())?;
    let value = captures
        .get(2)
        .map(|x| x.as_str().trim().to_string())
        .unwrap_or_default();

    use Directive::*;
    let directive = match key {
        "define" => {
            let caps = DEFINE_PATTERN.captures(&value)?;
            Define {
                name: caps.get(1).map(|x| x.as_str()).unwrap_or("").to_string(),
                body: caps
                    .get(2)
                    .map(|x| x.as_str().trim().to_string())
                    .unwrap_or_default(),
            }
        }
        "undef" => Undef(value),
        "include" => Include(value),
        "pragma" => Pragma(value),
        "if" => If(value),
        "ifdef" => IfDef(value),
        "ifndef" => IfNDef(value),
        "elif" => ElIf(value),
        "else" => Else(value),
        "endif" => EndIf,
        _ => Unknown(line.trim_end().to_string()),
    };
    Some(directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_directives_pass_through() {
        assert_eq!(parse_directive("int a;"), None);
        assert_eq!(parse_directive("  class A {"), None);
    }

    #[test]
    fn define_splits_name_and_body() {
        assert_eq!(
            parse_directive("#define WX_PREC 2"),
            Some(Directive::Define {
                name: "WX_PREC".into(),
                body: "2".into()
            })
        );
        assert_eq!(
            parse_directive("# define EMPTY"),
            Some(Directive::Define {
                name: "EMPTY".into(),
                body: String::new()
            })
        );
    }

    #[test]
    fn function_like_define_keeps_parameter_list_in_name() {
        assert_eq!(
            parse_directive("#define MIN(a, b) ((a) < (b) ? (a) : (b))"),
            Some(Directive::Define {
                name: "MIN(a, b)".into(),
                body: "((a) < (b) ? (a) : (b))".into()
            })
        );
    }

    #[test]
    fn conditional_family() {
        assert_eq!(
            parse_directive("#if defined(X) && Y"),
            Some(Directive::If("defined(X) && Y".into()))
        );
        assert_eq!(
            parse_directive("#ifdef _WX_PALETTE_H_"),
            Some(Directive::IfDef("_WX_PALETTE_H_".into()))
        );
        assert_eq!(parse_directive("#else"), Some(Directive::Else(String::new())));
        assert_eq!(parse_directive("#endif"), Some(Directive::EndIf));
        assert_eq!(parse_directive("# endif"), Some(Directive::EndIf));
    }

    #[test]
    fn unknown_directives_keep_the_raw_line() {
        assert_eq!(
            parse_directive("#error unsupported platform"),
            Some(Directive::Unknown("#error unsupported platform".into()))
        );
    }
}
