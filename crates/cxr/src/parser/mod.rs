//! Lenient C++ header parser.
//!
//! The parser recovers a structural AST from real-world headers without
//! attempting semantic analysis. It works in three passes: a text pass
//! (line continuations, comments), a line pass (preprocessor directives,
//! configured-conditional elimination), and a token pass (declarations,
//! statements, expressions). Anything the declaration grammar cannot
//! recover survives as an opaque `Blob` or `MacroCall` node, so parsing
//! only fails outright on structurally broken input (unbalanced braces).

mod directive;
mod expr;
mod lexer;
mod utils;

#[cfg(test)]
mod test_parser;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use lang_cxx::ast::*;

use directive::Directive;
use lexer::{Punct, Tok, TokKind};

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("syntax error at line {line}")]
    Syntax { line: usize },
}

/// Pre-parse configuration. All of it is plain owned state scoped to the
/// parser instance that consumes it.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    known_apidecors: HashSet<String>,
    known_macros: HashSet<String>,
    ignorable_macros: HashSet<String>,
    defined_names: HashMap<String, i64>,
    undefined_names: HashSet<String>,
    /// alias identifier -> canonical keyword
    renamed_keywords: HashMap<String, String>,
    enum_body_as_blob: bool,
}

impl ParserConfig {
    pub fn new() -> ParserConfig {
        ParserConfig::default()
    }

    /// Identifiers treated as opaque API decoration, preserved verbatim
    /// and re-emitted before the declared type.
    pub fn add_known_api_decors<I, S>(&mut self, decors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_apidecors.extend(decors.into_iter().map(Into::into));
    }

    /// Identifiers that, in declaration position, are consumed whole as a
    /// `MacroCall` node.
    pub fn add_known_macros<I, S>(&mut self, macros: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_macros.extend(macros.into_iter().map(Into::into));
    }

    /// Identifiers erased from the token stream entirely, along with any
    /// trailing parenthesized argument list.
    pub fn add_ignorable_macros<I, S>(&mut self, macros: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignorable_macros.extend(macros.into_iter().map(Into::into));
    }

    /// A name with a known value, used to decide `#if`/`#ifdef` groups.
    pub fn add_defined_name(&mut self, name: impl Into<String>, value: i64) {
        self.defined_names.insert(name.into(), value);
    }

    /// Names explicitly treated as undefined in conditionals.
    pub fn add_undefined_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.undefined_names.extend(names.into_iter().map(Into::into));
    }

    /// Recognizes `alias` wherever `keyword` would be recognized; handles
    /// vendor spellings like `ADESK_OVERRIDE`.
    pub fn add_renamed_keyword(&mut self, keyword: &str, alias: impl Into<String>) {
        self.renamed_keywords.insert(alias.into(), keyword.to_string());
    }

    /// Keeps enum bodies as one opaque blob instead of parsing items.
    pub fn parse_enum_body_as_blob(&mut self) {
        self.enum_body_as_blob = true;
    }
}

pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Parser {
        Parser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses one file into the root compound of its translation unit.
    pub fn parse_file(&self, path: &Path) -> Result<Obj, Error> {
        let bytes = fs::read(path)?;
        let source = String::from_utf8(bytes)?;
        self.parse_source(&source)
    }

    /// Parses in-memory source into the root compound.
    pub fn parse_source(&self, source: &str) -> Result<Obj, Error> {
        let processed = utils::process_line_continuations_and_comments(source);
        let items = scan_items(&processed);
        let items = eliminate_conditionals(&items, &self.config);
        let elems = tokenize(&items, &self.config);
        let parser = UnitParser {
            cfg: &self.config,
            cur: Cursor::new(&elems),
        };
        parser.parse_unit()
    }
}

// ---------------------------------------------------------------------------
// line pass

#[derive(Debug, Clone)]
enum Item {
    Directive(Directive, usize),
    Comment(String, usize),
    Code(String, usize),
}

fn scan_items(processed: &str) -> Vec<Item> {
    let lines: Vec<&str> = processed.lines().collect();
    let mut items = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let line_no = i + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            i += 1;
            continue;
        }
        if trimmed.starts_with('#') {
            let d = directive::parse_directive(line)
                .unwrap_or_else(|| Directive::Unknown(line.trim_end().to_string()));
            items.push(Item::Directive(d, line_no));
            i += 1;
            continue;
        }
        if trimmed.starts_with("//") {
            items.push(Item::Comment(line.trim_end().to_string(), line_no));
            i += 1;
            continue;
        }
        if trimmed.starts_with("/*") {
            let mut text = String::new();
            loop {
                let l = lines[i];
                if let Some(p) = l.find("*/") {
                    text.push_str(&l[..p + 2]);
                    let rest = &l[p + 2..];
                    items.push(Item::Comment(text, line_no));
                    if !rest.trim().is_empty() {
                        items.push(Item::Code(rest.to_string(), i + 1));
                    }
                    i += 1;
                    break;
                }
                text.push_str(l);
                text.push('\n');
                i += 1;
                if i >= lines.len() {
                    items.push(Item::Comment(text, line_no));
                    break;
                }
            }
            continue;
        }
        items.push(Item::Code(line.to_string(), line_no));
        i += 1;
    }
    items
}

// ---------------------------------------------------------------------------
// configured-conditional elimination

fn lookup_defined(cfg: &ParserConfig, name: &str) -> Option<bool> {
    if cfg.defined_names.contains_key(name) {
        Some(true)
    } else if cfg.undefined_names.contains(name) {
        Some(false)
    } else {
        None
    }
}

fn lookup_value(cfg: &ParserConfig, name: &str) -> Option<bool> {
    if let Some(v) = cfg.defined_names.get(name) {
        Some(*v != 0)
    } else if cfg.undefined_names.contains(name) {
        Some(false)
    } else {
        None
    }
}

/// Best-effort evaluation of an `#if` condition against the configured
/// names. Returns `None` when the configuration cannot decide.
fn eval_cond_text(cfg: &ParserConfig, cond: &str) -> Option<bool> {
    let cond = cond.trim();
    if let Some(rest) = cond.strip_prefix('!') {
        return eval_cond_text(cfg, rest).map(|v| !v);
    }
    if cond.starts_with('(') && cond.ends_with(')') {
        return eval_cond_text(cfg, &cond[1..cond.len() - 1]);
    }
    if let Some(rest) = cond.strip_prefix("defined") {
        let name = rest.trim().trim_start_matches('(').trim_end_matches(')').trim();
        if is_identifier(name) {
            return lookup_defined(cfg, name);
        }
        return None;
    }
    if is_identifier(cond) {
        return lookup_value(cfg, cond);
    }
    if let Ok(v) = cond.parse::<i64>() {
        return Some(v != 0);
    }
    None
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn eval_open_directive(cfg: &ParserConfig, d: &Directive) -> Option<bool> {
    match d {
        Directive::If(cond) => eval_cond_text(cfg, cond),
        Directive::IfDef(name) => lookup_defined(cfg, name),
        Directive::IfNDef(name) => lookup_defined(cfg, name).map(|v| !v),
        _ => None,
    }
}

/// Drops conditional groups the configuration can decide, splicing the
/// taken branch in without its directives. Groups whose first condition is
/// undecidable are kept whole (their nested groups are still processed).
fn eliminate_conditionals(items: &[Item], cfg: &ParserConfig) -> Vec<Item> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if let Item::Directive(d, _) = &items[i] {
            if d.opens_group() {
                if let Some(value) = eval_open_directive(cfg, d) {
                    i = splice_group(items, i, value, cfg, &mut out);
                    continue;
                }
            }
        }
        out.push(items[i].clone());
        i += 1;
    }
    out
}

/// `i` points at a decided opening directive. Pushes the selected branch
/// (recursively eliminated) and returns the index past the matching
/// `#endif`.
fn splice_group(
    items: &[Item],
    mut i: usize,
    first_value: bool,
    cfg: &ParserConfig,
    out: &mut Vec<Item>,
) -> usize {
    let mut selected = first_value;
    let mut taken = first_value;
    i += 1;
    loop {
        let branch_start = i;
        let mut depth = 0usize;
        let boundary = loop {
            if i >= items.len() {
                break None;
            }
            if let Item::Directive(d, _) = &items[i] {
                if d.opens_group() {
                    depth += 1;
                } else if matches!(d, Directive::EndIf) {
                    if depth == 0 {
                        break Some(i);
                    }
                    depth -= 1;
                } else if matches!(d, Directive::ElIf(_) | Directive::Else(_)) && depth == 0 {
                    break Some(i);
                }
            }
            i += 1;
        };
        if selected {
            out.extend(eliminate_conditionals(&items[branch_start..i], cfg));
        }
        let b = match boundary {
            Some(b) => b,
            None => return items.len(),
        };
        match &items[b] {
            Item::Directive(Directive::EndIf, _) => return b + 1,
            Item::Directive(Directive::ElIf(cond), _) => {
                if taken {
                    selected = false;
                } else {
                    selected = eval_cond_text(cfg, cond).unwrap_or(false);
                    taken = taken || selected;
                }
            }
            Item::Directive(Directive::Else(_), _) => {
                selected = !taken;
                taken = true;
            }
            _ => unreachable!("boundary is always a directive"),
        }
        i = b + 1;
    }
}

// ---------------------------------------------------------------------------
// token pass

#[derive(Debug, Clone)]
enum Elem {
    Tok(Tok),
    Directive(Directive, usize),
    Comment(String, usize),
}

fn tokenize(items: &[Item], cfg: &ParserConfig) -> Vec<Elem> {
    let mut elems = Vec::new();
    for item in items {
        match item {
            Item::Code(line, no) => {
                let mut toks = Vec::new();
                lexer::lex_line(line, *no, &mut toks);
                elems.extend(toks.into_iter().map(Elem::Tok));
            }
            Item::Directive(d, no) => elems.push(Elem::Directive(d.clone(), *no)),
            Item::Comment(text, no) => elems.push(Elem::Comment(text.clone(), *no)),
        }
    }
    apply_token_config(elems, cfg)
}

/// Canonicalizes renamed keywords and erases ignorable macros (with any
/// trailing argument list).
fn apply_token_config(elems: Vec<Elem>, cfg: &ParserConfig) -> Vec<Elem> {
    let mut out = Vec::with_capacity(elems.len());
    let mut i = 0;
    while i < elems.len() {
        match &elems[i] {
            Elem::Tok(t) => {
                if let TokKind::Ident(name) = &t.kind {
                    if cfg.ignorable_macros.contains(name) {
                        i += 1;
                        if let Some(Elem::Tok(next)) = elems.get(i) {
                            if next.kind.is_punct(Punct::LParen) {
                                let mut depth = 0usize;
                                while let Some(Elem::Tok(t)) = elems.get(i) {
                                    if t.kind.is_punct(Punct::LParen) {
                                        depth += 1;
                                    } else if t.kind.is_punct(Punct::RParen) {
                                        depth -= 1;
                                        if depth == 0 {
                                            i += 1;
                                            break;
                                        }
                                    }
                                    i += 1;
                                }
                            }
                        }
                        continue;
                    }
                    if let Some(canonical) = cfg.renamed_keywords.get(name) {
                        out.push(Elem::Tok(Tok {
                            kind: TokKind::Ident(canonical.clone()),
                            line: t.line,
                        }));
                        i += 1;
                        continue;
                    }
                }
                out.push(elems[i].clone());
                i += 1;
            }
            _ => {
                out.push(elems[i].clone());
                i += 1;
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// cursor

pub(crate) struct Cursor<'a> {
    elems: &'a [Elem],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(elems: &'a [Elem]) -> Cursor<'a> {
        Cursor { elems, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.elems.len()
    }

    fn peek_elem(&self) -> Option<&'a Elem> {
        self.elems.get(self.pos)
    }

    pub(crate) fn peek_tok(&self) -> Option<&'a TokKind> {
        match self.elems.get(self.pos) {
            Some(Elem::Tok(t)) => Some(&t.kind),
            _ => None,
        }
    }

    /// n-th lookahead, available only while everything up to it is a
    /// plain token.
    pub(crate) fn peek_tok_at(&self, n: usize) -> Option<&'a TokKind> {
        for k in 0..n {
            match self.elems.get(self.pos + k) {
                Some(Elem::Tok(_)) => {}
                _ => return None,
            }
        }
        match self.elems.get(self.pos + n) {
            Some(Elem::Tok(t)) => Some(&t.kind),
            _ => None,
        }
    }

    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn next_tok(&mut self) -> Option<Tok> {
        match self.elems.get(self.pos) {
            Some(Elem::Tok(t)) => {
                self.pos += 1;
                Some(t.clone())
            }
            _ => None,
        }
    }

    pub(crate) fn eat_punct(&mut self, p: Punct) -> bool {
        if self.peek_tok().map_or(false, |t| t.is_punct(p)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_ident(&mut self, name: &str) -> bool {
        if self.peek_tok().map_or(false, |t| t.is_ident(name)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    pub(crate) fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn line(&self) -> usize {
        match self.elems.get(self.pos.min(self.elems.len().saturating_sub(1))) {
            Some(Elem::Tok(t)) => t.line,
            Some(Elem::Directive(_, l)) | Some(Elem::Comment(_, l)) => *l,
            None => 0,
        }
    }

    /// Cursor sits past a `(`. Consumes through the matching `)` and
    /// returns the tokens in between. Stops early at a directive, a
    /// comment, or the end of input.
    pub(crate) fn take_until_matching_rparen(&mut self) -> Vec<Tok> {
        let mut depth = 1usize;
        let mut toks = Vec::new();
        while let Some(Elem::Tok(t)) = self.elems.get(self.pos) {
            if t.kind.is_punct(Punct::LParen) {
                depth += 1;
            } else if t.kind.is_punct(Punct::RParen) {
                depth -= 1;
                if depth == 0 {
                    self.pos += 1;
                    return toks;
                }
            }
            toks.push(t.clone());
            self.pos += 1;
        }
        toks
    }

    /// Cursor sits past a `<`. Consumes through the matching `>` and
    /// returns the tokens in between; `>>` closes two levels. Stops at
    /// `;`, `{`, `}`, directives and comments without consuming them.
    pub(crate) fn take_until_matching_gt(&mut self) -> Vec<Tok> {
        let mut depth = 1usize;
        let mut toks = Vec::new();
        while let Some(Elem::Tok(t)) = self.elems.get(self.pos) {
            if t.kind.is_punct(Punct::Lt) {
                depth += 1;
            } else if t.kind.is_punct(Punct::Gt) {
                depth -= 1;
                if depth == 0 {
                    self.pos += 1;
                    return toks;
                }
            } else if t.kind.is_punct(Punct::Shr) {
                if depth >= 2 {
                    depth -= 2;
                    self.pos += 1;
                    if depth == 0 {
                        toks.push(Tok {
                            kind: TokKind::Punct(Punct::Gt),
                            line: t.line,
                        });
                        return toks;
                    }
                    toks.push(Tok {
                        kind: TokKind::Punct(Punct::Gt),
                        line: t.line,
                    });
                    toks.push(Tok {
                        kind: TokKind::Punct(Punct::Gt),
                        line: t.line,
                    });
                    continue;
                }
                self.pos += 1;
                return toks;
            } else if t.kind.is_punct(Punct::Semi)
                || t.kind.is_punct(Punct::LBrace)
                || t.kind.is_punct(Punct::RBrace)
            {
                return toks;
            }
            toks.push(t.clone());
            self.pos += 1;
        }
        toks
    }

    /// True when a balanced `>` group starts at the current `<` without
    /// crossing a `;` or brace.
    fn gt_group_closed(&self) -> bool {
        let mut depth = 0usize;
        let mut k = self.pos;
        while let Some(Elem::Tok(t)) = self.elems.get(k) {
            if t.kind.is_punct(Punct::Lt) {
                depth += 1;
            } else if t.kind.is_punct(Punct::Gt) {
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            } else if t.kind.is_punct(Punct::Shr) {
                if depth <= 2 {
                    return true;
                }
                depth -= 2;
            } else if t.kind.is_punct(Punct::Semi)
                || t.kind.is_punct(Punct::LBrace)
                || t.kind.is_punct(Punct::RBrace)
            {
                return false;
            }
            k += 1;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// declaration parsing

/// Accumulated prefix of a declaration: template header, attribute
/// keywords and API decoration.
#[derive(Default)]
struct Head {
    attr: Attr,
    template_params: Option<Vec<TemplateParam>>,
    apidecor: Option<String>,
}

impl Head {
    fn push_decor(&mut self, text: String) {
        match &mut self.apidecor {
            Some(d) => {
                d.push(' ');
                d.push_str(&text);
            }
            None => self.apidecor = Some(text),
        }
    }
}

struct UnitParser<'a> {
    cfg: &'a ParserConfig,
    cur: Cursor<'a>,
}

impl<'a> UnitParser<'a> {
    fn parse_unit(mut self) -> Result<Obj, Error> {
        let members = self.parse_members(CompoundType::File, None)?;
        if !self.cur.at_end() {
            // a stray closing brace at file scope
            return Err(Error::Syntax {
                line: self.cur.line(),
            });
        }
        let mut root = Compound::new(CompoundType::File);
        root.members = members;
        Ok(Obj::new(ObjData::Compound(Box::new(root))))
    }

    fn parse_members(
        &mut self,
        scope: CompoundType,
        class_name: Option<&str>,
    ) -> Result<Vec<Obj>, Error> {
        let class_like = matches!(
            scope,
            CompoundType::Class | CompoundType::Struct | CompoundType::Union
        );
        let mut members = Vec::new();
        let mut access = AccessType::Unknown;
        loop {
            match self.cur.peek_elem() {
                None => return Ok(members),
                Some(Elem::Comment(text, _)) => {
                    let doc = text.clone();
                    self.cur.bump();
                    members.push(Obj::with_access(
                        ObjData::DocComment(DocComment { doc }),
                        access,
                    ));
                }
                Some(Elem::Directive(_, _)) => {
                    let obj = self.directive_to_obj();
                    members.push(obj);
                }
                Some(Elem::Tok(t)) => {
                    if t.kind.is_punct(Punct::RBrace) {
                        if scope == CompoundType::File {
                            return Err(Error::Syntax { line: t.line });
                        }
                        return Ok(members);
                    }
                    if t.kind.is_punct(Punct::Semi) {
                        self.cur.bump();
                        continue;
                    }
                    if class_like {
                        if let TokKind::Ident(word) = &t.kind {
                            let label = match word.as_str() {
                                "public" => Some(AccessType::Public),
                                "protected" => Some(AccessType::Protected),
                                "private" => Some(AccessType::Private),
                                _ => None,
                            };
                            if let Some(a) = label {
                                if self
                                    .cur
                                    .peek_tok_at(1)
                                    .map_or(false, |k| k.is_punct(Punct::Colon))
                                {
                                    self.cur.bump();
                                    self.cur.bump();
                                    access = a;
                                    continue;
                                }
                            }
                        }
                    }
                    let mut obj = self.parse_member(class_name)?;
                    obj.access_type = access;
                    members.push(obj);
                }
            }
        }
    }

    fn directive_to_obj(&mut self) -> Obj {
        let d = match self.cur.peek_elem() {
            Some(Elem::Directive(d, _)) => d.clone(),
            _ => unreachable!("caller checked for a directive"),
        };
        self.cur.bump();
        let data = match d {
            Directive::Define { name, body } => {
                ObjData::HashDefine(Define { name, defn: body })
            }
            Directive::Undef(name) => ObjData::HashUndef(Undef { name }),
            Directive::Include(name) => ObjData::HashInclude(Include { name }),
            Directive::Pragma(defn) => ObjData::HashPragma(Pragma { defn }),
            Directive::If(cond) => ObjData::HashIf(HashIf {
                cond_type: CondType::If,
                cond,
            }),
            Directive::IfDef(cond) => ObjData::HashIf(HashIf {
                cond_type: CondType::IfDef,
                cond,
            }),
            Directive::IfNDef(cond) => ObjData::HashIf(HashIf {
                cond_type: CondType::IfNDef,
                cond,
            }),
            Directive::ElIf(cond) => ObjData::HashIf(HashIf {
                cond_type: CondType::ElIf,
                cond,
            }),
            Directive::Else(cond) => ObjData::HashIf(HashIf {
                cond_type: CondType::Else,
                cond,
            }),
            Directive::EndIf => ObjData::HashIf(HashIf {
                cond_type: CondType::EndIf,
                cond: String::new(),
            }),
            Directive::Unknown(raw) => ObjData::Blob(Blob {
                blob: format!("{}\n", raw),
            }),
        };
        Obj::new(data)
    }

    /// One member that starts with a plain token.
    fn parse_member(&mut self, class_name: Option<&str>) -> Result<Obj, Error> {
        if let Some(TokKind::Ident(word)) = self.cur.peek_tok() {
            match word.as_str() {
                "if" => return self.parse_if_block(),
                "while" => return self.parse_while_block(),
                "do" => return self.parse_do_while_block(),
                "for" => return self.parse_for_block(),
                "switch" => return self.parse_switch_block(),
                "return" => return Ok(self.parse_flagged_expr_stmt(ExprFlags::RETURN)),
                "throw" => return Ok(self.parse_flagged_expr_stmt(ExprFlags::THROW)),
                // the expression grammar owns these prefixes
                "delete" | "new" => return Ok(self.fallback_stmt()),
                _ => {}
            }
        }
        self.parse_decl(class_name)
    }

    // -- statements ---------------------------------------------------------

    fn parse_body_part(&mut self) -> Result<Option<Box<Obj>>, Error> {
        if self.cur.eat_punct(Punct::LBrace) {
            let members = self.parse_members(CompoundType::Block, None)?;
            self.cur.eat_punct(Punct::RBrace);
            let mut c = Compound::new(CompoundType::Block);
            c.members = members;
            return Ok(Some(Box::new(Obj::new(ObjData::Compound(Box::new(c))))));
        }
        if self.cur.peek_tok().is_none() {
            return Ok(None);
        }
        let obj = self.parse_member(None)?;
        Ok(Some(Box::new(obj)))
    }

    /// Condition slot of `if`/`while`: a declaration with initializer or a
    /// plain expression. Leaves the closing `)` to the caller.
    fn parse_cond_obj(&mut self) -> Obj {
        let mark = self.cur.mark();
        if let Some(var) = self.try_parse_cond_decl() {
            return var;
        }
        self.cur.reset(mark);
        if let Some(e) = expr::parse_expr_list(&mut self.cur) {
            if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RParen)) {
                return Obj::new(ObjData::Expression(Box::new(e)));
            }
        }
        self.cur.reset(mark);
        // raw text up to the matching `)`
        let mut depth = 0usize;
        let mut toks = Vec::new();
        while let Some(kind) = self.cur.peek_tok() {
            if kind.is_punct(Punct::LParen) {
                depth += 1;
            } else if kind.is_punct(Punct::RParen) {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            toks.push(self.cur.next_tok().unwrap());
        }
        Obj::new(ObjData::Expression(Box::new(Expr::atom(
            lexer::render_tokens(&toks),
        ))))
    }

    fn try_parse_cond_decl(&mut self) -> Option<Obj> {
        let vt = self.parse_var_type(Attr::empty())?;
        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => n.clone(),
            _ => return None,
        };
        self.cur.bump();
        let assign_type = if self.cur.eat_punct(Punct::Assign) {
            AssignType::UsingEqual
        } else if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LParen)) {
            self.cur.bump();
            AssignType::UsingBracket
        } else {
            return None;
        };
        let value = expr::parse_expr(&mut self.cur)?;
        if assign_type == AssignType::UsingBracket && !self.cur.eat_punct(Punct::RParen) {
            return None;
        }
        if !self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RParen)) {
            return None;
        }
        let decl = VarDecl {
            name,
            array_sizes: Vec::new(),
            assign_type,
            assign_value: Some(Box::new(Obj::new(ObjData::Expression(Box::new(value))))),
        };
        Some(Obj::new(ObjData::Var(Box::new(Var {
            apidecor: None,
            var_type: vt,
            decl,
        }))))
    }

    fn parse_if_block(&mut self) -> Result<Obj, Error> {
        self.cur.eat_ident("if");
        self.cur.eat_punct(Punct::LParen);
        let cond = self.parse_cond_obj();
        self.cur.eat_punct(Punct::RParen);
        let body = self.parse_body_part()?;
        let else_part = if self.cur.eat_ident("else") {
            self.parse_body_part()?
        } else {
            None
        };
        Ok(Obj::new(ObjData::IfBlock(Box::new(IfBlock {
            cond: Box::new(cond),
            body,
            else_part,
        }))))
    }

    fn parse_while_block(&mut self) -> Result<Obj, Error> {
        self.cur.eat_ident("while");
        self.cur.eat_punct(Punct::LParen);
        let cond = self.parse_cond_obj();
        self.cur.eat_punct(Punct::RParen);
        let body = self.parse_body_part()?;
        Ok(Obj::new(ObjData::WhileBlock(Box::new(WhileBlock {
            cond: Box::new(cond),
            body,
        }))))
    }

    fn parse_do_while_block(&mut self) -> Result<Obj, Error> {
        self.cur.eat_ident("do");
        let body = self.parse_body_part()?;
        self.cur.eat_ident("while");
        self.cur.eat_punct(Punct::LParen);
        let cond = self.parse_cond_obj();
        self.cur.eat_punct(Punct::RParen);
        self.cur.eat_punct(Punct::Semi);
        Ok(Obj::new(ObjData::DoWhileBlock(Box::new(DoWhileBlock {
            cond: Box::new(cond),
            body,
        }))))
    }

    fn parse_for_block(&mut self) -> Result<Obj, Error> {
        self.cur.eat_ident("for");
        self.cur.eat_punct(Punct::LParen);
        let start = if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
            None
        } else {
            let mark = self.cur.mark();
            match self.try_parse_local_var() {
                Some(v) => Some(Box::new(v)),
                None => {
                    self.cur.reset(mark);
                    expr::parse_expr_list(&mut self.cur)
                        .map(|e| Box::new(Obj::new(ObjData::Expression(Box::new(e)))))
                }
            }
        };
        self.cur.eat_punct(Punct::Semi);
        let stop = if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
            None
        } else {
            expr::parse_expr_list(&mut self.cur)
        };
        self.cur.eat_punct(Punct::Semi);
        let step = if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RParen)) {
            None
        } else {
            expr::parse_expr_list(&mut self.cur)
        };
        self.cur.eat_punct(Punct::RParen);
        let body = self.parse_body_part()?;
        Ok(Obj::new(ObjData::ForBlock(Box::new(ForBlock {
            start,
            stop,
            step,
            body,
        }))))
    }

    /// Local variable without the trailing `;` (for-loop init slot).
    fn try_parse_local_var(&mut self) -> Option<Obj> {
        let vt = self.parse_var_type(Attr::empty())?;
        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => n.clone(),
            _ => return None,
        };
        self.cur.bump();
        let mut decl = VarDecl::named(name);
        if self.cur.eat_punct(Punct::Assign) {
            let value = expr::parse_expr(&mut self.cur)?;
            decl.assign_type = AssignType::UsingEqual;
            decl.assign_value = Some(Box::new(Obj::new(ObjData::Expression(Box::new(value)))));
        }
        if !self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
            return None;
        }
        Some(Obj::new(ObjData::Var(Box::new(Var {
            apidecor: None,
            var_type: vt,
            decl,
        }))))
    }

    fn parse_switch_block(&mut self) -> Result<Obj, Error> {
        self.cur.eat_ident("switch");
        self.cur.eat_punct(Punct::LParen);
        let cond = expr::parse_expr_list(&mut self.cur).unwrap_or_default();
        self.cur.eat_punct(Punct::RParen);
        self.cur.eat_punct(Punct::LBrace);
        let mut cases = Vec::new();
        loop {
            if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RBrace)) {
                self.cur.bump();
                break;
            }
            if self.cur.at_end() {
                break;
            }
            let label = if self.cur.eat_ident("case") {
                let e = expr::parse_expr(&mut self.cur);
                self.cur.eat_punct(Punct::Colon);
                e
            } else if self.cur.eat_ident("default") {
                self.cur.eat_punct(Punct::Colon);
                None
            } else {
                // stray statement outside any case; tolerate by attaching
                // it to an unlabeled default arm
                None
            };
            let mut stmts = Vec::new();
            loop {
                match self.cur.peek_tok() {
                    Some(TokKind::Ident(w)) if w == "case" || w == "default" => break,
                    Some(TokKind::Punct(Punct::RBrace)) => break,
                    None => break,
                    _ => {
                        let obj = self.parse_member(None)?;
                        stmts.push(obj);
                    }
                }
            }
            let body = if stmts.is_empty() {
                None
            } else {
                let mut c = Compound::new(CompoundType::Block);
                c.members = stmts;
                Some(Box::new(c))
            };
            cases.push(SwitchCase { label, body });
        }
        Ok(Obj::new(ObjData::SwitchBlock(Box::new(SwitchBlock {
            cond,
            cases,
        }))))
    }

    fn parse_flagged_expr_stmt(&mut self, flag: ExprFlags) -> Obj {
        self.cur.bump(); // the keyword
        let mut e = if self.cur.peek_tok().map_or(true, |t| t.is_punct(Punct::Semi)) {
            Expr::default()
        } else {
            expr::parse_expr_list(&mut self.cur).unwrap_or_default()
        };
        e.flags |= flag;
        self.cur.eat_punct(Punct::Semi);
        Obj::new(ObjData::Expression(Box::new(e)))
    }

    // -- declarations -------------------------------------------------------

    fn parse_decl(&mut self, class_name: Option<&str>) -> Result<Obj, Error> {
        let start = self.cur.mark();
        match self.try_parse_decl(class_name) {
            Some(obj) => Ok(obj),
            None => {
                self.cur.reset(start);
                Ok(self.fallback_stmt())
            }
        }
    }

    fn try_parse_decl(&mut self, class_name: Option<&str>) -> Option<Obj> {
        let mut head = Head::default();
        let mut is_typedef = false;

        if self.cur.peek_tok().map_or(false, |t| t.is_ident("template")) {
            head.template_params = Some(self.parse_template_header()?);
        }

        loop {
            let word = match self.cur.peek_tok() {
                Some(TokKind::Ident(w)) => w.clone(),
                Some(TokKind::Punct(Punct::Tilde)) => {
                    return self.parse_destructor(head);
                }
                _ => break,
            };
            match word.as_str() {
                "static" => {
                    head.attr |= Attr::STATIC;
                    self.cur.bump();
                }
                "extern" => {
                    self.cur.bump();
                    if let Some(TokKind::Str(s)) = self.cur.peek_tok() {
                        if s == "\"C\"" {
                            self.cur.bump();
                            if self.cur.eat_punct(Punct::LBrace) {
                                return self.parse_extern_c_block();
                            }
                            head.attr |= Attr::EXTERN_C;
                            continue;
                        }
                    }
                    head.attr |= Attr::EXTERN;
                }
                "virtual" => {
                    head.attr |= Attr::VIRTUAL;
                    self.cur.bump();
                }
                "inline" => {
                    head.attr |= Attr::INLINE;
                    self.cur.bump();
                }
                "explicit" => {
                    head.attr |= Attr::EXPLICIT;
                    self.cur.bump();
                }
                "friend" => {
                    head.attr |= Attr::FRIEND;
                    self.cur.bump();
                }
                "typedef" => {
                    is_typedef = true;
                    self.cur.bump();
                }
                "constexpr" | "mutable" => {
                    // not modeled; swallowed
                    self.cur.bump();
                }
                "using" => {
                    self.cur.bump();
                    return self.parse_using(head);
                }
                "enum" => {
                    self.cur.bump();
                    return self.parse_enum(head);
                }
                "namespace" => {
                    self.cur.bump();
                    return self.parse_namespace(head);
                }
                "class" | "struct" | "union" => {
                    self.cur.bump();
                    return self.parse_class_like(head, &word, class_name);
                }
                "operator" => {
                    self.cur.bump();
                    return self.parse_type_converter(head);
                }
                _ => {
                    if self.cfg.known_apidecors.contains(&word) {
                        let text = self.take_decor_text(&word);
                        head.push_decor(text);
                        continue;
                    }
                    if self.cfg.known_macros.contains(&word) {
                        return Some(self.parse_macro_call(&word, class_name));
                    }
                    break;
                }
            }
        }

        self.parse_typed_decl(head, is_typedef, class_name)
    }

    /// Consumes a decoration identifier plus an optional argument list,
    /// returning its literal text.
    fn take_decor_text(&mut self, word: &str) -> String {
        self.cur.bump();
        let mut text = word.to_string();
        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LParen)) {
            self.cur.bump();
            let inner = self.cur.take_until_matching_rparen();
            text.push('(');
            text.push_str(&lexer::render_tokens(&inner));
            text.push(')');
        }
        text
    }

    /// A configured macro invocation in declaration position. When more
    /// declaration tokens follow before the statement ends, the macro was
    /// really decorating a declaration and is kept as its `decor1`.
    fn parse_macro_call(&mut self, word: &str, class_name: Option<&str>) -> Obj {
        let mut text = self.take_decor_text(word);
        let after_macro = self.cur.mark();
        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
            self.cur.bump();
            text.push(';');
        } else if matches!(self.cur.peek_tok(), Some(TokKind::Ident(_))) {
            let mut head = Head::default();
            head.push_decor(text.clone());
            if let Some(obj) = self.parse_typed_decl(head, false, class_name) {
                return obj;
            }
            self.cur.reset(after_macro);
        }
        Obj::new(ObjData::MacroCall(MacroCall { call: text }))
    }

    fn parse_extern_c_block(&mut self) -> Option<Obj> {
        let members = self.parse_members(CompoundType::ExternC, None).ok()?;
        self.cur.eat_punct(Punct::RBrace);
        let mut c = Compound::new(CompoundType::ExternC);
        c.members = members;
        Some(Obj::new(ObjData::Compound(Box::new(c))))
    }

    fn parse_template_header(&mut self) -> Option<Vec<TemplateParam>> {
        self.cur.eat_ident("template");
        if !self.cur.eat_punct(Punct::Lt) {
            return None;
        }
        let mut params = Vec::new();
        loop {
            if self.cur.eat_punct(Punct::Gt) {
                break;
            }
            if self.cur.at_end() {
                return None;
            }
            let param = if self.cur.eat_ident("typename") || self.cur.eat_ident("class") {
                let name = match self.cur.next_tok()?.kind {
                    TokKind::Ident(n) => n,
                    _ => return None,
                };
                TemplateParam {
                    param_type: None,
                    name,
                    default_arg: None,
                }
            } else {
                let vt = self.parse_var_type(Attr::empty())?;
                let name = match self.cur.next_tok()?.kind {
                    TokKind::Ident(n) => n,
                    _ => return None,
                };
                TemplateParam {
                    param_type: Some(vt),
                    name,
                    default_arg: None,
                }
            };
            let param = if self.cur.eat_punct(Punct::Assign) {
                let default = self.take_template_default();
                TemplateParam {
                    default_arg: Some(Box::new(Obj::new(ObjData::Expression(Box::new(
                        Expr::atom(default),
                    ))))),
                    ..param
                }
            } else {
                param
            };
            params.push(param);
            if self.cur.eat_punct(Punct::Comma) {
                continue;
            }
        }
        Some(params)
    }

    /// Raw default-argument text inside a template header, up to the next
    /// `,` or the closing `>` (both left unconsumed).
    fn take_template_default(&mut self) -> String {
        let mut depth = 0usize;
        let mut toks = Vec::new();
        while let Some(kind) = self.cur.peek_tok() {
            match kind {
                TokKind::Punct(Punct::Lt) | TokKind::Punct(Punct::LParen) => depth += 1,
                TokKind::Punct(Punct::Gt) | TokKind::Punct(Punct::RParen) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokKind::Punct(Punct::Comma) if depth == 0 => break,
                TokKind::Punct(Punct::Semi) => break,
                _ => {}
            }
            toks.push(self.cur.next_tok().unwrap());
        }
        lexer::render_tokens(&toks)
    }

    fn parse_using(&mut self, head: Head) -> Option<Obj> {
        if self.cur.eat_ident("namespace") {
            let name = self.parse_qualified_name()?;
            self.cur.eat_punct(Punct::Semi);
            return Some(Obj::new(ObjData::UsingDecl(Box::new(UsingDecl {
                name: format!("namespace {}", name),
                template_params: head.template_params,
                target: None,
            }))));
        }
        let name = self.parse_qualified_name()?;
        let target = if self.cur.eat_punct(Punct::Assign) {
            let mark = self.cur.mark();
            match self.parse_var_type(Attr::empty()) {
                Some(vt)
                    if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) =>
                {
                    Some(Box::new(Obj::new(ObjData::VarType(Box::new(vt)))))
                }
                _ => {
                    self.cur.reset(mark);
                    let toks = self.take_stmt_tokens();
                    Some(Box::new(Obj::new(ObjData::VarType(Box::new(
                        VarType::named(lexer::render_tokens(&toks)),
                    )))))
                }
            }
        } else {
            None
        };
        self.cur.eat_punct(Punct::Semi);
        Some(Obj::new(ObjData::UsingDecl(Box::new(UsingDecl {
            name,
            template_params: head.template_params,
            target,
        }))))
    }

    /// Tokens up to (not including) the statement-ending `;`.
    fn take_stmt_tokens(&mut self) -> Vec<Tok> {
        let mut toks = Vec::new();
        while let Some(kind) = self.cur.peek_tok() {
            if kind.is_punct(Punct::Semi) {
                break;
            }
            toks.push(self.cur.next_tok().unwrap());
        }
        toks
    }

    fn parse_namespace(&mut self, _head: Head) -> Option<Obj> {
        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => {
                let n = n.clone();
                self.cur.bump();
                Some(n)
            }
            _ => None,
        };
        if !self.cur.eat_punct(Punct::LBrace) {
            return None;
        }
        let members = self.parse_members(CompoundType::Namespace, None).ok()?;
        self.cur.eat_punct(Punct::RBrace);
        let mut c = Compound::new(CompoundType::Namespace);
        c.name = name;
        c.members = members;
        Some(Obj::new(ObjData::Compound(Box::new(c))))
    }

    fn parse_enum(&mut self, head: Head) -> Option<Obj> {
        let is_class = self.cur.eat_ident("class") || self.cur.eat_ident("struct");
        if let Some(TokKind::Ident(w)) = self.cur.peek_tok() {
            if self.cfg.known_apidecors.contains(w) {
                let w = w.clone();
                log::debug!("parse_enum: dropping decoration {}", w);
                self.take_decor_text(&w);
            }
        }
        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => {
                let n = n.clone();
                self.cur.bump();
                n
            }
            _ => String::new(),
        };
        let underlying = if self.cur.eat_punct(Punct::Colon) {
            let mut toks = Vec::new();
            while let Some(kind) = self.cur.peek_tok() {
                if kind.is_punct(Punct::LBrace) || kind.is_punct(Punct::Semi) {
                    break;
                }
                toks.push(self.cur.next_tok().unwrap());
            }
            Some(lexer::render_tokens(&toks))
        } else {
            None
        };
        let _ = head;
        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
            self.cur.bump();
            return Some(Obj::new(ObjData::Enum(Box::new(EnumDecl {
                name,
                is_class,
                underlying,
                items: None,
            }))));
        }
        if !self.cur.eat_punct(Punct::LBrace) {
            return None;
        }
        let items = if self.cfg.enum_body_as_blob {
            vec![EnumItem::Embedded(Box::new(Obj::new(ObjData::Blob(Blob {
                blob: self.take_enum_body_blob(),
            }))))]
        } else {
            self.parse_enum_items()?
        };
        self.cur.eat_punct(Punct::Semi);
        Some(Obj::new(ObjData::Enum(Box::new(EnumDecl {
            name,
            is_class,
            underlying,
            items: Some(items),
        }))))
    }

    fn parse_enum_items(&mut self) -> Option<Vec<EnumItem>> {
        let mut items = Vec::new();
        loop {
            match self.cur.peek_elem() {
                None => return Some(items),
                Some(Elem::Comment(text, _)) => {
                    let doc = text.clone();
                    self.cur.bump();
                    items.push(EnumItem::Embedded(Box::new(Obj::new(ObjData::DocComment(
                        DocComment { doc },
                    )))));
                }
                Some(Elem::Directive(_, _)) => {
                    let obj = self.directive_to_obj();
                    items.push(EnumItem::Embedded(Box::new(obj)));
                }
                Some(Elem::Tok(t)) => {
                    if t.kind.is_punct(Punct::RBrace) {
                        self.cur.bump();
                        return Some(items);
                    }
                    if t.kind.is_punct(Punct::Comma) {
                        self.cur.bump();
                        continue;
                    }
                    let name = match &t.kind {
                        TokKind::Ident(n) => n.clone(),
                        _ => return None,
                    };
                    self.cur.bump();
                    if self.cur.peek_tok().map_or(false, |k| k.is_punct(Punct::LParen)) {
                        // macro-generated enumerator
                        self.cur.bump();
                        let inner = self.cur.take_until_matching_rparen();
                        let call =
                            format!("{}({})", name, lexer::render_tokens(&inner));
                        items.push(EnumItem::Embedded(Box::new(Obj::new(
                            ObjData::MacroCall(MacroCall { call }),
                        ))));
                        continue;
                    }
                    let val = if self.cur.eat_punct(Punct::Assign) {
                        expr::parse_expr(&mut self.cur)
                            .or_else(|| Some(Expr::atom(lexer::render_tokens(
                                &self.take_enum_value_tokens(),
                            ))))
                    } else {
                        None
                    };
                    items.push(EnumItem::Named { name, val });
                }
            }
        }
    }

    fn take_enum_value_tokens(&mut self) -> Vec<Tok> {
        let mut depth = 0usize;
        let mut toks = Vec::new();
        while let Some(kind) = self.cur.peek_tok() {
            match kind {
                TokKind::Punct(Punct::LParen) => depth += 1,
                TokKind::Punct(Punct::RParen) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokKind::Punct(Punct::Comma) | TokKind::Punct(Punct::RBrace) if depth == 0 => {
                    break
                }
                _ => {}
            }
            toks.push(self.cur.next_tok().unwrap());
        }
        toks
    }

    /// Opaque enum body: everything through the matching `}` rendered as
    /// text, one source line per output line.
    fn take_enum_body_blob(&mut self) -> String {
        let mut depth = 1usize;
        let mut lines: Vec<(usize, Vec<Tok>)> = Vec::new();
        let mut extra = Vec::new();
        loop {
            match self.cur.peek_elem() {
                None => break,
                Some(Elem::Comment(text, _)) => {
                    extra.push(text.clone());
                    self.cur.bump();
                }
                Some(Elem::Directive(_, _)) => {
                    // rendered from the node form below
                    let obj = self.directive_to_obj();
                    let mut buf = Vec::new();
                    let mut writer = crate::emit::Writer::new();
                    let _ = writer.emit(&obj, &mut buf, crate::emit::Indent::default());
                    extra.push(String::from_utf8_lossy(&buf).trim_end().to_string());
                }
                Some(Elem::Tok(t)) => {
                    if t.kind.is_punct(Punct::LBrace) {
                        depth += 1;
                    } else if t.kind.is_punct(Punct::RBrace) {
                        depth -= 1;
                        if depth == 0 {
                            self.cur.bump();
                            break;
                        }
                    }
                    let tok = self.cur.next_tok().unwrap();
                    match lines.last_mut() {
                        Some((line, toks)) if *line == tok.line => toks.push(tok),
                        _ => lines.push((tok.line, vec![tok])),
                    }
                }
            }
        }
        let mut text = String::new();
        for (_, toks) in &lines {
            text.push_str(&lexer::render_tokens(toks));
            text.push('\n');
        }
        for l in extra {
            text.push_str(&l);
            text.push('\n');
        }
        text
    }

    fn parse_class_like(
        &mut self,
        head: Head,
        keyword: &str,
        _outer_class: Option<&str>,
    ) -> Option<Obj> {
        let cmp_type = match keyword {
            "class" => CompoundType::Class,
            "struct" => CompoundType::Struct,
            _ => CompoundType::Union,
        };
        let mut head = head;
        while let Some(TokKind::Ident(w)) = self.cur.peek_tok() {
            if self.cfg.known_apidecors.contains(w) {
                let w = w.clone();
                let text = self.take_decor_text(&w);
                head.push_decor(text);
            } else {
                break;
            }
        }
        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => {
                let n = n.clone();
                self.cur.bump();
                Some(n)
            }
            _ => None,
        };

        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
            self.cur.bump();
            return Some(Obj::new(ObjData::FwdClsDecl(FwdClsDecl {
                attr: head.attr,
                template_params: head.template_params,
                cmp_type,
                apidecor: head.apidecor,
                name: name.unwrap_or_default(),
            })));
        }

        // `struct tm buf;` -- an elaborated type in front of a declarator
        if let (Some(n), Some(TokKind::Ident(_))) = (&name, self.cur.peek_tok()) {
            let vt = VarType::named(format!("{} {}", keyword, n));
            return self.parse_declarators(head, vt, false, None);
        }

        let inheritance = if self.cur.eat_punct(Punct::Colon) {
            let mut list = Vec::new();
            loop {
                self.cur.eat_ident("virtual");
                let access = if self.cur.eat_ident("public") {
                    AccessType::Public
                } else if self.cur.eat_ident("protected") {
                    AccessType::Protected
                } else if self.cur.eat_ident("private") {
                    AccessType::Private
                } else {
                    AccessType::Public
                };
                let base = self.parse_qualified_name()?;
                list.push(InheritanceItem { access, base });
                if !self.cur.eat_punct(Punct::Comma) {
                    break;
                }
            }
            Some(list)
        } else {
            None
        };

        if !self.cur.eat_punct(Punct::LBrace) {
            return None;
        }
        let members = self
            .parse_members(cmp_type, name.as_deref())
            .ok()?;
        self.cur.eat_punct(Punct::RBrace);

        let mut c = Compound::new(cmp_type);
        c.template_params = head.template_params;
        c.apidecor = head.apidecor;
        c.name = name;
        c.inheritance = inheritance;
        c.members = members;
        let compound = Obj::new(ObjData::Compound(Box::new(c)));

        // `struct { ... } instance;`
        if let Some(TokKind::Ident(n)) = self.cur.peek_tok() {
            let n = n.clone();
            self.cur.bump();
            self.cur.eat_punct(Punct::Semi);
            return Some(Obj::new(ObjData::Var(Box::new(Var {
                apidecor: None,
                var_type: VarType {
                    attr: Attr::empty(),
                    base: TypeBase::Compound(Box::new(compound)),
                    modifier: TypeModifier::default(),
                },
                decl: VarDecl::named(n),
            }))));
        }
        self.cur.eat_punct(Punct::Semi);
        Some(compound)
    }

    fn parse_type_converter(&mut self, head: Head) -> Option<Obj> {
        let to = self.parse_var_type(Attr::empty())?;
        if !self.cur.eat_punct(Punct::LParen) {
            return None;
        }
        self.cur.eat_punct(Punct::RParen);
        let mut attr = head.attr;
        if self.cur.eat_ident("const") {
            attr |= Attr::CONST;
        }
        let defn = self.parse_optional_body()?;
        Some(Obj::new(ObjData::TypeConverter(Box::new(TypeConverter {
            attr,
            template_params: head.template_params,
            to: Box::new(to),
            defn,
        }))))
    }

    fn parse_destructor(&mut self, head: Head) -> Option<Obj> {
        self.cur.eat_punct(Punct::Tilde);
        let name = match self.cur.next_tok()?.kind {
            TokKind::Ident(n) => n,
            _ => return None,
        };
        if !self.cur.eat_punct(Punct::LParen) {
            return None;
        }
        self.cur.eat_punct(Punct::RParen);
        self.swallow_exception_spec();
        let defn = self.parse_optional_body()?;
        Some(Obj::new(ObjData::Destructor(Box::new(Destructor {
            attr: head.attr,
            template_params: head.template_params,
            decor1: head.apidecor,
            name: format!("~{}", name),
            defn,
        }))))
    }

    /// `;` or a brace-wrapped body.
    fn parse_optional_body(&mut self) -> Option<Option<Box<Compound>>> {
        if self.cur.eat_punct(Punct::Semi) {
            return Some(None);
        }
        if self.cur.eat_punct(Punct::LBrace) {
            let members = self.parse_members(CompoundType::Block, None).ok()?;
            self.cur.eat_punct(Punct::RBrace);
            let mut c = Compound::new(CompoundType::Block);
            c.members = members;
            return Some(Some(Box::new(c)));
        }
        None
    }

    fn swallow_exception_spec(&mut self) {
        loop {
            if self.cur.peek_tok().map_or(false, |t| t.is_ident("noexcept"))
                || self.cur.peek_tok().map_or(false, |t| t.is_ident("throw"))
            {
                self.cur.bump();
                if self.cur.eat_punct(Punct::LParen) {
                    self.cur.take_until_matching_rparen();
                }
            } else {
                return;
            }
        }
    }

    fn parse_typed_decl(
        &mut self,
        head: Head,
        is_typedef: bool,
        class_name: Option<&str>,
    ) -> Option<Obj> {
        let vt = self.parse_var_type(head.attr)?;

        // constructor: the "type" is the enclosing class name and a
        // parameter list follows
        if let (Some(cls), TypeBase::Name(base)) = (class_name, &vt.base) {
            if base == cls
                && vt.modifier == TypeModifier::default()
                && self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LParen))
            {
                return self.parse_constructor(head, base.clone());
            }
        }

        self.parse_declarators(head, vt, is_typedef, class_name)
    }

    fn parse_constructor(&mut self, head: Head, name: String) -> Option<Obj> {
        self.cur.eat_punct(Punct::LParen);
        let params = self.parse_param_list()?;
        self.swallow_exception_spec();
        let mem_inits = if self.cur.eat_punct(Punct::Colon) {
            let mut inits = Vec::new();
            loop {
                let member = match self.cur.next_tok()?.kind {
                    TokKind::Ident(n) => n,
                    _ => return None,
                };
                if !self.cur.eat_punct(Punct::LParen) {
                    return None;
                }
                let init = expr::parse_expr_list(&mut self.cur).unwrap_or_default();
                self.cur.eat_punct(Punct::RParen);
                inits.push(MemInit { member, init });
                if !self.cur.eat_punct(Punct::Comma) {
                    break;
                }
            }
            Some(inits)
        } else {
            None
        };
        let mut attr = head.attr;
        if self.cur.eat_punct(Punct::Assign) {
            if self.cur.eat_ident("delete") {
                attr |= Attr::DELETED;
                self.cur.eat_punct(Punct::Semi);
                return Some(Obj::new(ObjData::Constructor(Box::new(Constructor {
                    attr,
                    template_params: head.template_params,
                    decor1: head.apidecor,
                    name,
                    params,
                    mem_inits,
                    defn: None,
                }))));
            }
            // "= default" and friends have no structural form
            return None;
        }
        let defn = self.parse_optional_body()?;
        Some(Obj::new(ObjData::Constructor(Box::new(Constructor {
            attr,
            template_params: head.template_params,
            decor1: head.apidecor,
            name,
            params,
            mem_inits,
            defn,
        }))))
    }

    fn parse_param_list(&mut self) -> Option<Option<Vec<Obj>>> {
        if self.cur.eat_punct(Punct::RParen) {
            return Some(None);
        }
        let mut params = Vec::new();
        loop {
            let param = self.parse_param()?;
            params.push(param);
            if self.cur.eat_punct(Punct::Comma) {
                continue;
            }
            if self.cur.eat_punct(Punct::RParen) {
                break;
            }
            return None;
        }
        Some(Some(params))
    }

    fn parse_param(&mut self) -> Option<Obj> {
        if self.cur.eat_punct(Punct::Ellipsis) {
            let mut vt = VarType::named("...");
            vt.attr |= Attr::FUNC_PARAM;
            return Some(Obj::new(ObjData::Var(Box::new(Var {
                apidecor: None,
                var_type: vt,
                decl: VarDecl::default(),
            }))));
        }
        let mark = self.cur.mark();
        if let Some(obj) = self.try_parse_structured_param() {
            return Some(obj);
        }
        self.cur.reset(mark);
        // raw fallback: capture this argument verbatim
        let mut depth = 0usize;
        let mut toks = Vec::new();
        while let Some(kind) = self.cur.peek_tok() {
            match kind {
                TokKind::Punct(Punct::LParen) => depth += 1,
                TokKind::Punct(Punct::RParen) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokKind::Punct(Punct::Comma) if depth == 0 => break,
                _ => {}
            }
            toks.push(self.cur.next_tok().unwrap());
        }
        if toks.is_empty() {
            return None;
        }
        let mut vt = VarType::named(lexer::render_tokens(&toks));
        vt.attr |= Attr::FUNC_PARAM;
        Some(Obj::new(ObjData::Var(Box::new(Var {
            apidecor: None,
            var_type: vt,
            decl: VarDecl::default(),
        }))))
    }

    fn try_parse_structured_param(&mut self) -> Option<Obj> {
        let mut apidecor = None;
        if let Some(TokKind::Ident(w)) = self.cur.peek_tok() {
            if self.cfg.known_apidecors.contains(w) {
                let w = w.clone();
                apidecor = Some(self.take_decor_text(&w));
            }
        }
        let mut vt = self.parse_var_type(Attr::empty())?;
        vt.attr |= Attr::FUNC_PARAM;

        // function-pointer parameter: `ret (*name)(args)`
        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LParen))
            && self
                .cur
                .peek_tok_at(1)
                .map_or(false, |t| t.is_punct(Punct::Star))
        {
            return self.parse_function_ptr(Head::default(), vt, Attr::FUNC_PARAM);
        }

        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => {
                let n = n.clone();
                self.cur.bump();
                n
            }
            _ => String::new(),
        };
        let mut decl = VarDecl::named(name);
        while self.cur.eat_punct(Punct::LBracket) {
            let size = if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RBracket)) {
                None
            } else {
                expr::parse_expr(&mut self.cur)
            };
            if !self.cur.eat_punct(Punct::RBracket) {
                return None;
            }
            decl.array_sizes.push(size);
        }
        if self.cur.eat_punct(Punct::Assign) {
            let value = expr::parse_expr(&mut self.cur)?;
            decl.assign_type = AssignType::UsingEqual;
            decl.assign_value = Some(Box::new(Obj::new(ObjData::Expression(Box::new(value)))));
        }
        match self.cur.peek_tok() {
            Some(TokKind::Punct(Punct::Comma)) | Some(TokKind::Punct(Punct::RParen)) => {
                Some(Obj::new(ObjData::Var(Box::new(Var {
                    apidecor,
                    var_type: vt,
                    decl,
                }))))
            }
            _ => None,
        }
    }

    /// Cursor sits on the `(` of `(*name)`. Builds a function-pointer
    /// node, `extra_attr` marking parameter position.
    fn parse_function_ptr(&mut self, head: Head, ret: VarType, extra_attr: Attr) -> Option<Obj> {
        self.cur.eat_punct(Punct::LParen);
        if !self.cur.eat_punct(Punct::Star) {
            return None;
        }
        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => {
                let n = n.clone();
                self.cur.bump();
                n
            }
            _ => String::new(),
        };
        if !self.cur.eat_punct(Punct::RParen) {
            return None;
        }
        if !self.cur.eat_punct(Punct::LParen) {
            return None;
        }
        let params = self.parse_param_list()?;
        let mut attr = head.attr | extra_attr;
        if extra_attr.is_empty() {
            // statement position: needs its terminating semicolon unless
            // it is a typedef target handled by the caller
            if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Semi)) {
                self.cur.bump();
            }
        }
        if head.attr.contains(Attr::TYPEDEF) {
            attr |= Attr::TYPEDEF;
        }
        Some(Obj::new(ObjData::FunctionPtr(Box::new(Function {
            attr,
            template_params: head.template_params,
            decor1: head.apidecor,
            decor2: None,
            ret_type: Some(Box::new(ret)),
            name,
            params,
            defn: None,
        }))))
    }

    fn parse_declarators(
        &mut self,
        head: Head,
        vt: VarType,
        is_typedef: bool,
        _class_name: Option<&str>,
    ) -> Option<Obj> {
        // function pointer
        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LParen))
            && self
                .cur
                .peek_tok_at(1)
                .map_or(false, |t| t.is_punct(Punct::Star))
        {
            let mut h = head;
            if is_typedef {
                h.attr |= Attr::TYPEDEF;
            }
            return self.parse_function_ptr(h, vt, Attr::empty());
        }

        // operator overload
        if self.cur.peek_tok().map_or(false, |t| t.is_ident("operator")) {
            let mark = self.cur.mark();
            self.cur.bump();
            if let Some(name) = self.take_operator_name() {
                return self.parse_function(head, vt, name);
            }
            self.cur.reset(mark);
        }

        let name = match self.cur.peek_tok() {
            Some(TokKind::Ident(n)) => {
                let n = n.clone();
                self.cur.bump();
                n
            }
            _ => {
                // no declarator at all: either a standalone expression
                // statement or nothing we understand
                return None;
            }
        };

        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LParen)) {
            if self.looks_like_call_init() {
                // `int x(5);` style initialization
                self.cur.bump();
                let value = expr::parse_expr_list(&mut self.cur);
                self.cur.eat_punct(Punct::RParen);
                self.cur.eat_punct(Punct::Semi);
                let decl = VarDecl {
                    name,
                    array_sizes: Vec::new(),
                    assign_type: AssignType::UsingBracket,
                    assign_value: value
                        .map(|e| Box::new(Obj::new(ObjData::Expression(Box::new(e))))),
                };
                return Some(Obj::new(ObjData::Var(Box::new(Var {
                    apidecor: head.apidecor,
                    var_type: vt,
                    decl,
                }))));
            }
            return self.parse_function(head, vt, name);
        }

        // plain variable(s)
        let first = self.parse_var_decl_tail(name)?;
        if self.cur.eat_punct(Punct::Comma) {
            return self.parse_var_list(head, vt, first, is_typedef);
        }
        if !self.cur.eat_punct(Punct::Semi) {
            return None;
        }
        let var = Var {
            apidecor: head.apidecor,
            var_type: vt,
            decl: first,
        };
        if is_typedef {
            return Some(Obj::new(ObjData::TypedefName(Box::new(TypedefName {
                var: Box::new(var),
            }))));
        }
        Some(Obj::new(ObjData::Var(Box::new(var))))
    }

    /// After the declarator name: array extents, bitfields (rejected) and
    /// the initializer.
    fn parse_var_decl_tail(&mut self, name: String) -> Option<VarDecl> {
        let mut decl = VarDecl::named(name);
        while self.cur.eat_punct(Punct::LBracket) {
            let size = if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RBracket)) {
                None
            } else {
                expr::parse_expr(&mut self.cur)
            };
            if !self.cur.eat_punct(Punct::RBracket) {
                return None;
            }
            decl.array_sizes.push(size);
        }
        if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Colon)) {
            // bitfield; no structural form
            return None;
        }
        if self.cur.eat_punct(Punct::Assign) {
            let value = expr::parse_expr(&mut self.cur)?;
            decl.assign_type = AssignType::UsingEqual;
            decl.assign_value = Some(Box::new(Obj::new(ObjData::Expression(Box::new(value)))));
        } else if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LBrace)) {
            self.cur.bump();
            let value = expr::parse_expr_list(&mut self.cur);
            if !self.cur.eat_punct(Punct::RBrace) {
                return None;
            }
            decl.assign_type = AssignType::UsingBraces;
            decl.assign_value =
                value.map(|e| Box::new(Obj::new(ObjData::Expression(Box::new(e)))));
        }
        Some(decl)
    }

    fn parse_var_list(
        &mut self,
        head: Head,
        vt: VarType,
        first: VarDecl,
        is_typedef: bool,
    ) -> Option<Obj> {
        let base_type = match &vt.base {
            TypeBase::Name(n) => n.clone(),
            TypeBase::Compound(_) => return None,
        };
        let mut decls = vec![VarDeclInList {
            modifier: vt.modifier,
            decl: first,
        }];
        loop {
            let mut modifier = TypeModifier::default();
            loop {
                if self.cur.eat_punct(Punct::Star) {
                    modifier.ptr_level += 1;
                } else if self.cur.eat_ident("const") {
                    modifier.const_bits |= 1 << modifier.ptr_level;
                } else if self.cur.eat_punct(Punct::Amp) {
                    modifier.ref_type = RefType::ByRef;
                } else if self.cur.eat_punct(Punct::AndAnd) {
                    modifier.ref_type = RefType::RValRef;
                } else {
                    break;
                }
            }
            let name = match self.cur.next_tok()?.kind {
                TokKind::Ident(n) => n,
                _ => return None,
            };
            let decl = self.parse_var_decl_tail(name)?;
            decls.push(VarDeclInList { modifier, decl });
            if self.cur.eat_punct(Punct::Comma) {
                continue;
            }
            if self.cur.eat_punct(Punct::Semi) {
                break;
            }
            return None;
        }
        let list = VarList {
            attr: vt.attr,
            base_type,
            decls,
        };
        if is_typedef {
            return Some(Obj::new(ObjData::TypedefNameList(Box::new(TypedefList {
                var_list: list,
            }))));
        }
        let _ = head;
        Some(Obj::new(ObjData::VarList(list)))
    }

    /// True for `name(` starting a constructor-style initialization
    /// rather than a function declaration: the first argument token is a
    /// literal.
    fn looks_like_call_init(&self) -> bool {
        matches!(
            self.cur.peek_tok_at(1),
            Some(TokKind::Number(_)) | Some(TokKind::Str(_)) | Some(TokKind::Chr(_))
        )
    }

    fn take_operator_name(&mut self) -> Option<String> {
        if self.cur.eat_punct(Punct::LParen) {
            if self.cur.eat_punct(Punct::RParen) {
                return Some("operator()".to_string());
            }
            return None;
        }
        if self.cur.eat_punct(Punct::LBracket) {
            if self.cur.eat_punct(Punct::RBracket) {
                return Some("operator[]".to_string());
            }
            return None;
        }
        match self.cur.peek_tok() {
            Some(TokKind::Punct(p)) => {
                let p = *p;
                self.cur.bump();
                Some(format!("operator{}", p.as_str()))
            }
            _ => None,
        }
    }

    fn parse_function(&mut self, head: Head, ret: VarType, name: String) -> Option<Obj> {
        if !self.cur.eat_punct(Punct::LParen) {
            return None;
        }
        let params = self.parse_param_list()?;
        let mut attr = head.attr;
        loop {
            if self.cur.eat_ident("const") {
                attr |= Attr::CONST;
            } else if self.cur.eat_ident("override") {
                attr |= Attr::OVERRIDE;
            } else if self.cur.eat_ident("final") {
                attr |= Attr::FINAL;
            } else if self.cur.peek_tok().map_or(false, |t| {
                t.is_ident("noexcept") || t.is_ident("throw")
            }) {
                self.swallow_exception_spec();
            } else {
                break;
            }
        }
        if self.cur.eat_punct(Punct::Assign) {
            if self.cur.eat_ident("delete") {
                attr |= Attr::DELETED;
                self.cur.eat_punct(Punct::Semi);
            } else if let Some(TokKind::Number(n)) = self.cur.peek_tok() {
                if n == "0" {
                    attr |= Attr::PURE_VIRTUAL;
                    self.cur.bump();
                    self.cur.eat_punct(Punct::Semi);
                } else {
                    return None;
                }
            } else {
                // "= default"
                return None;
            }
            return Some(Obj::new(ObjData::Function(Box::new(Function {
                attr,
                template_params: head.template_params,
                decor1: head.apidecor,
                decor2: None,
                ret_type: Some(Box::new(ret)),
                name,
                params,
                defn: None,
            }))));
        }
        let defn = self.parse_optional_body()?;
        Some(Obj::new(ObjData::Function(Box::new(Function {
            attr,
            template_params: head.template_params,
            decor1: head.apidecor,
            decor2: None,
            ret_type: Some(Box::new(ret)),
            name,
            params,
            defn,
        }))))
    }

    // -- types --------------------------------------------------------------

    /// Base type plus pointer/reference/const decoration. Fails (returns
    /// `None`) when the cursor is not looking at something type-shaped.
    fn parse_var_type(&mut self, attr0: Attr) -> Option<VarType> {
        let mut attr = attr0;
        let mut modifier = TypeModifier::default();
        let mut base_const = false;

        loop {
            match self.cur.peek_tok() {
                Some(TokKind::Ident(w)) if w == "const" => {
                    base_const = true;
                    self.cur.bump();
                }
                Some(TokKind::Ident(w)) if w == "volatile" => {
                    attr |= Attr::VOLATILE;
                    self.cur.bump();
                }
                _ => break,
            }
        }

        let base = if let Some(TokKind::Ident(w)) = self.cur.peek_tok() {
            if expr::is_builtin_type_word(w) && w != "const" && w != "volatile" {
                let mut words = Vec::new();
                while let Some(TokKind::Ident(w)) = self.cur.peek_tok() {
                    if expr::is_builtin_type_word(w) && w != "const" && w != "volatile" {
                        words.push(w.clone());
                        self.cur.bump();
                    } else {
                        break;
                    }
                }
                words.join(" ")
            } else {
                self.parse_qualified_name()?
            }
        } else {
            return None;
        };

        // `const` immediately after the base also binds to the base
        loop {
            if self.cur.eat_ident("const") {
                modifier.const_bits |= 1 << modifier.ptr_level;
            } else if self.cur.eat_ident("volatile") {
                attr |= Attr::VOLATILE;
            } else if self.cur.eat_punct(Punct::Star) {
                modifier.ptr_level += 1;
            } else if self.cur.eat_punct(Punct::Amp) {
                modifier.ref_type = RefType::ByRef;
            } else if self.cur.eat_punct(Punct::AndAnd) {
                modifier.ref_type = RefType::RValRef;
            } else {
                break;
            }
        }
        if base_const {
            modifier.const_bits |= 1;
        }

        Some(VarType {
            attr,
            base: TypeBase::Name(base),
            modifier,
        })
    }

    /// `a::b<T>::c` captured as text; template argument groups are kept
    /// verbatim.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let mut text = String::new();
        if self.cur.eat_punct(Punct::Scope) {
            text.push_str("::");
        }
        loop {
            match self.cur.peek_tok() {
                Some(TokKind::Ident(seg)) => {
                    // reserved words never begin a name segment
                    if matches!(
                        seg.as_str(),
                        "const" | "volatile" | "virtual" | "inline" | "static" | "extern"
                            | "explicit" | "friend" | "typedef" | "operator" | "template"
                            | "public" | "protected" | "private" | "else" | "case" | "default"
                            | "class" | "struct" | "union" | "enum" | "namespace" | "using"
                            | "new" | "delete" | "return" | "throw" | "sizeof" | "typename"
                            | "if" | "while" | "do" | "for" | "switch"
                    ) {
                        return None;
                    }
                    text.push_str(seg);
                    self.cur.bump();
                }
                _ => return None,
            }
            if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Lt))
                && self.cur.gt_group_closed()
            {
                self.cur.bump();
                let inner = self.cur.take_until_matching_gt();
                text.push('<');
                text.push_str(&lexer::render_tokens(&inner));
                text.push('>');
            }
            if self.cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Scope))
                && matches!(self.cur.peek_tok_at(1), Some(TokKind::Ident(_)))
            {
                self.cur.bump();
                text.push_str("::");
                continue;
            }
            return Some(text);
        }
    }

    // -- fallbacks ----------------------------------------------------------

    /// Consumes one statement-shaped region and keeps it as an expression
    /// when it parses as one, as an opaque blob otherwise.
    fn fallback_stmt(&mut self) -> Obj {
        let mark = self.cur.mark();
        if let Some(e) = expr::parse_expr_list(&mut self.cur) {
            if self.cur.eat_punct(Punct::Semi) {
                return Obj::new(ObjData::Expression(Box::new(e)));
            }
        }
        self.cur.reset(mark);
        let mut brace_depth = 0usize;
        let mut toks = Vec::new();
        loop {
            match self.cur.peek_tok() {
                None => break,
                Some(kind) => {
                    if kind.is_punct(Punct::LBrace) {
                        brace_depth += 1;
                    } else if kind.is_punct(Punct::RBrace) {
                        if brace_depth == 0 {
                            break;
                        }
                        brace_depth -= 1;
                        toks.push(self.cur.next_tok().unwrap());
                        if brace_depth == 0 {
                            self.cur.eat_punct(Punct::Semi);
                            break;
                        }
                        continue;
                    } else if kind.is_punct(Punct::Semi) && brace_depth == 0 {
                        toks.push(self.cur.next_tok().unwrap());
                        break;
                    }
                    toks.push(self.cur.next_tok().unwrap());
                }
            }
        }
        if toks.is_empty() {
            // ensure forward progress
            self.cur.bump();
            return Obj::new(ObjData::Blob(Blob {
                blob: String::new(),
            }));
        }
        log::debug!(
            "fallback_stmt: keeping {} tokens as a blob near line {}",
            toks.len(),
            toks[0].line
        );
        Obj::new(ObjData::Blob(Blob {
            blob: format!("{}\n", lexer::render_tokens(&toks)),
        }))
    }
}
