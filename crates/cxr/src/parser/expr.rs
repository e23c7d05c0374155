//! Operator-precedence expression parsing.
//!
//! Produces the flat operator/atom expression model: leaves stay raw token
//! text, composites become nested expressions. Template arguments inside
//! expressions are not analyzed; `<` and `>` parse as comparisons except
//! in the named-cast forms, which capture their type argument verbatim.

use lang_cxx::ast::{Expr, ExprAtom, ExprFlags, Operator};

use super::lexer::{Punct, TokKind};
use super::Cursor;

/// Collapses a pure single-atom expression back into its atom.
fn to_atom(e: Expr) -> ExprAtom {
    let plain = e.oper == Operator::None
        && e.flags.is_empty()
        && e.expr2.is_none()
        && e.expr3.is_none();
    if plain {
        if let Some(atom) = e.expr1 {
            return atom;
        }
    }
    ExprAtom::Expr(Box::new(e))
}

fn binary(op: Operator, lhs: Expr, rhs: Expr) -> Expr {
    Expr {
        oper: op,
        expr1: Some(to_atom(lhs)),
        expr2: Some(to_atom(rhs)),
        ..Expr::default()
    }
}

/// Parses one assignment-level expression (no top-level commas).
pub(crate) fn parse_expr(cur: &mut Cursor<'_>) -> Option<Expr> {
    parse_assignment(cur)
}

/// Parses a comma-separated expression list, folded left over the comma
/// operator. Returns `None` when no expression is present at all.
pub(crate) fn parse_expr_list(cur: &mut Cursor<'_>) -> Option<Expr> {
    let mut e = parse_assignment(cur)?;
    while cur.eat_punct(Punct::Comma) {
        match parse_assignment(cur) {
            Some(rhs) => e = binary(Operator::Comma, e, rhs),
            None => break,
        }
    }
    Some(e)
}

fn parse_assignment(cur: &mut Cursor<'_>) -> Option<Expr> {
    let lhs = parse_ternary(cur)?;
    let op = match cur.peek_tok() {
        Some(TokKind::Punct(Punct::Assign)) => Operator::Assign,
        Some(TokKind::Punct(Punct::PlusEq)) => Operator::PlusEqual,
        Some(TokKind::Punct(Punct::MinusEq)) => Operator::MinusEqual,
        Some(TokKind::Punct(Punct::StarEq)) => Operator::MulEqual,
        Some(TokKind::Punct(Punct::SlashEq)) => Operator::DivEqual,
        Some(TokKind::Punct(Punct::PercentEq)) => Operator::PerEqual,
        Some(TokKind::Punct(Punct::CaretEq)) => Operator::XorEqual,
        Some(TokKind::Punct(Punct::AmpEq)) => Operator::AndEqual,
        Some(TokKind::Punct(Punct::PipeEq)) => Operator::OrEqual,
        Some(TokKind::Punct(Punct::ShlEq)) => Operator::LShiftEqual,
        Some(TokKind::Punct(Punct::ShrEq)) => Operator::RShiftEqual,
        _ => return Some(lhs),
    };
    let mark = cur.mark();
    cur.bump();
    match parse_assignment(cur) {
        Some(rhs) => Some(binary(op, lhs, rhs)),
        None => {
            cur.reset(mark);
            Some(lhs)
        }
    }
}

fn parse_ternary(cur: &mut Cursor<'_>) -> Option<Expr> {
    let cond = parse_binary(cur, 0)?;
    if !cur.eat_punct(Punct::Question) {
        return Some(cond);
    }
    let then_part = parse_expr(cur)?;
    if !cur.eat_punct(Punct::Colon) {
        return None;
    }
    let else_part = parse_assignment(cur)?;
    Some(Expr {
        oper: Operator::Ternary,
        expr1: Some(to_atom(cond)),
        expr2: Some(to_atom(then_part)),
        expr3: Some(to_atom(else_part)),
        ..Expr::default()
    })
}

/// Binary operators by precedence tier, loosest first.
const BINARY_TIERS: &[&[(Punct, Operator)]] = &[
    &[(Punct::OrOr, Operator::Or)],
    &[(Punct::AndAnd, Operator::And)],
    &[(Punct::Pipe, Operator::BitOr)],
    &[(Punct::Caret, Operator::Xor)],
    &[(Punct::Amp, Operator::BitAnd)],
    &[(Punct::EqEq, Operator::CmpEqual), (Punct::NotEq, Operator::NotEqual)],
    &[
        (Punct::Lt, Operator::Less),
        (Punct::Gt, Operator::Greater),
        (Punct::LtEq, Operator::LessEqual),
        (Punct::GtEq, Operator::GreaterEqual),
        (Punct::Spaceship, Operator::ThreeWayCmp),
    ],
    &[(Punct::Shl, Operator::LeftShift), (Punct::Shr, Operator::RightShift)],
    &[(Punct::Plus, Operator::Plus), (Punct::Minus, Operator::Minus)],
    &[
        (Punct::Star, Operator::Mul),
        (Punct::Slash, Operator::Div),
        (Punct::Percent, Operator::Percent),
    ],
];

fn parse_binary(cur: &mut Cursor<'_>, tier: usize) -> Option<Expr> {
    if tier >= BINARY_TIERS.len() {
        return parse_unary(cur);
    }
    let mut lhs = parse_binary(cur, tier + 1)?;
    loop {
        let found = BINARY_TIERS[tier].iter().find(|(p, _)| {
            matches!(cur.peek_tok(), Some(TokKind::Punct(q)) if q == p)
        });
        let (_, op) = match found {
            Some(pair) => *pair,
            None => return Some(lhs),
        };
        let mark = cur.mark();
        cur.bump();
        match parse_binary(cur, tier + 1) {
            Some(rhs) => lhs = binary(op, lhs, rhs),
            None => {
                cur.reset(mark);
                return Some(lhs);
            }
        }
    }
}

fn parse_unary(cur: &mut Cursor<'_>) -> Option<Expr> {
    let prefix = match cur.peek_tok() {
        Some(TokKind::Punct(Punct::Minus)) => Some(Operator::UnaryMinus),
        Some(TokKind::Punct(Punct::Tilde)) => Some(Operator::BitToggle),
        Some(TokKind::Punct(Punct::Bang)) => Some(Operator::LogNot),
        Some(TokKind::Punct(Punct::Star)) => Some(Operator::Derefer),
        Some(TokKind::Punct(Punct::Amp)) => Some(Operator::Refer),
        Some(TokKind::Punct(Punct::Inc)) => Some(Operator::PreIncrement),
        Some(TokKind::Punct(Punct::Dec)) => Some(Operator::PreDecrement),
        _ => None,
    };
    if let Some(op) = prefix {
        let mark = cur.mark();
        cur.bump();
        match parse_unary(cur) {
            Some(operand) => {
                return Some(Expr {
                    oper: op,
                    expr1: Some(to_atom(operand)),
                    ..Expr::default()
                });
            }
            None => cur.reset(mark),
        }
        return None;
    }

    if cur.eat_ident("new") {
        let operand = parse_unary(cur)?;
        let mut e = operand;
        e.flags |= ExprFlags::NEW;
        return Some(e);
    }
    if cur.eat_ident("delete") {
        let flag = if cur.peek_tok().map_or(false, |t| t.is_punct(Punct::LBracket)) {
            cur.bump();
            cur.eat_punct(Punct::RBracket);
            ExprFlags::DELETE_ARRAY
        } else {
            ExprFlags::DELETE
        };
        let operand = parse_unary(cur)?;
        let mut e = operand;
        e.flags |= flag;
        return Some(e);
    }
    if cur.eat_ident("sizeof") {
        let inner = if cur.eat_punct(Punct::LParen) {
            let toks = cur.take_until_matching_rparen();
            super::lexer::render_tokens(&toks)
        } else {
            match cur.next_tok() {
                Some(t) => t.kind.to_string(),
                None => return None,
            }
        };
        return Some(Expr {
            flags: ExprFlags::SIZEOF,
            expr1: Some(ExprAtom::text(inner)),
            ..Expr::default()
        });
    }

    parse_postfix(cur)
}

fn parse_postfix(cur: &mut Cursor<'_>) -> Option<Expr> {
    let mut e = parse_primary(cur)?;
    loop {
        match cur.peek_tok() {
            Some(TokKind::Punct(Punct::LParen)) => {
                cur.bump();
                let args = if cur.peek_tok().map_or(false, |t| t.is_punct(Punct::RParen)) {
                    None
                } else {
                    parse_expr_list(cur)
                };
                if !cur.eat_punct(Punct::RParen) {
                    // broken call; keep what we have
                    return Some(e);
                }
                e = Expr {
                    oper: Operator::FunctionCall,
                    expr1: Some(to_atom(e)),
                    expr2: args.map(|a| to_atom(a)),
                    ..Expr::default()
                };
            }
            Some(TokKind::Punct(Punct::LBracket)) => {
                cur.bump();
                let index = parse_expr_list(cur);
                if !cur.eat_punct(Punct::RBracket) {
                    return Some(e);
                }
                e = Expr {
                    oper: Operator::ArrayElem,
                    expr1: Some(to_atom(e)),
                    expr2: index.map(|a| to_atom(a)),
                    ..Expr::default()
                };
            }
            Some(TokKind::Punct(Punct::Dot))
            | Some(TokKind::Punct(Punct::Arrow))
            | Some(TokKind::Punct(Punct::ArrowStar)) => {
                let op = match cur.peek_tok() {
                    Some(TokKind::Punct(Punct::Dot)) => Operator::Dot,
                    Some(TokKind::Punct(Punct::Arrow)) => Operator::Arrow,
                    _ => Operator::ArrowStar,
                };
                let mark = cur.mark();
                cur.bump();
                match cur.next_tok() {
                    Some(t) => match &t.kind {
                        TokKind::Ident(name) => {
                            e = Expr {
                                oper: op,
                                expr1: Some(to_atom(e)),
                                expr2: Some(ExprAtom::text(name.clone())),
                                ..Expr::default()
                            };
                        }
                        _ => {
                            cur.reset(mark);
                            return Some(e);
                        }
                    },
                    None => {
                        cur.reset(mark);
                        return Some(e);
                    }
                }
            }
            Some(TokKind::Punct(Punct::Inc)) => {
                cur.bump();
                e = Expr {
                    oper: Operator::PostIncrement,
                    expr1: Some(to_atom(e)),
                    ..Expr::default()
                };
            }
            Some(TokKind::Punct(Punct::Dec)) => {
                cur.bump();
                e = Expr {
                    oper: Operator::PostDecrement,
                    expr1: Some(to_atom(e)),
                    ..Expr::default()
                };
            }
            _ => return Some(e),
        }
    }
}

fn named_cast(name: &str) -> Option<Operator> {
    match name {
        "const_cast" => Some(Operator::ConstCast),
        "static_cast" => Some(Operator::StaticCast),
        "dynamic_cast" => Some(Operator::DynamicCast),
        "reinterpret_cast" => Some(Operator::ReinterpretCast),
        _ => None,
    }
}

fn parse_primary(cur: &mut Cursor<'_>) -> Option<Expr> {
    match cur.peek_tok()?.clone() {
        TokKind::Number(n) => {
            cur.bump();
            Some(Expr::atom(n))
        }
        TokKind::Str(s) | TokKind::Chr(s) => {
            cur.bump();
            Some(Expr::atom(s))
        }
        TokKind::Ident(name) => {
            if let Some(op) = named_cast(&name) {
                let mark = cur.mark();
                cur.bump();
                if cur.eat_punct(Punct::Lt) {
                    let ty = cur.take_until_matching_gt();
                    if cur.eat_punct(Punct::LParen) {
                        let arg = parse_expr_list(cur);
                        if cur.eat_punct(Punct::RParen) {
                            return Some(Expr {
                                oper: op,
                                expr1: Some(ExprAtom::text(super::lexer::render_tokens(&ty))),
                                expr2: arg.map(|a| to_atom(a)),
                                ..Expr::default()
                            });
                        }
                    }
                }
                cur.reset(mark);
            }
            cur.bump();
            let mut text = name;
            // qualified name: a::b::c
            while cur.peek_tok().map_or(false, |t| t.is_punct(Punct::Scope)) {
                let mark = cur.mark();
                cur.bump();
                match cur.next_tok() {
                    Some(t) => match &t.kind {
                        TokKind::Ident(seg) => {
                            text.push_str("::");
                            text.push_str(seg);
                        }
                        _ => {
                            cur.reset(mark);
                            break;
                        }
                    },
                    None => {
                        cur.reset(mark);
                        break;
                    }
                }
            }
            Some(Expr::atom(text))
        }
        TokKind::Punct(Punct::Scope) => {
            // ::name
            let mark = cur.mark();
            cur.bump();
            match parse_primary(cur) {
                Some(inner) => {
                    if inner.oper == Operator::None {
                        if let Some(ExprAtom::Text(t)) = &inner.expr1 {
                            return Some(Expr::atom(format!("::{}", t)));
                        }
                    }
                    Some(inner)
                }
                None => {
                    cur.reset(mark);
                    None
                }
            }
        }
        TokKind::Punct(Punct::LParen) => {
            let mark = cur.mark();
            cur.bump();
            // C-style cast: "(type) operand"
            if let Some(ty) = try_cast_type(cur) {
                if let Some(operand) = parse_unary(cur) {
                    return Some(Expr {
                        oper: Operator::CStyleCast,
                        expr1: Some(ExprAtom::text(ty)),
                        expr2: Some(to_atom(operand)),
                        ..Expr::default()
                    });
                }
                cur.reset(mark);
                cur.bump();
            }
            let inner = parse_expr_list(cur);
            if !cur.eat_punct(Punct::RParen) {
                cur.reset(mark);
                return None;
            }
            let mut e = inner?;
            e.flags |= ExprFlags::BRACKETED;
            Some(e)
        }
        TokKind::Punct(Punct::LBrace) => {
            // brace initializer list
            let mark = cur.mark();
            cur.bump();
            let inner = parse_expr_list(cur);
            if !cur.eat_punct(Punct::RBrace) {
                cur.reset(mark);
                return None;
            }
            let mut e = inner.unwrap_or_default();
            e.flags |= ExprFlags::INITIALIZER;
            Some(e)
        }
        _ => None,
    }
}

/// Cursor sits just past a `(`. If the tokens up to the matching `)` look
/// like a type name (identifiers, scope separators, cv words, stars and
/// ampersands) and something that can start an operand follows, consumes
/// through the `)` and returns the rendered type text.
fn try_cast_type(cur: &mut Cursor<'_>) -> Option<String> {
    let mark = cur.mark();
    let mut toks = Vec::new();
    let mut saw_ident = false;
    loop {
        match cur.peek_tok() {
            Some(TokKind::Punct(Punct::RParen)) => break,
            Some(TokKind::Ident(_)) => {
                if saw_ident && !matches!(toks.last(), Some(TokKind::Punct(Punct::Scope))) {
                    // two adjacent idents are fine for builtin pairs only
                    let builtin = matches!(
                        toks.last(),
                        Some(TokKind::Ident(w)) if is_builtin_type_word(w)
                    );
                    if !builtin {
                        cur.reset(mark);
                        return None;
                    }
                }
                saw_ident = true;
                toks.push(cur.next_tok().unwrap().kind);
            }
            Some(TokKind::Punct(Punct::Scope))
            | Some(TokKind::Punct(Punct::Star))
            | Some(TokKind::Punct(Punct::Amp)) => {
                toks.push(cur.next_tok().unwrap().kind);
            }
            _ => {
                cur.reset(mark);
                return None;
            }
        }
    }
    if !saw_ident {
        cur.reset(mark);
        return None;
    }
    cur.bump(); // the ')'
    let operand_follows = matches!(
        cur.peek_tok(),
        Some(TokKind::Ident(_))
            | Some(TokKind::Number(_))
            | Some(TokKind::Str(_))
            | Some(TokKind::Chr(_))
            | Some(TokKind::Punct(Punct::LParen))
    );
    if !operand_follows {
        cur.reset(mark);
        return None;
    }
    let rendered: Vec<super::lexer::Tok> = toks
        .into_iter()
        .map(|kind| super::lexer::Tok { kind, line: 0 })
        .collect();
    Some(super::lexer::render_tokens(&rendered))
}

pub(crate) fn is_builtin_type_word(w: &str) -> bool {
    matches!(
        w,
        "void"
            | "bool"
            | "char"
            | "short"
            | "int"
            | "long"
            | "float"
            | "double"
            | "signed"
            | "unsigned"
            | "wchar_t"
            | "char16_t"
            | "char32_t"
            | "auto"
            | "const"
            | "volatile"
    )
}
