//! Read-only traversal over compound members.

use crate::ast::{Compound, Obj};

/// Calls `visitor` for each immediate member of `compound`, in insertion
/// order. The visitor returns `true` to stop the walk; the function
/// returns whether it stopped early.
///
/// The visitor receives a shared borrow; members cannot be mutated during
/// the walk.
pub fn for_each_member<F>(compound: &Compound, mut visitor: F) -> bool
where
    F: FnMut(&Obj) -> bool,
{
    for member in &compound.members {
        if visitor(member) {
            return true;
        }
    }
    false
}

/// First immediate member matching `pred`, if any.
pub fn find_member<'a, F>(compound: &'a Compound, mut pred: F) -> Option<&'a Obj>
where
    F: FnMut(&Obj) -> bool,
{
    compound.members.iter().find(|m| pred(m))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::*;

    fn sample() -> Compound {
        let mut c = Compound::new(CompoundType::Class);
        c.members.push(Obj::new(ObjData::Var(Box::new(Var {
            apidecor: None,
            var_type: VarType::named("int"),
            decl: VarDecl::named("a"),
        }))));
        c.members.push(Obj::new(ObjData::Expression(Box::new(Expr::atom("a")))));
        c.members.push(Obj::new(ObjData::Blob(Blob {
            blob: "raw".into(),
        })));
        c
    }

    #[test]
    fn walks_in_insertion_order() {
        let c = sample();
        let mut kinds = Vec::new();
        let stopped = for_each_member(&c, |m| {
            kinds.push(m.kind());
            false
        });
        assert!(!stopped);
        assert_eq!(kinds, vec![ObjKind::Var, ObjKind::Expression, ObjKind::Blob]);
    }

    #[test]
    fn stops_on_signal() {
        let c = sample();
        let mut seen = 0;
        let stopped = for_each_member(&c, |_| {
            seen += 1;
            seen == 2
        });
        assert!(stopped);
        assert_eq!(seen, 2);
    }

    #[test]
    fn finds_expressions() {
        let c = sample();
        let found = find_member(&c, |m| m.is_expr()).expect("expression member");
        assert_eq!(found.kind(), ObjKind::Expression);
    }
}
