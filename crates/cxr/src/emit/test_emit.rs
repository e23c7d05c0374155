use pretty_assertions::assert_eq;

use lang_cxx::ast::*;

use super::{emit_type_modifier, EmittingType, Indent, Writer};

fn emit_at(obj: &Obj, indent: Indent) -> String {
    let mut buf = Vec::new();
    Writer::new().emit(obj, &mut buf, indent).unwrap();
    String::from_utf8(buf).unwrap()
}

fn emit(obj: &Obj) -> String {
    emit_at(obj, Indent::new())
}

fn var_obj(var_type: VarType, name: &str) -> Obj {
    Obj::new(ObjData::Var(Box::new(Var {
        apidecor: None,
        var_type,
        decl: VarDecl::named(name),
    })))
}

fn modifier_text(modifier: &TypeModifier) -> String {
    let mut buf = Vec::new();
    emit_type_modifier(modifier, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn type_modifier_walks_bits_in_order() {
    let m = TypeModifier {
        ref_type: RefType::None,
        ptr_level: 2,
        const_bits: 0b011,
    };
    assert_eq!(modifier_text(&m), " const * const *");

    let m = TypeModifier {
        ref_type: RefType::None,
        ptr_level: 2,
        const_bits: 0b100,
    };
    assert_eq!(modifier_text(&m), "** const");
}

#[test]
fn type_modifier_const_count_matches_popcount() {
    for bits in 0u32..8 {
        let m = TypeModifier {
            ref_type: RefType::None,
            ptr_level: 2,
            const_bits: bits,
        };
        let text = modifier_text(&m);
        assert_eq!(text.matches('*').count(), 2, "bits {:#b}", bits);
        assert_eq!(
            text.matches(" const ").count(),
            (bits & 0b11).count_ones() as usize,
            "bits {:#b}",
            bits
        );
        assert_eq!(text.ends_with(" const"), bits & 0b100 != 0, "bits {:#b}", bits);
    }
}

#[test]
fn type_modifier_ignores_bits_past_ptr_level() {
    let m = TypeModifier {
        ref_type: RefType::None,
        ptr_level: 1,
        const_bits: 0b11110,
    };
    assert_eq!(modifier_text(&m), "* const");
}

#[test]
fn var_type_masks_the_base_const_bit() {
    let mut vt = VarType::named("int");
    vt.modifier.ptr_level = 1;
    vt.modifier.const_bits = 0b11;
    // bit 0 surfaces as the leading const keyword, not as " const *"
    assert_eq!(emit(&var_obj(vt, "x")), "const int* const x;\n");
}

#[test]
fn reference_types() {
    let mut vt = VarType::named("T");
    vt.modifier.ref_type = RefType::RValRef;
    assert_eq!(emit(&var_obj(vt, "x")), "T&& x;\n");
}

#[test]
fn storage_class_priority_order() {
    let mut vt = VarType::named("int");
    vt.attr = Attr::STATIC | Attr::CONST;
    assert_eq!(emit(&var_obj(vt, "x")), "static const int x;\n");
}

#[test]
fn hash_if_else_keeps_stored_trailing_text() {
    let mk = |cond_type, cond: &str| {
        Obj::new(ObjData::HashIf(HashIf {
            cond_type,
            cond: cond.into(),
        }))
    };
    let mut buf = Vec::new();
    let mut w = Writer::new();
    w.emit(&mk(CondType::If, "A"), &mut buf, Indent::new()).unwrap();
    w.emit(&mk(CondType::Else, ""), &mut buf, Indent::new()).unwrap();
    w.emit(&mk(CondType::EndIf, ""), &mut buf, Indent::new()).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "#if A\n#else \n#endif\n");
}

#[test]
fn prepro_counter_returns_to_zero() {
    let mk = |cond_type, cond: &str| {
        Obj::new(ObjData::HashIf(HashIf {
            cond_type,
            cond: cond.into(),
        }))
    };
    let seq = [
        mk(CondType::IfDef, "X"),
        mk(CondType::If, "Y"),
        mk(CondType::EndIf, ""),
        mk(CondType::EndIf, ""),
    ];
    let mut w = Writer::new();
    let mut first = Vec::new();
    for obj in &seq {
        w.emit(obj, &mut first, Indent::new()).unwrap();
    }
    assert_eq!(
        String::from_utf8(first.clone()).unwrap(),
        "#ifdef X\n# if Y\n# endif\n#endif\n"
    );
    // a balanced sequence leaves the counter at zero, so a second pass
    // through the same writer produces identical text
    let mut second = Vec::new();
    for obj in &seq {
        w.emit(obj, &mut second, Indent::new()).unwrap();
    }
    assert_eq!(first, second);
}

#[test]
fn define_body_is_tab_separated() {
    let obj = Obj::new(ObjData::HashDefine(Define {
        name: "WX_PREC".into(),
        defn: "2".into(),
    }));
    assert_eq!(emit(&obj), "#define WX_PREC\t2\n");
    let empty = Obj::new(ObjData::HashDefine(Define {
        name: "GUARD".into(),
        defn: String::new(),
    }));
    assert_eq!(emit(&empty), "#define GUARD\n");
}

fn sample_class() -> Obj {
    let mut c = Compound::new(CompoundType::Class);
    c.name = Some("A".into());
    c.inheritance = Some(vec![
        InheritanceItem {
            access: AccessType::Public,
            base: "B".into(),
        },
        InheritanceItem {
            access: AccessType::Protected,
            base: "C".into(),
        },
    ]);
    let mut a = var_obj(VarType::named("int"), "a");
    a.access_type = AccessType::Public;
    let mut b = var_obj(VarType::named("int"), "b");
    b.access_type = AccessType::Public;
    let mut c2 = var_obj(VarType::named("int"), "c");
    c2.access_type = AccessType::Private;
    c.members.push(a);
    c.members.push(b);
    c.members.push(c2);
    Obj::new(ObjData::Compound(Box::new(c)))
}

#[test]
fn class_emits_one_access_line_per_run() {
    assert_eq!(
        emit(&sample_class()),
        "class A : public B, protected C\n\
         {\n\
         public:\n\
         \x20 int a;\n\
         \x20 int b;\n\
         private:\n\
         \x20 int c;\n\
         };\n"
    );
}

#[test]
fn access_lines_sit_at_the_surrounding_indent() {
    let text = emit_at(&sample_class(), Indent::new().deeper());
    assert!(text.contains("\n  public:\n    int a;\n"));
    assert!(text.starts_with("  class A"));
}

#[test]
fn function_post_qualifiers_in_order() {
    let f = Function {
        attr: Attr::CONST | Attr::PURE_VIRTUAL | Attr::OVERRIDE | Attr::FINAL | Attr::VIRTUAL,
        template_params: None,
        decor1: None,
        decor2: None,
        ret_type: Some(Box::new(VarType::named("int"))),
        name: "get".into(),
        params: None,
        defn: None,
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Function(Box::new(f)))),
        "virtual int get() const = 0 override final;\n"
    );
}

#[test]
fn header_view_elides_function_bodies() {
    let body = Compound::new(CompoundType::Block);
    let f = Function {
        attr: Attr::empty(),
        template_params: None,
        decor1: None,
        decor2: None,
        ret_type: Some(Box::new(VarType::named("void"))),
        name: "reset".into(),
        params: None,
        defn: Some(Box::new(body)),
    };
    let obj = Obj::new(ObjData::Function(Box::new(f)));
    assert_eq!(emit(&obj), "void reset()\n{\n}\n");

    let mut buf = Vec::new();
    Writer::with_emitting_type(EmittingType::Header)
        .emit(&obj, &mut buf, Indent::new())
        .unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "void reset();\n");
}

#[test]
fn typedef_function_pointer() {
    let f = Function {
        attr: Attr::TYPEDEF,
        template_params: None,
        decor1: None,
        decor2: None,
        ret_type: Some(Box::new(VarType::named("int"))),
        name: "Handler".into(),
        params: Some(vec![var_obj(VarType::named("char"), "")]),
        defn: None,
    };
    assert_eq!(
        emit(&Obj::new(ObjData::FunctionPtr(Box::new(f)))),
        "typedef int (*Handler) (char);\n"
    );
}

#[test]
fn deleted_constructor() {
    let c = Constructor {
        attr: Attr::DELETED,
        template_params: None,
        decor1: None,
        name: "A".into(),
        params: None,
        mem_inits: None,
        defn: None,
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Constructor(Box::new(c)))),
        "A() = delete;\n"
    );
}

#[test]
fn constructor_initializer_list_layout() {
    let c = Constructor {
        attr: Attr::empty(),
        template_params: None,
        decor1: None,
        name: "A".into(),
        params: Some(vec![var_obj(VarType::named("int"), "x")]),
        mem_inits: Some(vec![
            MemInit {
                member: "m_x".into(),
                init: Expr::atom("x"),
            },
            MemInit {
                member: "m_y".into(),
                init: Expr::atom("0"),
            },
        ]),
        defn: Some(Box::new(Compound::new(CompoundType::Block))),
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Constructor(Box::new(c)))),
        "A(int x)\n  : m_x(x)\n  , m_y(0)\n{\n}\n"
    );
}

#[test]
fn expression_layout_per_operator_class() {
    let bin = Expr::binary(Operator::Plus, Expr::atom("a"), Expr::atom("b"));
    assert_eq!(emit(&Obj::new(ObjData::Expression(Box::new(bin)))), "a + b;\n");

    let comma = Expr::binary(Operator::Comma, Expr::atom("a"), Expr::atom("b"));
    assert_eq!(emit(&Obj::new(ObjData::Expression(Box::new(comma)))), "a, b;\n");

    let deref = Expr {
        oper: Operator::Arrow,
        expr1: Some(ExprAtom::text("p")),
        expr2: Some(ExprAtom::text("field")),
        ..Expr::default()
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(deref)))),
        "p->field;\n"
    );

    let ternary = Expr {
        oper: Operator::Ternary,
        expr1: Some(ExprAtom::text("c")),
        expr2: Some(ExprAtom::text("a")),
        expr3: Some(ExprAtom::text("b")),
        ..Expr::default()
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(ternary)))),
        "c ? a : b;\n"
    );

    let cast = Expr {
        oper: Operator::StaticCast,
        expr1: Some(ExprAtom::text("int")),
        expr2: Some(ExprAtom::text("x")),
        ..Expr::default()
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(cast)))),
        "static_cast<int>(x);\n"
    );

    let c_cast = Expr {
        oper: Operator::CStyleCast,
        expr1: Some(ExprAtom::text("wxBrushStyle")),
        expr2: Some(ExprAtom::text("style")),
        ..Expr::default()
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(c_cast)))),
        "(wxBrushStyle) style;\n"
    );
}

#[test]
fn expression_flags_wrap_in_fixed_order() {
    let mut e = Expr::atom("x");
    e.flags = ExprFlags::RETURN;
    assert_eq!(emit(&Obj::new(ObjData::Expression(Box::new(e)))), "return x;\n");

    let mut e = Expr::atom("Error()");
    e.flags = ExprFlags::THROW;
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(e)))),
        "throw Error();\n"
    );

    let mut e = Expr::atom("x");
    e.flags = ExprFlags::SIZEOF;
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(e)))),
        "sizeof(x);\n"
    );

    let mut e = Expr::atom("p");
    e.flags = ExprFlags::DELETE_ARRAY;
    assert_eq!(
        emit(&Obj::new(ObjData::Expression(Box::new(e)))),
        "delete[] p;\n"
    );

    // the initializer brace opens before the bracket and closes after it
    let mut e = Expr::atom("x");
    e.flags = ExprFlags::INITIALIZER | ExprFlags::BRACKETED;
    assert_eq!(emit(&Obj::new(ObjData::Expression(Box::new(e)))), "{(x)};\n");
}

#[test]
fn enum_trailing_comma_rule() {
    let e = EnumDecl {
        name: "E".into(),
        is_class: true,
        underlying: Some("unsigned".into()),
        items: Some(vec![
            EnumItem::Named {
                name: "A".into(),
                val: Some(Expr::atom("1")),
            },
            EnumItem::Named {
                name: "B".into(),
                val: None,
            },
        ]),
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Enum(Box::new(e)))),
        "enum class E : unsigned\n{\n  A = 1,\n  B\n};\n"
    );
}

#[test]
fn opaque_enum_declaration() {
    let e = EnumDecl {
        name: "E".into(),
        is_class: false,
        underlying: None,
        items: None,
    };
    assert_eq!(emit(&Obj::new(ObjData::Enum(Box::new(e)))), "enum E;\n");
}

#[test]
fn blob_is_verbatim() {
    let obj = Obj::new(ObjData::Blob(Blob {
        blob: "  anything goes\n".into(),
    }));
    assert_eq!(emit_at(&obj, Indent::new().deeper()), "  anything goes\n");
}

#[test]
fn var_list_uses_unmasked_modifiers() {
    let l = VarList {
        attr: Attr::empty(),
        base_type: "bool".into(),
        decls: vec![
            VarDeclInList {
                modifier: TypeModifier::default(),
                decl: VarDecl::named("m_bErrors"),
            },
            VarDeclInList {
                modifier: TypeModifier {
                    ref_type: RefType::None,
                    ptr_level: 1,
                    const_bits: 0,
                },
                decl: VarDecl::named("m_pLog"),
            },
        ],
    };
    assert_eq!(
        emit(&Obj::new(ObjData::VarList(l))),
        "bool m_bErrors, *m_pLog;\n"
    );
}

#[test]
fn extern_c_block_layout() {
    let mut c = Compound::new(CompoundType::ExternC);
    let f = Function {
        attr: Attr::empty(),
        template_params: None,
        decor1: None,
        decor2: None,
        ret_type: Some(Box::new(VarType::named("int"))),
        name: "f".into(),
        params: None,
        defn: None,
    };
    c.members.push(Obj::new(ObjData::Function(Box::new(f))));
    assert_eq!(
        emit(&Obj::new(ObjData::Compound(Box::new(c)))),
        "extern \"C\" {\n  int f();\n  }\n"
    );
}

#[test]
fn switch_cases_one_level_deeper_than_brace() {
    let call = |name: &str| {
        Obj::new(ObjData::Expression(Box::new(Expr {
            oper: Operator::FunctionCall,
            expr1: Some(ExprAtom::text(name)),
            expr2: None,
            ..Expr::default()
        })))
    };
    let body_of = |obj: Obj| {
        let mut c = Compound::new(CompoundType::Block);
        c.members.push(obj);
        Some(Box::new(c))
    };
    let b = SwitchBlock {
        cond: Expr::atom("x"),
        cases: vec![
            SwitchCase {
                label: Some(Expr::atom("1")),
                body: body_of(call("f")),
            },
            SwitchCase {
                label: Some(Expr::atom("2")),
                body: None,
            },
            SwitchCase {
                label: None,
                body: body_of(call("g")),
            },
        ],
    };
    assert_eq!(
        emit(&Obj::new(ObjData::SwitchBlock(Box::new(b)))),
        "switch(x)\n{\n  case 1:\n    f();\n  case 2:\n  default:\n    g();\n}\n"
    );
}

#[test]
fn parameters_never_carry_statement_terminators() {
    let mut param = VarType::named("int");
    param.attr |= Attr::FUNC_PARAM;
    let f = Function {
        attr: Attr::empty(),
        template_params: None,
        decor1: None,
        decor2: None,
        ret_type: Some(Box::new(VarType::named("void"))),
        name: "set".into(),
        params: Some(vec![var_obj(param, "value")]),
        defn: None,
    };
    assert_eq!(
        emit(&Obj::new(ObjData::Function(Box::new(f)))),
        "void set(int value);\n"
    );
}
