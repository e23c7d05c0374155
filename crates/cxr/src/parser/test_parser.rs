use pretty_assertions::assert_eq;

use lang_cxx::ast::*;
use lang_cxx::visit::for_each_member;

use super::{Parser, ParserConfig};
use crate::emit::{Indent, Writer};

fn parse_with(config: ParserConfig, source: &str) -> Obj {
    Parser::new(config)
        .parse_source(source)
        .expect("source should parse")
}

fn parse(source: &str) -> Obj {
    parse_with(ParserConfig::new(), source)
}

fn emit(root: &Obj) -> String {
    let mut buf = Vec::new();
    Writer::new()
        .emit(root, &mut buf, Indent::new())
        .expect("emitting to a vec cannot fail");
    String::from_utf8(buf).expect("emitted text is utf-8")
}

fn roundtrip(source: &str) -> String {
    emit(&parse(source))
}

/// Parse-then-print must be a fixed point of itself.
fn assert_stable(source: &str) {
    let once = roundtrip(source);
    let twice = roundtrip(&once);
    assert_eq!(once, twice);
}

fn root_members(root: &Obj) -> &Vec<Obj> {
    match &root.data {
        ObjData::Compound(c) => &c.members,
        other => panic!("root must be a compound, got {:?}", other),
    }
}

#[test]
fn const_pointer_const() {
    let out = roundtrip("int const * const x;\n");
    assert_eq!(out, "const int* const x;\n");
    let stars: Vec<_> = out.split('*').collect();
    assert_eq!(stars.len(), 2, "exactly one star");
    assert_eq!(stars[0].matches("const").count(), 1, "one const before the star");
    assert_eq!(stars[1].matches("const").count(), 1, "one const after the star");
    assert_stable("int const * const x;\n");
}

#[test]
fn class_with_access_runs() {
    let source = "class A : public B, protected C { public: int a; private: int b; };\n";
    assert_eq!(
        roundtrip(source),
        "class A : public B, protected C\n{\npublic:\n  int a;\nprivate:\n  int b;\n};\n"
    );
    assert_stable(source);
}

#[test]
fn nested_conditional_indent() {
    let source = "#ifdef X\n#if Y\n#endif\n#endif\n";
    assert_eq!(roundtrip(source), "#ifdef X\n# if Y\n# endif\n#endif\n");
    assert_stable(source);
}

#[test]
fn enum_class_trailing_comma() {
    let source = "enum class E : unsigned { A = 1, B };\n";
    assert_eq!(
        roundtrip(source),
        "enum class E : unsigned\n{\n  A = 1,\n  B\n};\n"
    );
    assert_stable(source);
}

#[test]
fn template_function_keeps_override_final_order() {
    let source = "template<typename T> void f(T&& x) override final;\n";
    assert_eq!(
        roundtrip(source),
        "template <typename T>\nvoid f(T&& x) override final;\n"
    );
    assert_stable(source);
}

#[test]
fn statements_canonicalize_to_braced_blocks() {
    let source = "void Update(int n)\n{\n  if (n > 0) { total += n; } else { Reset(); }\n  for (int i = 0; i < n; ++i) { Step(i); }\n  do { Drain(); } while (busy);\n  switch (n) { case 0: Reset(); default: Step(n); }\n  return total;\n}\n";
    let expected = "void Update(int n)\n{\n  if (n > 0)\n  {\n    total += n;\n  }\n  else \n  {\n    Reset();\n  }\n  for (int i = 0; i < n; ++i)\n  {\n    Step(i);\n  }\n  do\n  {\n    Drain();\n  } while (busy);\n  switch(n)\n  {\n    case 0:\n      Reset();\n    default:\n      Step(n);\n  }\n  return total;\n}\n";
    assert_eq!(roundtrip(source), expected);
    assert_stable(source);
}

#[test]
fn directives_survive_roundtrip() {
    let source = "#include <chrono>\n#define WX_PREC 2\n#pragma once\n#undef WX_PREC\n";
    assert_eq!(
        roundtrip(source),
        "#include <chrono>\n#define WX_PREC\t2\n#pragma once\n#undef WX_PREC\n"
    );
    assert_stable(source);
}

#[test]
fn doc_comments_are_kept_verbatim() {
    let source = "// log sink interface\n// second line\nint a;\n";
    assert_eq!(roundtrip(source), source);

    let block = "/* multi\n * line */\nint a;\n";
    assert_eq!(roundtrip(block), block);
}

#[test]
fn full_header_roundtrips_byte_identically() {
    let mut config = ParserConfig::new();
    config.add_known_api_decors(vec!["WXDLLIMPEXP_CORE"]);
    config.add_known_macros(vec!["wxDECLARE_DYNAMIC_CLASS"]);

    let source = "#ifndef _WX_PALETTE_H_\n\
                  # define _WX_PALETTE_H_\n\
                  # include \"wx/gdiobj.h\"\n\
                  class WXDLLIMPEXP_CORE wxPalette : public wxPaletteBase\n\
                  {\n\
                  public:\n\
                  \x20 wxPalette();\n\
                  \x20 bool Create(int n, const unsigned char* red);\n\
                  \x20 int GetColoursCount() const override;\n\
                  protected:\n\
                  \x20 wxGDIRefData* CreateGDIRefData() const override;\n\
                  \x20 wxDECLARE_DYNAMIC_CLASS(wxPalette);\n\
                  };\n\
                  #endif\n";
    let out = emit(&parse_with(config, source));
    assert_eq!(out, source);
}

#[test]
fn constructor_with_initializer_list() {
    let source = "class A { A(int x) : m_x(x), m_y(0) { } };\n";
    assert_eq!(
        roundtrip(source),
        "class A\n{\n  A(int x)\n    : m_x(x)\n    , m_y(0)\n  {\n  }\n};\n"
    );
    assert_stable(source);
}

#[test]
fn deleted_constructor_suffix() {
    let source = "class A { A(const A& other) = delete; };\n";
    assert_eq!(
        roundtrip(source),
        "class A\n{\n  A(const A& other) = delete;\n};\n"
    );
}

#[test]
fn destructor_and_converter() {
    let source = "class A { virtual ~A(); operator bool() const; };\n";
    assert_eq!(
        roundtrip(source),
        "class A\n{\n  virtual ~A();\n  operator bool() const;\n};\n"
    );
}

#[test]
fn operator_overload_is_a_plain_function() {
    let source = "bool operator==(const A& other) const;\n";
    assert_eq!(roundtrip(source), "bool operator==(const A& other) const;\n");
}

#[test]
fn typedefs() {
    assert_eq!(
        roundtrip("typedef unsigned long size_type;\n"),
        "typedef unsigned long size_type;\n"
    );
    assert_eq!(
        roundtrip("typedef int (*Handler)(char);\n"),
        "typedef int (*Handler) (char);\n"
    );
    assert_stable("typedef int (*Handler)(char);\n");
}

#[test]
fn using_declarations() {
    assert_eq!(
        roundtrip("using GrStdSteadyClock = std::chrono::steady_clock;\n"),
        "using GrStdSteadyClock = std::chrono::steady_clock;\n"
    );
    assert_eq!(roundtrip("using namespace std;\n"), "using namespace std;\n");
}

#[test]
fn forward_declarations() {
    let mut config = ParserConfig::new();
    config.add_known_api_decors(vec!["WXDLLIMPEXP_FWD_CORE"]);
    let out = emit(&parse_with(
        config,
        "class WXDLLIMPEXP_FWD_CORE wxTextCtrl;\nfriend class Helper;\n",
    ));
    assert_eq!(
        out,
        "class WXDLLIMPEXP_FWD_CORE wxTextCtrl;\nfriend class Helper;\n"
    );
}

#[test]
fn namespaces_nest() {
    let source = "namespace outer { namespace inner { int depth; } }\n";
    assert_eq!(
        roundtrip(source),
        "namespace outer\n{\n  namespace inner\n  {\n    int depth;\n  }\n}\n"
    );
    assert_stable(source);
}

#[test]
fn extern_c_block() {
    let source = "extern \"C\" {\nint f();\n}\n";
    assert_eq!(roundtrip(source), "extern \"C\" {\n  int f();\n  }\n");
    assert_stable(source);
}

#[test]
fn var_list_keeps_per_decl_modifiers() {
    let source = "bool m_bErrors, m_bWarnings, *m_pLog;\n";
    assert_eq!(roundtrip(source), "bool m_bErrors, m_bWarnings, *m_pLog;\n");
}

#[test]
fn ignorable_macros_are_erased() {
    let mut config = ParserConfig::new();
    config.add_ignorable_macros(vec!["WXUNUSED"]);
    let out = emit(&parse_with(config, "void f(int WXUNUSED(x));\n"));
    assert_eq!(out, "void f(int);\n");
}

#[test]
fn renamed_keywords_are_canonicalized() {
    let mut config = ParserConfig::new();
    config.add_renamed_keyword("override", "wxOVERRIDE");
    let out = emit(&parse_with(config, "virtual void Flush() wxOVERRIDE;\n"));
    assert_eq!(out, "virtual void Flush() override;\n");
}

#[test]
fn known_macro_without_semicolon() {
    let mut config = ParserConfig::new();
    config.add_known_macros(vec!["SK_BEGIN_REQUIRE_DENSE"]);
    let out = emit(&parse_with(
        config,
        "SK_BEGIN_REQUIRE_DENSE\nstruct Dense { };\n",
    ));
    assert_eq!(out, "SK_BEGIN_REQUIRE_DENSE\nstruct Dense\n{\n};\n");
}

#[test]
fn false_conditional_groups_are_dropped() {
    let mut config = ParserConfig::new();
    config.add_defined_name("WXWIN_COMPATIBILITY_2_8", 0);
    let out = emit(&parse_with(
        config,
        "#if WXWIN_COMPATIBILITY_2_8\nint old();\n#endif\nint current();\n",
    ));
    assert_eq!(out, "int current();\n");
}

#[test]
fn true_conditional_groups_are_spliced_in() {
    let mut config = ParserConfig::new();
    config.add_undefined_names(vec!["SWIG"]);
    let out = emit(&parse_with(
        config,
        "#ifndef SWIG\nint keep();\n#endif\n",
    ));
    assert_eq!(out, "int keep();\n");
}

#[test]
fn else_branch_of_false_group_is_taken() {
    let mut config = ParserConfig::new();
    config.add_defined_name("WXWIN_COMPATIBILITY_2_8", 0);
    let out = emit(&parse_with(
        config,
        "#if WXWIN_COMPATIBILITY_2_8\nint old();\n#else\nint fresh();\n#endif\n",
    ));
    assert_eq!(out, "int fresh();\n");
}

#[test]
fn undecidable_conditionals_keep_all_branches() {
    let source = "#if defined(__GLIBCXX__)\nusing Clock = monotonic;\n#else\nusing Clock = steady;\n#endif\n";
    let out = roundtrip(source);
    assert!(out.contains("#if defined(__GLIBCXX__)"));
    assert!(out.contains("#else"));
    assert!(out.contains("monotonic"));
    assert!(out.contains("steady"));
}

#[test]
fn enum_body_blob_mode() {
    let mut config = ParserConfig::new();
    config.parse_enum_body_as_blob();
    let out = emit(&parse_with(config, "enum Flags\n{\n  A,\n  B = 2\n};\n"));
    assert_eq!(out, "enum Flags\n{\nA,\nB=2\n};\n");
}

#[test]
fn enum_with_embedded_directives() {
    let source = "enum GrClipType { kNone_ClipType,\n#ifdef EXTRA\n  kExtra_ClipType,\n#endif\n  kLast_ClipType };\n";
    let root = parse(source);
    let members = root_members(&root);
    assert_eq!(members.len(), 1);
    match &members[0].data {
        ObjData::Enum(e) => {
            let items = e.items.as_ref().expect("structural items");
            assert_eq!(items.len(), 5);
            assert!(matches!(items[1], EnumItem::Embedded(_)));
            assert!(matches!(items[3], EnumItem::Embedded(_)));
        }
        other => panic!("expected an enum, got {:?}", other),
    }
    assert_stable(source);
}

#[test]
fn struct_with_instance_declarator() {
    let source = "struct Point { int x; int y; } origin;\n";
    let root = parse(source);
    let members = root_members(&root);
    assert_eq!(members.len(), 1);
    match &members[0].data {
        ObjData::Var(v) => {
            assert_eq!(v.decl.name, "origin");
            assert!(matches!(v.var_type.base, TypeBase::Compound(_)));
        }
        other => panic!("expected a var with compound type, got {:?}", other),
    }
}

#[test]
fn function_pointer_parameter() {
    let source = "void set(int (*cb)(int));\n";
    assert_eq!(roundtrip(source), "void set(int (*cb) (int));\n");
    assert_stable(source);
}

#[test]
fn expression_statements() {
    let source = "void f()\n{\n  x = a < b ? a : b;\n  p->Notify();\n  delete[] buffer;\n  n = sizeof(Header);\n  v = static_cast<int>(raw);\n}\n";
    let expected = "void f()\n{\n  x = a < b ? a : b;\n  p->Notify();\n  delete[] buffer;\n  n = sizeof(Header);\n  v = static_cast<int>(raw);\n}\n";
    assert_eq!(roundtrip(source), expected);
    assert_stable(source);
}

#[test]
fn unmatched_closing_brace_is_a_parse_failure() {
    let err = Parser::new(ParserConfig::new())
        .parse_source("}\n")
        .expect_err("stray brace must fail");
    assert!(matches!(err, super::Error::Syntax { .. }));
}

#[test]
fn members_keep_insertion_order() {
    let root = parse("int a;\nint b;\nclass C { };\n");
    match &root.data {
        ObjData::Compound(c) => {
            let mut kinds = Vec::new();
            for_each_member(c, |m| {
                kinds.push(m.kind());
                false
            });
            assert_eq!(kinds, vec![ObjKind::Var, ObjKind::Var, ObjKind::Compound]);
        }
        other => panic!("expected the file root, got {:?}", other),
    }
}

#[test]
fn blob_fallback_keeps_unmodeled_text() {
    // a bitfield has no structural form and must survive as a blob
    let source = "struct Packed { unsigned bits : 4; };\n";
    let root = parse(source);
    let members = root_members(&root);
    match &members[0].data {
        ObjData::Compound(c) => {
            assert!(c.members.iter().any(|m| m.kind() == ObjKind::Blob));
        }
        other => panic!("expected a struct, got {:?}", other),
    }
    assert_stable(source);
}
