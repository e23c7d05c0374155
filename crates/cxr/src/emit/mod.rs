//! Deterministic C++ pretty-printer.
//!
//! `Writer` turns any AST back into well-indented C++ text. Output depends
//! only on the tree and the starting indent; the single piece of state a
//! writer keeps across nodes is the preprocessor indent counter that
//! aligns nested `#if`/`#endif` directives. The writer never fails on the
//! tree itself — only sink errors propagate.

use std::fmt;
use std::io::{self, Write};

use lang_cxx::ast::*;

#[cfg(test)]
mod test_emit;

/// What the writer is producing: everything, or a header-style view with
/// function bodies elided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmittingType {
    Raw,
    Header,
}

/// Copyable indentation level; renders two spaces per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indent(u16);

impl Indent {
    pub fn new() -> Indent {
        Indent(0)
    }

    pub fn deeper(self) -> Indent {
        Indent(self.0 + 1)
    }

    pub fn shallower(self) -> Indent {
        Indent(self.0.saturating_sub(1))
    }
}

impl fmt::Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_str("  ")?;
        }
        Ok(())
    }
}

fn emit_attr(attr: Attr, w: &mut dyn Write) -> io::Result<()> {
    debug_assert!(
        (attr & (Attr::STATIC | Attr::EXTERN | Attr::EXTERN_C))
            .bits()
            .count_ones()
            <= 1,
        "storage-class flags must be mutually exclusive"
    );
    if attr.contains(Attr::STATIC) {
        write!(w, "static ")?;
    } else if attr.contains(Attr::EXTERN) {
        write!(w, "extern ")?;
    } else if attr.contains(Attr::EXTERN_C) {
        write!(w, "extern C ")?;
    }
    if attr.contains(Attr::CONST) {
        write!(w, "const ")?;
    } else if attr.contains(Attr::VOLATILE) {
        write!(w, "volatile ")?;
    }
    Ok(())
}

fn emit_type_modifier(modifier: &TypeModifier, w: &mut dyn Write) -> io::Result<()> {
    let mut bit = 0u32;
    while bit < u32::from(modifier.ptr_level) {
        if modifier.const_bits & (1 << bit) != 0 {
            write!(w, " const ")?;
        }
        write!(w, "*")?;
        bit += 1;
    }
    if modifier.const_bits & (1 << bit) != 0 {
        write!(w, " const")?;
    }
    match modifier.ref_type {
        RefType::ByRef => write!(w, "&")?,
        RefType::RValRef => write!(w, "&&")?,
        RefType::None => {}
    }
    Ok(())
}

pub struct Writer {
    prepro_indent: i32,
    emitting_type: EmittingType,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer::new()
    }
}

impl Writer {
    pub fn new() -> Writer {
        Writer {
            prepro_indent: 0,
            emitting_type: EmittingType::Raw,
        }
    }

    pub fn with_emitting_type(emitting_type: EmittingType) -> Writer {
        Writer {
            prepro_indent: 0,
            emitting_type,
        }
    }

    /// Emits `obj` and everything below it to `w`, lines prefixed with
    /// `indent`.
    pub fn emit(&mut self, obj: &Obj, w: &mut dyn Write, indent: Indent) -> io::Result<()> {
        self.emit_obj(obj, w, indent, false)
    }

    fn emit_obj(
        &mut self,
        obj: &Obj,
        w: &mut dyn Write,
        indent: Indent,
        no_newline: bool,
    ) -> io::Result<()> {
        match &obj.data {
            ObjData::HashDefine(d) => self.emit_define(d, w),
            ObjData::HashUndef(u) => self.emit_undef(u, w),
            ObjData::HashInclude(i) => self.emit_include(i, w),
            ObjData::HashIf(h) => self.emit_hash_if(h, w),
            ObjData::HashPragma(p) => self.emit_pragma(p, w),
            ObjData::VarType(v) => self.emit_var_type(v, w),
            ObjData::Var(v) => {
                self.emit_var(v, w, indent)?;
                if !no_newline {
                    write!(w, ";\n")?;
                }
                Ok(())
            }
            ObjData::VarList(l) => self.emit_var_list(l, w, indent),
            ObjData::Enum(e) => self.emit_enum(e, w, indent),
            ObjData::DocComment(d) => write!(w, "{}\n", d.doc),
            ObjData::UsingDecl(u) => self.emit_using_decl(u, w, indent),
            ObjData::TypedefName(t) => self.emit_typedef(t, w, indent),
            ObjData::TypedefNameList(t) => self.emit_typedef_list(t, w, indent),
            ObjData::Compound(c) => self.emit_compound(c, w, indent, !no_newline),
            ObjData::FwdClsDecl(f) => self.emit_fwd_decl(f, w, indent),
            ObjData::Function(f) => self.emit_function(f, false, w, indent),
            ObjData::Constructor(c) => self.emit_constructor(c, w, indent),
            ObjData::Destructor(d) => self.emit_destructor(d, w, indent),
            ObjData::TypeConverter(t) => self.emit_type_converter(t, w, indent),
            ObjData::FunctionPtr(f) => {
                if f.attr.contains(Attr::TYPEDEF) {
                    write!(w, "{}typedef ", indent)?;
                }
                self.emit_function(f, true, w, indent)
            }
            ObjData::IfBlock(b) => self.emit_if_block(b, w, indent),
            ObjData::WhileBlock(b) => self.emit_while_block(b, w, indent),
            ObjData::DoWhileBlock(b) => self.emit_do_block(b, w, indent),
            ObjData::ForBlock(b) => self.emit_for_block(b, w, indent),
            ObjData::Expression(e) => {
                self.emit_expr(e, w, indent)?;
                if !no_newline {
                    write!(w, ";\n")?;
                }
                Ok(())
            }
            ObjData::SwitchBlock(b) => self.emit_switch_block(b, w, indent),
            ObjData::MacroCall(m) => write!(w, "{}{}\n", indent, m.call),
            ObjData::Blob(b) => write!(w, "{}", b.blob),
        }
    }

    fn prepro(&self) -> String {
        " ".repeat(self.prepro_indent.max(0) as usize)
    }

    fn emit_define(&mut self, d: &Define, w: &mut dyn Write) -> io::Result<()> {
        write!(w, "#{}define {}", self.prepro(), d.name)?;
        if !d.defn.is_empty() {
            write!(w, "\t{}", d.defn)?;
        }
        write!(w, "\n")
    }

    fn emit_undef(&mut self, u: &Undef, w: &mut dyn Write) -> io::Result<()> {
        write!(w, "#{}undef {}\n", self.prepro(), u.name)
    }

    fn emit_include(&mut self, i: &Include, w: &mut dyn Write) -> io::Result<()> {
        write!(w, "#{}include {}\n", self.prepro(), i.name)
    }

    fn emit_pragma(&mut self, p: &Pragma, w: &mut dyn Write) -> io::Result<()> {
        write!(w, "#{}pragma {}\n", self.prepro(), p.defn)
    }

    fn emit_hash_if(&mut self, h: &HashIf, w: &mut dyn Write) -> io::Result<()> {
        match h.cond_type {
            CondType::If => {
                write!(w, "#{}if {}\n", self.prepro(), h.cond)?;
                self.prepro_indent += 1;
            }
            CondType::IfDef => {
                write!(w, "#{}ifdef {}\n", self.prepro(), h.cond)?;
                self.prepro_indent += 1;
            }
            CondType::IfNDef => {
                write!(w, "#{}ifndef {}\n", self.prepro(), h.cond)?;
                self.prepro_indent += 1;
            }
            CondType::ElIf => {
                self.prepro_indent -= 1;
                write!(w, "#{}elif {}\n", self.prepro(), h.cond)?;
                self.prepro_indent += 1;
            }
            CondType::Else => {
                self.prepro_indent -= 1;
                write!(w, "#{}else {}\n", self.prepro(), h.cond)?;
                self.prepro_indent += 1;
            }
            CondType::EndIf => {
                self.prepro_indent -= 1;
                write!(w, "#{}endif\n", self.prepro())?;
            }
        }
        Ok(())
    }

    fn emit_var_type(&mut self, vt: &VarType, w: &mut dyn Write) -> io::Result<()> {
        let mut attr = vt.attr;
        if vt.is_const() {
            attr |= Attr::CONST;
        }
        emit_attr(attr, w)?;
        match &vt.base {
            TypeBase::Name(name) => write!(w, "{}", name)?,
            TypeBase::Compound(obj) => self.emit_obj(obj, w, Indent::new(), true)?,
        }
        // the base-level const was already printed through the attribute
        // path; mask it off before walking the stars
        let modifier = TypeModifier {
            const_bits: vt.modifier.const_bits & !1,
            ..vt.modifier
        };
        emit_type_modifier(&modifier, w)
    }

    fn emit_var_decl(&mut self, decl: &VarDecl, w: &mut dyn Write) -> io::Result<()> {
        if !decl.name.is_empty() {
            write!(w, "{}", decl.name)?;
        }
        for size in &decl.array_sizes {
            write!(w, "[")?;
            if let Some(e) = size {
                self.emit_expr(e, w, Indent::new())?;
            }
            write!(w, "]")?;
        }
        match decl.assign_type {
            AssignType::UsingEqual => {
                write!(w, " = ")?;
                if let Some(value) = &decl.assign_value {
                    self.emit_obj(value, w, Indent::new(), true)?;
                }
            }
            AssignType::UsingBracket => {
                write!(w, "(")?;
                if let Some(value) = &decl.assign_value {
                    self.emit_obj(value, w, Indent::new(), true)?;
                }
                write!(w, ")")?;
            }
            AssignType::UsingBraces => {
                write!(w, "{{")?;
                if let Some(value) = &decl.assign_value {
                    self.emit_obj(value, w, Indent::new(), true)?;
                }
                write!(w, "}}")?;
            }
            AssignType::None => {}
        }
        Ok(())
    }

    fn emit_var(&mut self, v: &Var, w: &mut dyn Write, indent: Indent) -> io::Result<()> {
        write!(w, "{}", indent)?;
        if let Some(decor) = &v.apidecor {
            write!(w, "{} ", decor)?;
        }
        self.emit_var_type(&v.var_type, w)?;
        if !v.decl.name.is_empty() {
            write!(w, " ")?;
        }
        self.emit_var_decl(&v.decl, w)
    }

    fn emit_var_list(&mut self, l: &VarList, w: &mut dyn Write, indent: Indent) -> io::Result<()> {
        write!(w, "{}", indent)?;
        emit_attr(l.attr, w)?;
        write!(w, "{} ", l.base_type)?;
        for (i, entry) in l.decls.iter().enumerate() {
            if i > 0 {
                write!(w, ", ")?;
            }
            emit_type_modifier(&entry.modifier, w)?;
            self.emit_var_decl(&entry.decl, w)?;
        }
        write!(w, ";\n")
    }

    fn emit_enum(&mut self, e: &EnumDecl, w: &mut dyn Write, indent: Indent) -> io::Result<()> {
        write!(w, "{}enum", indent)?;
        if e.is_class {
            write!(w, " class")?;
        }
        if !e.name.is_empty() {
            write!(w, " {}", e.name)?;
        }
        if let Some(underlying) = &e.underlying {
            write!(w, " : {}", underlying)?;
        }
        if let Some(items) = &e.items {
            write!(w, "\n{}{{\n", indent)?;
            let inner = indent.deeper();
            for (i, item) in items.iter().enumerate() {
                match item {
                    EnumItem::Embedded(obj) => self.emit_obj(obj, w, inner, false)?,
                    EnumItem::Named { name, val } => {
                        write!(w, "{}{}", inner, name)?;
                        if let Some(v) = val {
                            write!(w, " = ")?;
                            self.emit_expr(v, w, Indent::new())?;
                        }
                        if i + 1 < items.len() {
                            write!(w, ",\n")?;
                        } else {
                            write!(w, "\n")?;
                        }
                    }
                }
            }
            write!(w, "{}}}", indent)?;
        }
        write!(w, ";\n")
    }

    fn emit_typedef(
        &mut self,
        t: &TypedefName,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}typedef ", indent)?;
        self.emit_var(&t.var, w, Indent::new())?;
        write!(w, ";\n")
    }

    fn emit_typedef_list(
        &mut self,
        t: &TypedefList,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}typedef ", indent)?;
        self.emit_var_list(&t.var_list, w, Indent::new())
    }

    fn emit_using_decl(
        &mut self,
        u: &UsingDecl,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        if let Some(params) = &u.template_params {
            self.emit_templ_spec(params, w, indent)?;
        }
        write!(w, "{}using {}", indent, u.name)?;
        if let Some(target) = &u.target {
            write!(w, " = ")?;
            self.emit_obj(target, w, Indent::new(), false)?;
        }
        write!(w, ";\n")
    }

    fn emit_fwd_decl(
        &mut self,
        f: &FwdClsDecl,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        if let Some(params) = &f.template_params {
            self.emit_templ_spec(params, w, indent)?;
        }
        write!(w, "{}", indent)?;
        if f.attr.contains(Attr::FRIEND) {
            write!(w, "friend ")?;
        }
        write!(w, "{} ", f.cmp_type.keyword())?;
        if let Some(decor) = &f.apidecor {
            write!(w, "{} ", decor)?;
        }
        write!(w, "{};\n", f.name)
    }

    fn emit_templ_spec(
        &mut self,
        params: &[TemplateParam],
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}template <", indent)?;
        let mut sep = "";
        for param in params {
            write!(w, "{}", sep)?;
            match &param.param_type {
                Some(vt) => {
                    self.emit_var_type(vt, w)?;
                    write!(w, " ")?;
                }
                None => write!(w, "typename ")?,
            }
            write!(w, "{}", param.name)?;
            if let Some(default) = &param.default_arg {
                write!(w, " = ")?;
                self.emit_obj(default, w, Indent::new(), true)?;
            }
            sep = ", ";
        }
        write!(w, ">\n")
    }

    fn emit_compound(
        &mut self,
        c: &Compound,
        w: &mut dyn Write,
        indent: Indent,
        emit_newline: bool,
    ) -> io::Result<()> {
        if c.is_namespace_like() {
            if let Some(params) = &c.template_params {
                self.emit_templ_spec(params, w, indent)?;
            }
            write!(w, "{}{} ", indent, c.compound_type)?;
            if let Some(decor) = &c.apidecor {
                write!(w, "{} ", decor)?;
            }
            if let Some(name) = &c.name {
                write!(w, "{}", name)?;
            }
        }
        if let Some(inheritance) = &c.inheritance {
            write!(w, " ")?;
            let mut sep = ':';
            for item in inheritance {
                write!(w, "{} {} {}", sep, item.access, item.base)?;
                sep = ',';
            }
        }
        let mut member_indent = indent;
        if c.is_namespace_like() {
            write!(w, "\n{}{{\n", indent)?;
            member_indent = indent.deeper();
        } else if c.compound_type == CompoundType::ExternC {
            write!(w, "{}extern \"C\" {{\n", indent)?;
            member_indent = indent.deeper();
        }

        let mut last_access = AccessType::Unknown;
        for member in &c.members {
            if c.is_class_like()
                && member.access_type != AccessType::Unknown
                && last_access != member.access_type
            {
                write!(w, "{}{}:\n", indent, member.access_type)?;
                last_access = member.access_type;
            }
            self.emit_obj(member, w, member_indent, false)?;
        }

        if c.is_namespace_like() {
            write!(w, "{}}}", indent)?;
            if emit_newline {
                if c.is_class_like() {
                    write!(w, ";")?;
                }
                write!(w, "\n")?;
            }
        } else if c.compound_type == CompoundType::ExternC {
            write!(w, "{}}}\n", member_indent)?;
        }
        Ok(())
    }

    fn emit_param_list(&mut self, params: &[Obj], w: &mut dyn Write) -> io::Result<()> {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                write!(w, ", ")?;
            }
            match &param.data {
                ObjData::Var(v) => self.emit_var(v, w, Indent::new())?,
                ObjData::FunctionPtr(f) => self.emit_function(f, true, w, Indent::new())?,
                _ => {
                    debug_assert!(false, "parameter must be a Var or a FunctionPtr");
                    log::debug!("emit_param_list: skipping {:?}", param.kind());
                }
            }
        }
        Ok(())
    }

    fn emit_function(
        &mut self,
        f: &Function,
        is_ptr: bool,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        if let Some(params) = &f.template_params {
            self.emit_templ_spec(params, w, indent)?;
        }
        if !f.attr.intersects(Attr::FUNC_PARAM | Attr::TYPEDEF) {
            write!(w, "{}", indent)?;
        }
        if let Some(decor) = &f.decor1 {
            write!(w, "{} ", decor)?;
        }
        if f.attr.contains(Attr::STATIC) {
            write!(w, "static ")?;
        } else if f.attr.contains(Attr::EXTERN) {
            write!(w, "extern ")?;
        } else if f.attr.contains(Attr::VIRTUAL) {
            write!(w, "virtual ")?;
        } else if f.attr.contains(Attr::INLINE) {
            write!(w, "inline ")?;
        } else if f.attr.contains(Attr::EXPLICIT) {
            write!(w, "explicit ")?;
        } else if f.attr.contains(Attr::FRIEND) {
            write!(w, "friend ")?;
        }
        if let Some(ret) = &f.ret_type {
            self.emit_var_type(ret, w)?;
        }
        if is_ptr {
            write!(w, " (")?;
        } else {
            write!(w, " ")?;
        }
        if let Some(decor) = &f.decor2 {
            write!(w, "{} ", decor)?;
        }
        if is_ptr {
            write!(w, "*{}) ", f.name)?;
        } else {
            write!(w, "{}", f.name)?;
        }
        write!(w, "(")?;
        if let Some(params) = &f.params {
            self.emit_param_list(params, w)?;
        }
        write!(w, ")")?;

        if f.attr.contains(Attr::CONST) {
            write!(w, " const")?;
        }
        if f.attr.contains(Attr::PURE_VIRTUAL) {
            write!(w, " = 0")?;
        }
        if f.attr.contains(Attr::OVERRIDE) {
            write!(w, " override")?;
        }
        if f.attr.contains(Attr::FINAL) {
            write!(w, " final")?;
        }

        match &f.defn {
            Some(body) if self.emitting_type != EmittingType::Header => {
                write!(w, "\n{}{{\n", indent)?;
                self.emit_compound(body, w, indent.deeper(), true)?;
                write!(w, "{}}}\n", indent)?;
                Ok(())
            }
            _ => {
                if !f.attr.contains(Attr::FUNC_PARAM) {
                    write!(w, ";\n")?;
                }
                Ok(())
            }
        }
    }

    fn emit_constructor(
        &mut self,
        c: &Constructor,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        if let Some(params) = &c.template_params {
            self.emit_templ_spec(params, w, indent)?;
        }
        write!(w, "{}", indent)?;
        if let Some(decor) = &c.decor1 {
            write!(w, "{} ", decor)?;
        }
        if c.attr.contains(Attr::INLINE) {
            write!(w, "inline ")?;
        } else if c.attr.contains(Attr::EXPLICIT) {
            write!(w, "explicit ")?;
        }
        write!(w, "{}(", c.name)?;
        if let Some(params) = &c.params {
            self.emit_param_list(params, w)?;
        }
        write!(w, ")")?;
        if let Some(inits) = &c.mem_inits {
            let inner = indent.deeper();
            let mut sep = ':';
            for init in inits {
                write!(w, "\n{}{} {}(", inner, sep, init.member)?;
                self.emit_expr(&init.init, w, Indent::new())?;
                write!(w, ")")?;
                sep = ',';
            }
        }
        match &c.defn {
            Some(body) => {
                write!(w, "\n{}{{\n", indent)?;
                self.emit_compound(body, w, indent.deeper(), true)?;
                write!(w, "{}}}\n", indent)?;
                Ok(())
            }
            None => {
                if c.attr.contains(Attr::DELETED) {
                    write!(w, " = delete")?;
                }
                write!(w, ";\n")
            }
        }
    }

    fn emit_destructor(
        &mut self,
        d: &Destructor,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        if let Some(params) = &d.template_params {
            self.emit_templ_spec(params, w, indent)?;
        }
        write!(w, "{}", indent)?;
        if let Some(decor) = &d.decor1 {
            write!(w, "{} ", decor)?;
        }
        if d.attr.contains(Attr::INLINE) {
            write!(w, "inline ")?;
        } else if d.attr.contains(Attr::EXPLICIT) {
            write!(w, "explicit ")?;
        } else if d.attr.contains(Attr::VIRTUAL) {
            write!(w, "virtual ")?;
        }
        write!(w, "{}()", d.name)?;
        match &d.defn {
            Some(body) => {
                write!(w, "\n{}{{\n", indent)?;
                self.emit_compound(body, w, indent.deeper(), true)?;
                write!(w, "{}}}\n", indent)?;
                Ok(())
            }
            None => write!(w, ";\n"),
        }
    }

    fn emit_type_converter(
        &mut self,
        t: &TypeConverter,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        if let Some(params) = &t.template_params {
            self.emit_templ_spec(params, w, indent)?;
        }
        write!(w, "{}operator ", indent)?;
        self.emit_var_type(&t.to, w)?;
        write!(w, "()")?;
        if t.attr.contains(Attr::CONST) {
            write!(w, " const")?;
        }
        match &t.defn {
            Some(body) => {
                write!(w, "\n{}{{\n", indent)?;
                self.emit_compound(body, w, indent.deeper(), true)?;
                write!(w, "{}}}\n", indent)?;
                Ok(())
            }
            None => write!(w, ";\n"),
        }
    }

    fn emit_expr_atom(&mut self, atom: &ExprAtom, w: &mut dyn Write) -> io::Result<()> {
        match atom {
            ExprAtom::Text(text) => write!(w, "{}", text),
            ExprAtom::Expr(e) => self.emit_expr(e, w, Indent::new()),
            ExprAtom::VarType(vt) => self.emit_var_type(vt, w),
        }
    }

    fn emit_opt_atom(&mut self, atom: &Option<ExprAtom>, w: &mut dyn Write) -> io::Result<()> {
        if let Some(atom) = atom {
            self.emit_expr_atom(atom, w)?;
        }
        Ok(())
    }

    fn emit_expr(&mut self, e: &Expr, w: &mut dyn Write, indent: Indent) -> io::Result<()> {
        write!(w, "{}", indent)?;
        if e.flags.contains(ExprFlags::RETURN) {
            write!(w, "return ")?;
        }
        if e.flags.contains(ExprFlags::THROW) {
            write!(w, "throw ")?;
        }
        if e.flags.contains(ExprFlags::INITIALIZER) {
            write!(w, "{{")?;
        }
        if e.flags.contains(ExprFlags::BRACKETED) {
            write!(w, "(")?;
        }
        if e.flags.contains(ExprFlags::NEW) {
            write!(w, "new ")?;
        }
        if e.flags.contains(ExprFlags::SIZEOF) {
            write!(w, "sizeof(")?;
        } else if e.flags.contains(ExprFlags::DELETE) {
            write!(w, "delete ")?;
        } else if e.flags.contains(ExprFlags::DELETE_ARRAY) {
            write!(w, "delete[] ")?;
        }

        match e.oper.class() {
            OperatorClass::None => self.emit_opt_atom(&e.expr1, w)?,
            OperatorClass::UnaryPrefix => {
                write!(w, "{}", e.oper.symbol())?;
                self.emit_opt_atom(&e.expr1, w)?;
            }
            OperatorClass::UnarySuffix => {
                self.emit_opt_atom(&e.expr1, w)?;
                write!(w, "{}", e.oper.symbol())?;
            }
            OperatorClass::Binary => {
                self.emit_opt_atom(&e.expr1, w)?;
                if e.oper != Operator::Comma {
                    write!(w, " ")?;
                }
                write!(w, "{} ", e.oper.symbol())?;
                self.emit_opt_atom(&e.expr2, w)?;
            }
            OperatorClass::Deref => {
                self.emit_opt_atom(&e.expr1, w)?;
                write!(w, "{}", e.oper.symbol())?;
                self.emit_opt_atom(&e.expr2, w)?;
            }
            OperatorClass::Special => match e.oper {
                Operator::FunctionCall => {
                    self.emit_opt_atom(&e.expr1, w)?;
                    write!(w, "(")?;
                    self.emit_opt_atom(&e.expr2, w)?;
                    write!(w, ")")?;
                }
                Operator::ArrayElem => {
                    self.emit_opt_atom(&e.expr1, w)?;
                    write!(w, "[")?;
                    self.emit_opt_atom(&e.expr2, w)?;
                    write!(w, "]")?;
                }
                Operator::CStyleCast => {
                    write!(w, "(")?;
                    self.emit_opt_atom(&e.expr1, w)?;
                    write!(w, ") ")?;
                    self.emit_opt_atom(&e.expr2, w)?;
                }
                Operator::ConstCast
                | Operator::StaticCast
                | Operator::DynamicCast
                | Operator::ReinterpretCast => {
                    let keyword = match e.oper {
                        Operator::ConstCast => "const_cast",
                        Operator::StaticCast => "static_cast",
                        Operator::DynamicCast => "dynamic_cast",
                        _ => "reinterpret_cast",
                    };
                    write!(w, "{}<", keyword)?;
                    self.emit_opt_atom(&e.expr1, w)?;
                    write!(w, ">(")?;
                    self.emit_opt_atom(&e.expr2, w)?;
                    write!(w, ")")?;
                }
                Operator::Ternary => {
                    self.emit_opt_atom(&e.expr1, w)?;
                    write!(w, " ? ")?;
                    self.emit_opt_atom(&e.expr2, w)?;
                    write!(w, " : ")?;
                    self.emit_opt_atom(&e.expr3, w)?;
                }
                _ => {
                    log::debug!("emit_expr: unhandled operator {:?}", e.oper);
                }
            },
        }

        if e.flags.contains(ExprFlags::BRACKETED) {
            write!(w, ")")?;
        }
        if e.flags.contains(ExprFlags::INITIALIZER) {
            write!(w, "}}")?;
        }
        if e.flags.contains(ExprFlags::SIZEOF) {
            write!(w, ")")?;
        }
        Ok(())
    }

    fn emit_if_block(&mut self, b: &IfBlock, w: &mut dyn Write, indent: Indent) -> io::Result<()> {
        write!(w, "{}if (", indent)?;
        self.emit_obj(&b.cond, w, Indent::new(), true)?;
        write!(w, ")\n{}{{\n", indent)?;
        if let Some(body) = &b.body {
            self.emit_obj(body, w, indent.deeper(), false)?;
        }
        write!(w, "{}}}\n", indent)?;
        if let Some(else_part) = &b.else_part {
            write!(w, "{}else \n{}{{\n", indent, indent)?;
            self.emit_obj(else_part, w, indent.deeper(), false)?;
            write!(w, "{}}}\n", indent)?;
        }
        Ok(())
    }

    fn emit_while_block(
        &mut self,
        b: &WhileBlock,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}while (", indent)?;
        self.emit_obj(&b.cond, w, Indent::new(), true)?;
        write!(w, ")\n{}{{\n", indent)?;
        if let Some(body) = &b.body {
            self.emit_obj(body, w, indent.deeper(), false)?;
        }
        write!(w, "{}}}\n", indent)
    }

    fn emit_do_block(
        &mut self,
        b: &DoWhileBlock,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}do\n{}{{\n", indent, indent)?;
        if let Some(body) = &b.body {
            self.emit_obj(body, w, indent.deeper(), false)?;
        }
        write!(w, "{}}} while (", indent)?;
        self.emit_obj(&b.cond, w, Indent::new(), true)?;
        write!(w, ");\n")
    }

    fn emit_for_block(
        &mut self,
        b: &ForBlock,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}for (", indent)?;
        if let Some(start) = &b.start {
            self.emit_obj(start, w, Indent::new(), true)?;
        }
        write!(w, ";")?;
        if let Some(stop) = &b.stop {
            write!(w, " ")?;
            self.emit_expr(stop, w, Indent::new())?;
        }
        write!(w, ";")?;
        if let Some(step) = &b.step {
            write!(w, " ")?;
            self.emit_expr(step, w, Indent::new())?;
        }
        write!(w, ")\n{}{{\n", indent)?;
        if let Some(body) = &b.body {
            self.emit_obj(body, w, indent.deeper(), false)?;
        }
        write!(w, "{}}}\n", indent)
    }

    fn emit_switch_block(
        &mut self,
        b: &SwitchBlock,
        w: &mut dyn Write,
        indent: Indent,
    ) -> io::Result<()> {
        write!(w, "{}switch(", indent)?;
        self.emit_expr(&b.cond, w, Indent::new())?;
        write!(w, ")\n{}{{\n", indent)?;
        let case_indent = indent.deeper();
        for case in &b.cases {
            match &case.label {
                Some(label) => {
                    write!(w, "{}case ", case_indent)?;
                    self.emit_expr(label, w, Indent::new())?;
                    write!(w, ":\n")?;
                }
                None => write!(w, "{}default:\n", case_indent)?,
            }
            if let Some(body) = &case.body {
                self.emit_compound(body, w, case_indent.deeper(), true)?;
            }
        }
        write!(w, "{}}}\n", indent)
    }
}
