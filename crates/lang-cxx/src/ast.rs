//! Abstract syntax tree
//!
//! Types in this module represent the pieces a C++ header can contain:
//! preprocessor directives, declarations, compound scopes, statements and
//! expressions. The tree is deliberately permissive. Constructs the model
//! does not cover structurally survive as opaque [`Blob`] or [`MacroCall`]
//! nodes, so a parser building this tree can always produce *something*
//! for real-world input.
//!
//! Ownership is strictly top-down: a node owns its children by value (or
//! through a `Box`), optional children are `Option`, and there are no
//! parent back-pointers.

use std::fmt;

use bitflags::bitflags;

/// Discriminant for every node kind the tree can contain.
///
/// The set is closed; consumers dispatch with an exhaustive match on
/// [`Obj::kind`] or directly on [`ObjData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjKind {
    HashDefine,
    HashUndef,
    HashInclude,
    HashIf,
    HashPragma,
    VarType,
    Var,
    VarList,
    Enum,
    DocComment,
    UsingDecl,
    TypedefName,
    TypedefNameList,
    Compound,
    FwdClsDecl,
    Function,
    Constructor,
    Destructor,
    TypeConverter,
    FunctionPtr,
    IfBlock,
    WhileBlock,
    DoWhileBlock,
    ForBlock,
    Expression,
    SwitchBlock,
    MacroCall,
    Blob,
}

/// Member access control, meaningful only when the owning node sits inside
/// a class-like compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    Unknown,
    Public,
    Protected,
    Private,
}

impl Default for AccessType {
    fn default() -> AccessType {
        AccessType::Unknown
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Public => f.write_str("public"),
            AccessType::Protected => f.write_str("protected"),
            AccessType::Private => f.write_str("private"),
            AccessType::Unknown => Ok(()),
        }
    }
}

bitflags! {
    /// Attribute vector shared by declaration-like nodes.
    ///
    /// All flags are independent bits; well-formed trees set at most one of
    /// the storage-class bits (`STATIC`, `EXTERN`, `EXTERN_C`).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Attr: u32 {
        const STATIC       = 1 << 0;
        const EXTERN       = 1 << 1;
        const EXTERN_C     = 1 << 2;
        const CONST        = 1 << 3;
        const VOLATILE     = 1 << 4;
        const VIRTUAL      = 1 << 5;
        const PURE_VIRTUAL = 1 << 6;
        const INLINE       = 1 << 7;
        const EXPLICIT     = 1 << 8;
        const FRIEND       = 1 << 9;
        const OVERRIDE     = 1 << 10;
        const FINAL        = 1 << 11;
        const TYPEDEF      = 1 << 12;
        const FUNC_PARAM   = 1 << 13;
        const DELETED      = 1 << 14;
    }
}

/// Reference qualifier on a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefType {
    None,
    /// `&`
    ByRef,
    /// `&&`
    RValRef,
}

impl Default for RefType {
    fn default() -> RefType {
        RefType::None
    }
}

/// Pointer, reference and const decoration of a type reference.
///
/// `const_bits` is indexed by star position: bit `i` for `i < ptr_level`
/// sits before star `i`, bit `ptr_level` is the trailing const on the
/// outermost pointer (or on the base type itself when `ptr_level == 0`).
/// Bits beyond `ptr_level` are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TypeModifier {
    pub ref_type: RefType,
    pub ptr_level: u8,
    pub const_bits: u32,
}

/// Base of a type reference: a literal type name or an inline compound
/// definition (anonymous struct/union members, for example).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBase {
    Name(String),
    Compound(Box<Obj>),
}

/// A type reference with its attributes and modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarType {
    pub attr: Attr,
    pub base: TypeBase,
    pub modifier: TypeModifier,
}

impl VarType {
    pub fn named(name: impl Into<String>) -> VarType {
        VarType {
            attr: Attr::empty(),
            base: TypeBase::Name(name.into()),
            modifier: TypeModifier::default(),
        }
    }

    /// True when the base type itself is const, either through the
    /// attribute bit or through bit 0 of the const-bit vector.
    pub fn is_const(&self) -> bool {
        self.attr.contains(Attr::CONST) || (self.modifier.const_bits & 1) != 0
    }
}

/// How an initializer was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignType {
    None,
    /// `= expr`
    UsingEqual,
    /// `(expr)`
    UsingBracket,
    /// `{expr}`
    UsingBraces,
}

impl Default for AssignType {
    fn default() -> AssignType {
        AssignType::None
    }
}

/// Declarator: name, array extents and optional initializer.
///
/// An empty entry in `array_sizes` stands for `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VarDecl {
    pub name: String,
    pub array_sizes: Vec<Option<Expr>>,
    pub assign_type: AssignType,
    pub assign_value: Option<Box<Obj>>,
}

impl VarDecl {
    pub fn named(name: impl Into<String>) -> VarDecl {
        VarDecl {
            name: name.into(),
            ..VarDecl::default()
        }
    }
}

/// A single variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub apidecor: Option<String>,
    pub var_type: VarType,
    pub decl: VarDecl,
}

/// One declarator of a [`VarList`], carrying its own modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDeclInList {
    pub modifier: TypeModifier,
    pub decl: VarDecl,
}

/// Comma-separated declarator list sharing one base type,
/// e.g. `bool a, *b, c = false;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarList {
    pub attr: Attr,
    pub base_type: String,
    pub decls: Vec<VarDeclInList>,
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumItem {
    Named { name: String, val: Option<Expr> },
    /// Anything that is not a plain enumerator: a preprocessor directive,
    /// a comment, or an opaque blob of body text.
    Embedded(Box<Obj>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub is_class: bool,
    pub underlying: Option<String>,
    /// `None` for an opaque declaration (`enum E;`).
    pub items: Option<Vec<EnumItem>>,
}

/// A comment block preserved verbatim, leading whitespace included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    pub doc: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDecl {
    pub name: String,
    pub template_params: Option<Vec<TemplateParam>>,
    pub target: Option<Box<Obj>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefName {
    pub var: Box<Var>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefList {
    pub var_list: VarList,
}

/// Kind of brace-enclosed scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundType {
    /// The translation-unit root.
    File,
    Namespace,
    Class,
    Struct,
    Union,
    /// An anonymous statement block (function body, case body).
    Block,
    /// `extern "C" { ... }`
    ExternC,
}

impl CompoundType {
    pub fn keyword(self) -> &'static str {
        match self {
            CompoundType::Namespace => "namespace",
            CompoundType::Class => "class",
            CompoundType::Struct => "struct",
            CompoundType::Union => "union",
            CompoundType::File | CompoundType::Block | CompoundType::ExternC => "",
        }
    }
}

impl fmt::Display for CompoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One base class of an inheritance list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceItem {
    pub access: AccessType,
    pub base: String,
}

/// One parameter of a template header. `param_type` is `None` for
/// `typename`/`class` parameters and carries the parameter type for
/// non-type parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    pub param_type: Option<VarType>,
    pub name: String,
    pub default_arg: Option<Box<Obj>>,
}

/// A named or anonymous scope and its members, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub compound_type: CompoundType,
    pub template_params: Option<Vec<TemplateParam>>,
    pub apidecor: Option<String>,
    pub name: Option<String>,
    pub inheritance: Option<Vec<InheritanceItem>>,
    pub members: Vec<Obj>,
}

impl Compound {
    pub fn new(compound_type: CompoundType) -> Compound {
        Compound {
            compound_type,
            template_params: None,
            apidecor: None,
            name: None,
            inheritance: None,
            members: Vec::new(),
        }
    }

    /// class / struct / union
    pub fn is_class_like(&self) -> bool {
        matches!(
            self.compound_type,
            CompoundType::Class | CompoundType::Struct | CompoundType::Union
        )
    }

    /// namespace / class / struct / union — scopes introduced by a keyword
    /// and a name, as opposed to the file root and anonymous blocks.
    pub fn is_namespace_like(&self) -> bool {
        matches!(
            self.compound_type,
            CompoundType::Namespace
                | CompoundType::Class
                | CompoundType::Struct
                | CompoundType::Union
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FwdClsDecl {
    pub attr: Attr,
    pub template_params: Option<Vec<TemplateParam>>,
    pub cmp_type: CompoundType,
    pub apidecor: Option<String>,
    pub name: String,
}

/// A free or member function. The same payload backs plain functions and
/// function pointers; the owning [`ObjData`] variant tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub attr: Attr,
    pub template_params: Option<Vec<TemplateParam>>,
    /// Decoration emitted before everything else (API export macro).
    pub decor1: Option<String>,
    /// Decoration emitted between return type and name (calling
    /// convention style annotations).
    pub decor2: Option<String>,
    pub ret_type: Option<Box<VarType>>,
    pub name: String,
    /// Parameter nodes; each must be a `Var` or a `FunctionPtr`.
    pub params: Option<Vec<Obj>>,
    pub defn: Option<Box<Compound>>,
}

/// `member(expr)` entry of a constructor initializer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemInit {
    pub member: String,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub attr: Attr,
    pub template_params: Option<Vec<TemplateParam>>,
    pub decor1: Option<String>,
    pub name: String,
    pub params: Option<Vec<Obj>>,
    pub mem_inits: Option<Vec<MemInit>>,
    pub defn: Option<Box<Compound>>,
}

/// Destructor; `name` is stored with its leading `~`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destructor {
    pub attr: Attr,
    pub template_params: Option<Vec<TemplateParam>>,
    pub decor1: Option<String>,
    pub name: String,
    pub defn: Option<Box<Compound>>,
}

/// Conversion operator, `operator T() const`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeConverter {
    pub attr: Attr,
    pub template_params: Option<Vec<TemplateParam>>,
    pub to: Box<VarType>,
    pub defn: Option<Box<Compound>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBlock {
    pub cond: Box<Obj>,
    pub body: Option<Box<Obj>>,
    pub else_part: Option<Box<Obj>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileBlock {
    pub cond: Box<Obj>,
    pub body: Option<Box<Obj>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoWhileBlock {
    pub cond: Box<Obj>,
    pub body: Option<Box<Obj>>,
}

/// `for (start; stop; step) body` — any slot may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForBlock {
    pub start: Option<Box<Obj>>,
    pub stop: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Option<Box<Obj>>,
}

/// One `case`/`default` arm; `label` is `None` for `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCase {
    pub label: Option<Expr>,
    pub body: Option<Box<Compound>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBlock {
    pub cond: Expr,
    pub cases: Vec<SwitchCase>,
}

bitflags! {
    /// Context flags wrapping an expression's rendering.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ExprFlags: u32 {
        const RETURN       = 1 << 0;
        const THROW        = 1 << 1;
        const INITIALIZER  = 1 << 2;
        const BRACKETED    = 1 << 3;
        const NEW          = 1 << 4;
        const DELETE       = 1 << 5;
        const DELETE_ARRAY = 1 << 6;
        const SIZEOF       = 1 << 7;
    }
}

/// Positional class of an operator; drives expression layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    None,
    UnaryPrefix,
    UnarySuffix,
    Binary,
    /// `.`, `->`, `->*` — emitted without surrounding spaces.
    Deref,
    /// Calls, subscripts, casts and the ternary operator; each has its own
    /// layout rule.
    Special,
}

/// Operator tag of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    None,
    // unary prefix
    UnaryMinus,
    BitToggle,
    LogNot,
    Derefer,
    Refer,
    PreIncrement,
    PreDecrement,
    // unary suffix
    PostIncrement,
    PostDecrement,
    // binary
    Plus,
    Minus,
    Mul,
    Div,
    Percent,
    And,
    Or,
    BitAnd,
    BitOr,
    Xor,
    Assign,
    Less,
    Greater,
    PlusEqual,
    MinusEqual,
    MulEqual,
    DivEqual,
    PerEqual,
    XorEqual,
    AndEqual,
    OrEqual,
    LeftShift,
    RightShift,
    LShiftEqual,
    RShiftEqual,
    CmpEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,
    ThreeWayCmp,
    Comma,
    // dereference family
    Dot,
    Arrow,
    ArrowStar,
    // special
    FunctionCall,
    ArrayElem,
    CStyleCast,
    ConstCast,
    StaticCast,
    DynamicCast,
    ReinterpretCast,
    Ternary,
}

impl Operator {
    /// Positional class of the operator. This is an explicit mapping; it
    /// must not be derived from discriminant ordering.
    pub fn class(self) -> OperatorClass {
        use Operator::*;
        match self {
            None => OperatorClass::None,
            UnaryMinus | BitToggle | LogNot | Derefer | Refer | PreIncrement | PreDecrement => {
                OperatorClass::UnaryPrefix
            }
            PostIncrement | PostDecrement => OperatorClass::UnarySuffix,
            Plus | Minus | Mul | Div | Percent | And | Or | BitAnd | BitOr | Xor | Assign
            | Less | Greater | PlusEqual | MinusEqual | MulEqual | DivEqual | PerEqual
            | XorEqual | AndEqual | OrEqual | LeftShift | RightShift | LShiftEqual
            | RShiftEqual | CmpEqual | NotEqual | LessEqual | GreaterEqual | ThreeWayCmp
            | Comma => OperatorClass::Binary,
            Dot | Arrow | ArrowStar => OperatorClass::Deref,
            FunctionCall | ArrayElem | CStyleCast | ConstCast | StaticCast | DynamicCast
            | ReinterpretCast | Ternary => OperatorClass::Special,
        }
    }

    /// Token text for operators that render as a fixed symbol. Special
    /// operators and `None` have no single symbol and return `""`.
    pub fn symbol(self) -> &'static str {
        use Operator::*;
        match self {
            UnaryMinus | Minus => "-",
            BitToggle => "~",
            LogNot => "!",
            Derefer | Mul => "*",
            Refer | BitAnd => "&",
            PreIncrement | PostIncrement => "++",
            PreDecrement | PostDecrement => "--",
            Plus => "+",
            Div => "/",
            Percent => "%",
            And => "&&",
            Or => "||",
            BitOr => "|",
            Xor => "^",
            Assign => "=",
            Less => "<",
            Greater => ">",
            PlusEqual => "+=",
            MinusEqual => "-=",
            MulEqual => "*=",
            DivEqual => "/=",
            PerEqual => "%=",
            XorEqual => "^=",
            AndEqual => "&=",
            OrEqual => "|=",
            LeftShift => "<<",
            RightShift => ">>",
            LShiftEqual => "<<=",
            RShiftEqual => ">>=",
            CmpEqual => "==",
            NotEqual => "!=",
            LessEqual => "<=",
            GreaterEqual => ">=",
            ThreeWayCmp => "<=>",
            Comma => ",",
            Dot => ".",
            Arrow => "->",
            ArrowStar => "->*",
            None | FunctionCall | ArrayElem | CStyleCast | ConstCast | StaticCast
            | DynamicCast | ReinterpretCast | Ternary => "",
        }
    }
}

/// A leaf within an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprAtom {
    /// Raw token text, kept verbatim.
    Text(String),
    Expr(Box<Expr>),
    VarType(Box<VarType>),
}

impl ExprAtom {
    pub fn text(s: impl Into<String>) -> ExprAtom {
        ExprAtom::Text(s.into())
    }
}

/// An expression: an operator tag, up to three operand atoms, and the
/// context flags wrapping its rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expr {
    pub oper: Operator,
    pub expr1: Option<ExprAtom>,
    pub expr2: Option<ExprAtom>,
    pub expr3: Option<ExprAtom>,
    pub flags: ExprFlags,
}

impl Default for Operator {
    fn default() -> Operator {
        Operator::None
    }
}

impl Expr {
    /// A single-atom expression with no operator.
    pub fn atom(text: impl Into<String>) -> Expr {
        Expr {
            expr1: Some(ExprAtom::text(text)),
            ..Expr::default()
        }
    }

    pub fn binary(oper: Operator, lhs: Expr, rhs: Expr) -> Expr {
        Expr {
            oper,
            expr1: Some(ExprAtom::Expr(Box::new(lhs))),
            expr2: Some(ExprAtom::Expr(Box::new(rhs))),
            ..Expr::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    /// The literal invocation text, trailing semicolon included when the
    /// source had one.
    pub call: String,
}

/// Opaque source text, emitted verbatim with no indent and no terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub blob: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub defn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// Payload as written: `<path>` or `"path"`.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    pub defn: String,
}

/// Conditional-directive flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CondType {
    If,
    IfDef,
    IfNDef,
    ElIf,
    Else,
    EndIf,
}

/// One `#if`-family directive. `cond` holds whatever trailing text the
/// directive carried, even for `#else`, which grammatically has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashIf {
    pub cond_type: CondType,
    pub cond: String,
}

/// Payload of a node, one variant per [`ObjKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjData {
    HashDefine(Define),
    HashUndef(Undef),
    HashInclude(Include),
    HashIf(HashIf),
    HashPragma(Pragma),
    VarType(Box<VarType>),
    Var(Box<Var>),
    VarList(VarList),
    Enum(Box<EnumDecl>),
    DocComment(DocComment),
    UsingDecl(Box<UsingDecl>),
    TypedefName(Box<TypedefName>),
    TypedefNameList(Box<TypedefList>),
    Compound(Box<Compound>),
    FwdClsDecl(FwdClsDecl),
    Function(Box<Function>),
    Constructor(Box<Constructor>),
    Destructor(Box<Destructor>),
    TypeConverter(Box<TypeConverter>),
    FunctionPtr(Box<Function>),
    IfBlock(Box<IfBlock>),
    WhileBlock(Box<WhileBlock>),
    DoWhileBlock(Box<DoWhileBlock>),
    ForBlock(Box<ForBlock>),
    Expression(Box<Expr>),
    SwitchBlock(Box<SwitchBlock>),
    MacroCall(MacroCall),
    Blob(Blob),
}

/// A tree node: the payload plus the access control it was declared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obj {
    pub access_type: AccessType,
    pub data: ObjData,
}

impl Obj {
    pub fn new(data: ObjData) -> Obj {
        Obj {
            access_type: AccessType::Unknown,
            data,
        }
    }

    pub fn with_access(data: ObjData, access_type: AccessType) -> Obj {
        Obj { access_type, data }
    }

    pub fn kind(&self) -> ObjKind {
        match &self.data {
            ObjData::HashDefine(_) => ObjKind::HashDefine,
            ObjData::HashUndef(_) => ObjKind::HashUndef,
            ObjData::HashInclude(_) => ObjKind::HashInclude,
            ObjData::HashIf(_) => ObjKind::HashIf,
            ObjData::HashPragma(_) => ObjKind::HashPragma,
            ObjData::VarType(_) => ObjKind::VarType,
            ObjData::Var(_) => ObjKind::Var,
            ObjData::VarList(_) => ObjKind::VarList,
            ObjData::Enum(_) => ObjKind::Enum,
            ObjData::DocComment(_) => ObjKind::DocComment,
            ObjData::UsingDecl(_) => ObjKind::UsingDecl,
            ObjData::TypedefName(_) => ObjKind::TypedefName,
            ObjData::TypedefNameList(_) => ObjKind::TypedefNameList,
            ObjData::Compound(_) => ObjKind::Compound,
            ObjData::FwdClsDecl(_) => ObjKind::FwdClsDecl,
            ObjData::Function(_) => ObjKind::Function,
            ObjData::Constructor(_) => ObjKind::Constructor,
            ObjData::Destructor(_) => ObjKind::Destructor,
            ObjData::TypeConverter(_) => ObjKind::TypeConverter,
            ObjData::FunctionPtr(_) => ObjKind::FunctionPtr,
            ObjData::IfBlock(_) => ObjKind::IfBlock,
            ObjData::WhileBlock(_) => ObjKind::WhileBlock,
            ObjData::DoWhileBlock(_) => ObjKind::DoWhileBlock,
            ObjData::ForBlock(_) => ObjKind::ForBlock,
            ObjData::Expression(_) => ObjKind::Expression,
            ObjData::SwitchBlock(_) => ObjKind::SwitchBlock,
            ObjData::MacroCall(_) => ObjKind::MacroCall,
            ObjData::Blob(_) => ObjKind::Blob,
        }
    }

    pub fn is_expr(&self) -> bool {
        matches!(self.data, ObjData::Expression(_))
    }

    /// Attribute vector of declaration-like nodes, `None` otherwise.
    pub fn attr(&self) -> Option<Attr> {
        match &self.data {
            ObjData::VarType(v) => Some(v.attr),
            ObjData::Var(v) => Some(v.var_type.attr),
            ObjData::VarList(v) => Some(v.attr),
            ObjData::FwdClsDecl(f) => Some(f.attr),
            ObjData::Function(f) | ObjData::FunctionPtr(f) => Some(f.attr),
            ObjData::Constructor(c) => Some(c.attr),
            ObjData::Destructor(d) => Some(d.attr),
            ObjData::TypeConverter(t) => Some(t.attr),
            _ => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.attr().map_or(false, |a| a.contains(Attr::DELETED))
    }

    pub fn is_const(&self) -> bool {
        match &self.data {
            ObjData::VarType(v) => v.is_const(),
            ObjData::Var(v) => v.var_type.is_const(),
            _ => self.attr().map_or(false, |a| a.contains(Attr::CONST)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn operator_classes_are_total() {
        use Operator::*;
        let all = [
            None,
            UnaryMinus,
            BitToggle,
            LogNot,
            Derefer,
            Refer,
            PreIncrement,
            PreDecrement,
            PostIncrement,
            PostDecrement,
            Plus,
            Minus,
            Mul,
            Div,
            Percent,
            And,
            Or,
            BitAnd,
            BitOr,
            Xor,
            Assign,
            Less,
            Greater,
            PlusEqual,
            MinusEqual,
            MulEqual,
            DivEqual,
            PerEqual,
            XorEqual,
            AndEqual,
            OrEqual,
            LeftShift,
            RightShift,
            LShiftEqual,
            RShiftEqual,
            CmpEqual,
            NotEqual,
            LessEqual,
            GreaterEqual,
            ThreeWayCmp,
            Comma,
            Dot,
            Arrow,
            ArrowStar,
            FunctionCall,
            ArrayElem,
            CStyleCast,
            ConstCast,
            StaticCast,
            DynamicCast,
            ReinterpretCast,
            Ternary,
        ];
        for op in all {
            match op.class() {
                OperatorClass::Binary | OperatorClass::Deref => {
                    assert!(!op.symbol().is_empty(), "{:?} has no symbol", op)
                }
                _ => {}
            }
        }
    }

    #[test]
    fn storage_flags_are_distinct_bits() {
        let storage = Attr::STATIC | Attr::EXTERN | Attr::EXTERN_C;
        assert_eq!(storage.bits().count_ones(), 3);
        assert!(!storage.intersects(Attr::CONST | Attr::VIRTUAL));
    }

    #[test]
    fn base_const_is_visible_through_either_path() {
        let mut vt = VarType::named("int");
        assert!(!vt.is_const());
        vt.modifier.const_bits = 1;
        assert!(vt.is_const());
        let mut vt = VarType::named("int");
        vt.attr |= Attr::CONST;
        assert!(vt.is_const());
    }

    #[test]
    fn compound_predicates() {
        assert!(Compound::new(CompoundType::Class).is_class_like());
        assert!(Compound::new(CompoundType::Union).is_class_like());
        assert!(!Compound::new(CompoundType::Namespace).is_class_like());
        assert!(Compound::new(CompoundType::Namespace).is_namespace_like());
        assert!(!Compound::new(CompoundType::File).is_namespace_like());
        assert!(!Compound::new(CompoundType::Block).is_namespace_like());
        assert!(!Compound::new(CompoundType::ExternC).is_namespace_like());
    }
}
