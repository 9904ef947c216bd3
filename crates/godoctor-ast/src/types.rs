use crate::ids::TypeId;
use crate::token::Span;

/// A type-annotation node. Mirrors the teacher's `TypeAnnotation`/`Type` shape
/// (`raya-parser/src/ast/types.rs`), narrowed to this language's type grammar.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeNode {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Named { ref path, .. } if path.len() == 1 && is_builtin(&path[0]))
    }
}

fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "bool" | "string" | "int" | "int8" | "int16" | "int32" | "int64"
            | "uint" | "uint8" | "uint16" | "uint32" | "uint64" | "uintptr"
            | "float32" | "float64" | "byte" | "rune" | "error" | "any"
    )
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A possibly package-qualified name, e.g. `int` or `fmt.Stringer`.
    Named { path: Vec<String> },
    Pointer(TypeId),
    Slice(TypeId),
    Array { len: Option<String>, elem: TypeId },
    Map { key: TypeId, value: TypeId },
    Chan { elem: TypeId, dir: ChanDir },
    Interface { methods: Vec<MethodSig> },
    Struct { fields: Vec<StructField> },
    Function(FunctionSig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: String,
    pub sig: FunctionSig,
}

#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeId,
    pub variadic: bool,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: Option<String>,
    pub ty: TypeId,
    /// `true` when the field has no name: an embedded type, promoting its method set.
    pub embedded: bool,
    pub tag: Option<String>,
}

impl FunctionSig {
    pub fn len_params(&self) -> usize {
        self.params.len()
    }

    pub fn same_signature(&self, other: &FunctionSig) -> bool {
        self.params.len() == other.params.len()
            && self.results.len() == other.results.len()
    }
}
