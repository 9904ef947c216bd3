use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Variable,
    Function,
    Method,
    NamedType,
    Interface,
    Package,
    Label,
}

/// One semantic object (§3 Semantic object): name, declaring package, exported flag,
/// enclosing scope, and — for methods — the receiver type name. Two occurrences that
/// resolve to the same `ObjectId` are, by construction, the same object.
#[derive(Debug, Clone)]
pub struct Object {
    pub kind: ObjectKind,
    pub name: String,
    pub package: String,
    pub scope: ScopeId,
    pub receiver_type: Option<String>,
    /// True for a function/method's receiver, parameter, or named result: these are
    /// bound in the signature text, not a statement inside the body, and renaming one
    /// would need to rewrite the signature too (currently not implemented — see
    /// `rename`'s rejection of these targets).
    pub is_param: bool,
}

impl Object {
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
    }
}

/// Arena of semantic objects for one loaded program, grounded on the teacher's
/// `SymbolTable` (`raya-checker/src/symbols.rs`) generalized from "one table per file"
/// to "one arena shared by the whole loaded program", since occurrence search must range
/// over every loaded package (spec.md §4.4).
#[derive(Debug, Default)]
pub struct Objects {
    objects: Vec<Object>,
}

impl Objects {
    pub fn new() -> Self {
        Objects::default()
    }

    pub fn define(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> &Object {
        &self.objects[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i as u32), o))
    }
}

/// Names reserved by the language grammar itself — never valid rename targets
/// (spec.md §4.4 conflict detection, §7 `NameReserved`).
pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
    "package", "range", "return", "select", "struct", "switch", "type", "var",
];

/// Predeclared identifiers — built-in types and functions that may not be renamed
/// (spec.md §7 `NamePredeclared`).
pub const PREDECLARED_IDENTIFIERS: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int",
    "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "any", "true", "false", "iota", "nil", "append",
    "cap", "close", "complex", "copy", "delete", "imag", "len", "make", "new", "panic",
    "print", "println", "real", "recover",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

pub fn is_predeclared(name: &str) -> bool {
    PREDECLARED_IDENTIFIERS.contains(&name)
}

pub type PackageObjects = FxHashMap<String, ObjectId>;
