/// The free variables a function accepts, in parameter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, enum_iterator::Sequence)]
pub enum Arity {
    X,
    Y,
    XY,
    YX,
}

impl Arity {
    pub fn all() -> impl Iterator<Item = Self> {
        enum_iterator::all::<Self>()
    }

    /// The parameter list as written in a declaration head.
    pub const fn params(&self) -> &'static str {
        match self {
            Self::X => "(x)",
            Self::Y => "(y)",
            Self::XY => "(x,y)",
            Self::YX => "(y,x)",
        }
    }

    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::XY | Self::YX)
    }
}

/// User-definable function names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, enum_iterator::Sequence)]
pub enum Function {
    /// Recursive, declared as `f{0}`, `f{1}` and `f{n}`.
    F,
    G,
    H,
}

impl Function {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::F => "f",
            Self::G => "g",
            Self::H => "h",
        }
    }

    const fn index(&self) -> usize {
        match self {
            Self::F => 0,
            Self::G => 1,
            Self::H => 2,
        }
    }
}

/// Per-case flags that decide which productions are legal.
///
/// A fresh `State` is built for every test case; nothing carries over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    /// Free variables of the function body being declared, if any.
    pub(crate) arity: Option<Arity>,
    /// Allows `y` in power terms. Only set inside declarations.
    pub(crate) multi_variable: bool,
    /// Allows derivative factors. Only set in the main expression.
    pub(crate) derivation: bool,
    declared: [Option<Arity>; 3],
}

impl State {
    /// State for the main expression: only `x`, derivatives allowed.
    pub fn main() -> Self {
        Self {
            derivation: true,
            ..Self::default()
        }
    }

    /// State for a declaration body with the given parameters.
    pub fn declaration(arity: Arity) -> Self {
        Self {
            arity: Some(arity),
            multi_variable: true,
            ..Self::default()
        }
    }

    /// Makes `function` callable with `arity` from now on.
    pub fn declare(&mut self, function: Function, arity: Arity) {
        self.declared[function.index()] = Some(arity);
    }

    pub fn declared(&self, function: Function) -> Option<Arity> {
        self.declared[function.index()]
    }

    pub fn any_declared(&self) -> bool {
        self.declared.iter().any(Option::is_some)
    }

    pub fn arity(&self) -> Option<Arity> {
        self.arity
    }

    pub fn derivation(&self) -> bool {
        self.derivation
    }

    /// Switches to the main-expression context, keeping declared functions.
    pub(crate) fn enter_main(&mut self) {
        self.arity = None;
        self.multi_variable = false;
        self.derivation = true;
    }

    /// Switches to a declaration body, keeping declared functions.
    pub(crate) fn enter_declaration(&mut self, arity: Arity) {
        self.arity = Some(arity);
        self.multi_variable = true;
        self.derivation = false;
    }
}
