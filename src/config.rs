//! Generation parameters.
//!
//! A [`Config`] is fixed for a whole run. It starts from one of the [`Preset`]s
//! (the default is [`Preset::Full`]) and can be overridden field by field from a
//! TOML file: every table is `#[serde(default)]`, so a file only names what it changes.

use crate::error::{Error, ErrorRepr};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

/// Parameters of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of test cases (files) to generate.
    pub testcases: u32,
    /// Expansive factors (derivatives, trig, calls, sub-expressions) are only
    /// produced while the depth is at most `max_depth`.
    pub max_depth: u32,
    /// Expected number of terms in a top-level expression.
    pub expr_length: u32,
    /// Expected number of factors in a top-level term.
    pub term_length: u32,
    /// Largest integer literal magnitude.
    pub max_integer: u32,
    /// Largest exponent on power terms and trig functions.
    pub max_exponent: u32,
    pub weights: Weights,
    pub declarations: Declarations,
}

/// Percentages steering branch selection.
///
/// The factor weights (`derivative`, `trig`, `function`, `expression`,
/// `signed_integer`) share one 1..=100 draw, in that order; whatever they leave
/// uncovered goes to power terms. `pow` only matters when a factor collapses
/// past `max_depth`, where it is weighed against `signed_integer`.
/// Signed integers also keep their own slice of the factor draw below
/// `max_depth`, not only when a factor collapses.
/// Nothing here is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub positive_sign: u32,
    pub pow: u32,
    pub signed_integer: u32,
    pub expression: u32,
    pub trig: u32,
    pub function: u32,
    pub derivative: u32,
    /// Chance that a sub-expression or trig function is raised to a power.
    pub expr_exponent: u32,
}

/// Which function declarations a test case may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Declarations {
    /// Up to two plain functions `g` and `h`.
    pub auxiliary: bool,
    /// The recursive function list `f{0}`, `f{1}`, `f{n}`.
    pub recursive: bool,
    /// Usually append `+call` for every declared function to the main expression.
    pub tail_calls: bool,
}

/// Built-in parameter sets, from plain polynomials to the full grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, enum_iterator::Sequence)]
pub enum Preset {
    /// Polynomials in `x` with parenthesized sub-expressions.
    Poly,
    /// Adds `y`, trig functions and the recursive function list.
    Recursive,
    /// Adds derivatives and the auxiliary functions `g` and `h`.
    Full,
}

impl Preset {
    pub fn all() -> impl Iterator<Item = Self> {
        enum_iterator::all::<Self>()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Poly => "poly",
            Self::Recursive => "recursive",
            Self::Full => "full",
        }
    }

    pub fn config(&self) -> Config {
        match self {
            Self::Full => Config::default(),
            Self::Recursive => Config {
                weights: Weights {
                    pow: 30,
                    signed_integer: 30,
                    derivative: 0,
                    ..Weights::default()
                },
                declarations: Declarations {
                    auxiliary: false,
                    recursive: true,
                    tail_calls: false,
                },
                ..Config::default()
            },
            Self::Poly => Config {
                max_depth: 2,
                expr_length: 5,
                term_length: 3,
                max_exponent: 8,
                weights: Weights {
                    pow: 35,
                    signed_integer: 35,
                    expression: 30,
                    trig: 0,
                    function: 0,
                    derivative: 0,
                    expr_exponent: 100,
                    ..Weights::default()
                },
                declarations: Declarations {
                    auxiliary: false,
                    recursive: false,
                    tail_calls: false,
                },
                ..Config::default()
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error(ErrorRepr::UnknownPreset(String::from(s))))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            testcases: 2,
            max_depth: 3,
            expr_length: 2,
            term_length: 1,
            max_integer: 10,
            max_exponent: 3,
            weights: Weights::default(),
            declarations: Declarations::default(),
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            positive_sign: 50,
            pow: 25,
            signed_integer: 20,
            expression: 15,
            trig: 15,
            function: 10,
            derivative: 15,
            expr_exponent: 50,
        }
    }
}

impl Default for Declarations {
    fn default() -> Self {
        Self {
            auxiliary: true,
            recursive: true,
            tail_calls: true,
        }
    }
}

impl Config {
    pub fn preset(preset: Preset) -> Self {
        preset.config()
    }

    /// Parses a TOML document; omitted fields keep the [`Preset::Full`] defaults.
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        toml::from_str(s).map_err(|e| Error(ErrorRepr::Profile(e)))
    }

    /// Loads a preset by name, or a TOML file when `name_or_path` looks like a path.
    pub fn load(name_or_path: &str) -> Result<Self, Error> {
        if name_or_path.contains(std::path::MAIN_SEPARATOR)
            || name_or_path.contains('/')
            || name_or_path.ends_with(".toml")
        {
            let path = Path::new(name_or_path);
            let content = std::fs::read_to_string(path).map_err(|source| {
                Error(ErrorRepr::Io {
                    path: path.to_path_buf(),
                    source,
                })
            })?;
            Self::from_toml(&content)
        } else {
            name_or_path.parse::<Preset>().map(|p| p.config())
        }
    }

    /// Effective number of expected terms for an expression at `depth`.
    ///
    /// The target shrinks as nesting deepens. Depth 0 is treated as 1.
    pub fn expr_target(&self, depth: u32) -> u32 {
        self.expr_length / depth.max(1)
    }

    /// Effective number of expected factors for a term at `depth`.
    pub fn term_target(&self, depth: u32) -> u32 {
        self.term_length / depth.max(1)
    }

    /// Whether any test case can carry function declarations.
    ///
    /// A depth limit of 0 leaves no room for calls, so nothing is declared.
    pub fn declares(&self) -> bool {
        self.max_depth > 0 && (self.declarations.auxiliary || self.declarations.recursive)
    }
}
