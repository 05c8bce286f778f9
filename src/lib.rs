#![doc = include_str!("../README.md")]

mod config;
mod corpus;
mod error;
mod functions;
mod generator;
mod random;
mod state;
mod visitor;
mod weight;

pub use config::{Config, Declarations, Preset, Weights};
pub use corpus::Corpus;
pub use error::Error;
pub use generator::{Context, Factor, Generator};
pub use random::Entropy;
pub use state::{Arity, Function, State};
pub use visitor::{Nesting, Visitor};
pub use weight::WeightTable;
