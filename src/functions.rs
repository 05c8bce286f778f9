//! Function declarations preceding the main expression.
//!
//! A test case may declare up to two plain functions `g` and `h` and, independently,
//! a recursive function `f` given by two base cases and a linear recurrence:
//!
//! ```text
//! 2
//! g(y)=-y^2+cos(y)
//! h(x,y)=x*g(y)
//! 1
//! f{0}(x)=x
//! f{1}(x)=-3
//! f{n}(x)=+2*f{n-1}(x^2)+-1*f{n-2}(sin(x))+x
//! ```
//!
//! Each declaration becomes callable once it is complete, so the second of `g`/`h`
//! may call the first and the `f` list may call both.

use crate::{Arity, Context, Entropy, Factor, Function, Visitor};

const RECURSIVE_CHANCE: u32 = 50;
const RECURRENCE_TAIL: u32 = 80;

/// Depth at which recurrence arguments and trailing calls are generated.
const CALL_DEPTH: u32 = 2;

impl<E: Entropy, V: Visitor> Context<'_, E, V> {
    /// Writes the declaration header lines and the declarations themselves.
    ///
    /// When the configuration rules out declarations the header is a lone `0`.
    pub fn declarations(&mut self) {
        if !self.config.declares() {
            self.visitor.visit_char('0');
            self.visitor.visit_char('\n');
            return;
        }
        if self.config.declarations.auxiliary {
            self.auxiliary();
        }
        if self.config.declarations.recursive {
            self.recursive();
        }
    }

    /// Appends `+call` for every declared function, in `f`, `g`, `h` order.
    pub fn tail(&mut self) {
        for function in enum_iterator::all::<Function>() {
            if let Some(arity) = self.state.declared(function) {
                self.visitor.visit_char('+');
                self.visitor.visit_factor(Factor::UserFunction);
                self.call_function(function, arity, CALL_DEPTH);
            }
        }
    }

    /// Neither, `g`, `h`, `g` then `h`, or `h` then `g`, with equal chance.
    fn auxiliary(&mut self) {
        let order: &[Function] = match self.entropy.random_int(1, 5) {
            1 => &[],
            2 => &[Function::G],
            3 => &[Function::H],
            4 => &[Function::G, Function::H],
            _ => &[Function::H, Function::G],
        };
        self.visitor.visit_u32(order.len() as u32);
        self.visitor.visit_char('\n');

        // both arities are drawn before either body
        let arities: Vec<Arity> = order.iter().map(|_| self.arity()).collect();
        for (function, arity) in order.iter().zip(arities) {
            self.visitor.visit_literal(function.as_str());
            self.visitor.visit_literal(arity.params());
            self.visitor.visit_char('=');
            self.state.enter_declaration(arity);
            self.expression(1);
            self.visitor.visit_char('\n');
            self.state.declare(*function, arity);
        }
    }

    fn recursive(&mut self) {
        if !self.entropy.random_chance(RECURSIVE_CHANCE) {
            self.visitor.visit_char('0');
            self.visitor.visit_char('\n');
            return;
        }
        self.visitor.visit_char('1');
        self.visitor.visit_char('\n');

        let arity = self.arity();
        self.state.enter_declaration(arity);
        for n in 0..=1 {
            self.visitor.visit_literal("f{");
            self.visitor.visit_u32(n);
            self.visitor.visit_char('}');
            self.visitor.visit_literal(arity.params());
            self.visitor.visit_char('=');
            self.expression(1);
            self.visitor.visit_char('\n');
        }

        self.visitor.visit_literal("f{n}");
        self.visitor.visit_literal(arity.params());
        self.visitor.visit_char('=');
        self.recurrence("n-1", arity);
        self.visitor.visit_char('+');
        self.recurrence("n-2", arity);
        if self.entropy.random_chance(RECURRENCE_TAIL) {
            self.visitor.visit_char('+');
            self.expression(1);
        }
        self.visitor.visit_char('\n');
        self.state.declare(Function::F, arity);
    }

    /// `coefficient*f{step}(args)`
    fn recurrence(&mut self, step: &str, arity: Arity) {
        self.signed_integer();
        self.visitor.visit_literal("*f{");
        self.visitor.visit_literal(step);
        self.visitor.visit_char('}');
        self.visitor.visit_open();
        self.factor(CALL_DEPTH);
        if arity.is_binary() {
            self.visitor.visit_char(',');
            self.factor(CALL_DEPTH);
        }
        self.visitor.visit_close();
    }

    fn arity(&mut self) -> Arity {
        let index = self.entropy.random_int(0, 3) as usize;
        Arity::all().nth(index).unwrap_or(Arity::X)
    }
}
