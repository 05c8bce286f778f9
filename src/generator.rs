use crate::{Arity, Config, Entropy, Function, State, Visitor, WeightTable};
use log::trace;

/// How many times a factor may redraw after landing on a disabled branch
/// before it collapses to a power term or integer.
const MAX_FACTOR_ATTEMPTS: u32 = 64;

/// Largest exponent on a parenthesized sub-expression.
const EXPR_EXPONENT_MAX: u32 = 3;

// Fixed percentages of the grammar.
const EXPR_LEADING_SIGN: u32 = 30;
const TERM_LEADING_SIGN: u32 = 10;
const INTEGER_PLUS: u32 = 10;
const INTEGER_MINUS: u32 = 50;
const LEADING_ZERO: u32 = 5;
const POW_EXPONENT: u32 = 80;
const SECOND_VARIABLE: u32 = 50;
const SIN: u32 = 50;
const TAIL_CALLS: u32 = 90;

/// The outcome of a single factor decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    /// `dx(expression)`
    Derivative,
    /// `sin(factor)` or `cos(factor)`, optionally raised to a power.
    Trig,
    /// A call to a declared `f`, `g` or `h`.
    UserFunction,
    /// `(expression)`, optionally raised to a power.
    SubExpr,
    /// A signed integer literal.
    Integer,
    /// A variable, optionally raised to a power.
    Power,
    /// The chosen branch is disabled in this context; draw again at the same depth.
    Retry,
}

impl Factor {
    /// `true` for the branches that recurse and are gated by `max_depth`.
    pub const fn is_expansive(&self) -> bool {
        matches!(
            self,
            Self::Derivative | Self::Trig | Self::UserFunction | Self::SubExpr
        )
    }
}

/// Generation context of a single test case.
///
/// Every production writes straight into the visitor; nothing generated is kept
/// or revisited. `depth` is threaded through the recursive productions: the
/// top-level expression is at depth 1 and every expansive factor recurses at
/// `depth + 1`. Once `depth > max_depth` factors only collapse to terminals, which
/// bounds the recursion.
///
/// `E` is usually `&mut R` for some [`Entropy`] `R`, so that several contexts can
/// share one random stream.
pub struct Context<'c, E, V> {
    pub(crate) config: &'c Config,
    pub(crate) entropy: E,
    pub(crate) state: State,
    pub(crate) visitor: V,
    factor_table: WeightTable<Factor>,
    collapse_table: WeightTable<Factor>,
}

impl<'c, E: Entropy, V: Visitor> Context<'c, E, V> {
    /// A context for a main expression.
    pub fn new(config: &'c Config, entropy: E) -> Self {
        Self::with_state(config, entropy, State::main())
    }

    pub fn with_state(config: &'c Config, entropy: E, state: State) -> Self {
        let w = &config.weights;
        let factor_table = WeightTable::new(Factor::Power)
            .with(w.derivative, Factor::Derivative)
            .with(w.trig, Factor::Trig)
            .with(w.function, Factor::UserFunction)
            .with(w.expression, Factor::SubExpr)
            .with(w.signed_integer, Factor::Integer);
        let collapse_table = WeightTable::new(Factor::Integer)
            .with(w.pow, Factor::Power)
            .with(w.signed_integer, Factor::Integer);
        Self {
            config,
            entropy,
            state,
            visitor: V::new(),
            factor_table,
            collapse_table,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }

    /// Writes a complete test case: the declaration header, the main expression,
    /// possibly followed by one call to each declared function (unless
    /// `tail_calls` is off), and a newline.
    pub fn case(&mut self) {
        self.declarations();
        self.state.enter_main();
        self.expression(1);
        if self.config.declarations.tail_calls && self.entropy.random_chance(TAIL_CALLS) {
            self.tail();
        }
        self.visitor.visit_char('\n');
    }

    /// One or more signed terms. Only the first term's sign is optional.
    pub fn expression(&mut self, depth: u32) {
        let target = self.config.expr_target(depth);
        let terms = self.entropy.random_int(1, target.saturating_mul(2)).max(1);
        for i in 0..terms {
            if i > 0 || self.entropy.random_chance(EXPR_LEADING_SIGN) {
                self.sign();
            }
            self.term(depth);
        }
    }

    /// One or more factors joined by `*`, with an occasional leading sign.
    pub fn term(&mut self, depth: u32) {
        let target = self.config.term_target(depth);
        let factors = self.entropy.random_int(1, target.saturating_mul(2)).max(1);
        if self.entropy.random_chance(TERM_LEADING_SIGN) {
            self.sign();
        }
        for i in 0..factors {
            if i > 0 {
                self.visitor.visit_char('*');
            }
            self.factor(depth);
        }
    }

    pub fn factor(&mut self, depth: u32) {
        let factor = self.resolve(depth);
        self.visitor.visit_factor(factor);
        match factor {
            Factor::Derivative => self.derivation(depth),
            Factor::Trig => self.trig(depth),
            Factor::UserFunction => self.call(depth),
            Factor::SubExpr => self.sub_expression(depth),
            Factor::Integer => self.signed_integer(),
            // `resolve` never returns `Retry`
            Factor::Power | Factor::Retry => self.pow(),
        }
    }

    /// Draws a factor decision at `depth`.
    ///
    /// Past `max_depth` every expansive branch collapses to a power term or a
    /// signed integer. A derivative outside the main expression is a `Retry`;
    /// a call with nothing declared becomes a trig function.
    pub fn decide(&mut self, depth: u32) -> Factor {
        let factor = self.factor_table.choose(&mut self.entropy, 100);
        if factor.is_expansive() && depth > self.config.max_depth {
            return self.collapse();
        }
        match factor {
            Factor::Derivative if !self.state.derivation => Factor::Retry,
            Factor::UserFunction if !self.state.any_declared() => Factor::Trig,
            other => other,
        }
    }

    /// Decides until something other than `Retry` comes up, or gives up and collapses.
    fn resolve(&mut self, depth: u32) -> Factor {
        for _ in 0..MAX_FACTOR_ATTEMPTS {
            match self.decide(depth) {
                Factor::Retry => continue,
                factor => return factor,
            }
        }
        trace!("factor retries exhausted at depth {}", depth);
        self.collapse()
    }

    fn collapse(&mut self) -> Factor {
        let span = self.collapse_table.total();
        self.collapse_table.choose(&mut self.entropy, span)
    }

    pub fn sign(&mut self) {
        if self.entropy.random_chance(self.config.weights.positive_sign) {
            self.visitor.visit_char('+');
        } else {
            self.visitor.visit_char('-');
        }
    }

    /// An integer literal with a `+`, a `-` or no sign.
    pub fn signed_integer(&mut self) {
        if self.entropy.random_chance(INTEGER_PLUS) {
            self.visitor.visit_char('+');
        } else if self.entropy.random_chance(INTEGER_MINUS) {
            self.visitor.visit_char('-');
        }
        self.normal_integer(self.config.max_integer);
    }

    /// An integer in `[0, max]`, sometimes with a redundant leading zero.
    pub fn normal_integer(&mut self, max: u32) {
        if self.entropy.random_chance(LEADING_ZERO) {
            self.visitor.visit_char('0');
        }
        let value = self.entropy.random_int(0, max);
        self.visitor.visit_u32(value);
    }

    /// A variable legal in the current context, usually with an exponent.
    pub fn pow(&mut self) {
        let variable = match (self.state.multi_variable, self.state.arity) {
            (true, Some(arity)) if arity.is_binary() => {
                if self.entropy.random_chance(SECOND_VARIABLE) {
                    'x'
                } else {
                    'y'
                }
            }
            (true, Some(Arity::Y)) => 'y',
            _ => 'x',
        };
        self.visitor.visit_char(variable);
        if self.entropy.random_chance(POW_EXPONENT) {
            self.visitor.visit_char('^');
            self.normal_integer(self.config.max_exponent);
        }
    }

    pub fn trig(&mut self, depth: u32) {
        if self.entropy.random_chance(SIN) {
            self.visitor.visit_literal("sin");
        } else {
            self.visitor.visit_literal("cos");
        }
        self.visitor.visit_open();
        self.factor(depth + 1);
        self.visitor.visit_close();
        if self.entropy.random_chance(self.config.weights.expr_exponent) {
            self.visitor.visit_char('^');
            self.normal_integer(self.config.max_exponent);
        }
    }

    pub fn derivation(&mut self, depth: u32) {
        self.visitor.visit_literal("dx");
        self.visitor.visit_open();
        self.expression(depth + 1);
        self.visitor.visit_close();
    }

    pub fn sub_expression(&mut self, depth: u32) {
        self.visitor.visit_open();
        self.expression(depth + 1);
        self.visitor.visit_close();
        if self.entropy.random_chance(self.config.weights.expr_exponent) {
            self.visitor.visit_char('^');
            self.normal_integer(EXPR_EXPONENT_MAX);
        }
    }

    /// A call to one of the declared functions, or a trig function if there are none.
    ///
    /// The choice is not uniform: with all three declared, `f` is picked two
    /// thirds of the time and `h` never.
    pub fn call(&mut self, depth: u32) {
        let f = self.state.declared(Function::F);
        let g = self.state.declared(Function::G);
        let h = self.state.declared(Function::H);
        let picked = match (f, g, h) {
            (Some(f), Some(g), Some(_)) => {
                if self.entropy.random_chance(66) && !self.entropy.random_chance(50) {
                    (Function::G, g)
                } else {
                    (Function::F, f)
                }
            }
            (Some(f), Some(g), None) => self.coin((Function::F, f), (Function::G, g)),
            (Some(f), None, Some(h)) => self.coin((Function::F, f), (Function::H, h)),
            (None, Some(g), Some(h)) => self.coin((Function::G, g), (Function::H, h)),
            (Some(f), None, None) => (Function::F, f),
            (None, Some(g), None) => (Function::G, g),
            (None, None, Some(h)) => (Function::H, h),
            (None, None, None) => return self.trig(depth),
        };
        self.call_function(picked.0, picked.1, depth);
    }

    fn coin<T>(&mut self, heads: T, tails: T) -> T {
        if self.entropy.random_chance(50) {
            heads
        } else {
            tails
        }
    }

    /// `name(factor)` or `name(factor,factor)` depending on `arity`, with
    /// arguments at `depth + 1`. Calls to `f` carry an index in `0..=2`.
    pub fn call_function(&mut self, function: Function, arity: Arity, depth: u32) {
        self.visitor.visit_literal(function.as_str());
        if function == Function::F {
            self.visitor.visit_char('{');
            let index = self.entropy.random_int(0, 2);
            self.visitor.visit_u32(index);
            self.visitor.visit_char('}');
        }
        self.visitor.visit_open();
        self.factor(depth + 1);
        if arity.is_binary() {
            self.visitor.visit_char(',');
            self.factor(depth + 1);
        }
        self.visitor.visit_close();
    }
}

/// Produces test cases from a configuration and a random stream.
///
/// ```
/// use polygen::{Config, Generator};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let config = Config::default();
/// let mut generator = Generator::new(&config, StdRng::seed_from_u64(42));
/// let case: String = generator.case();
/// assert!(case.ends_with('\n'));
/// ```
pub struct Generator<'c, E> {
    config: &'c Config,
    entropy: E,
}

impl<'c, E: Entropy> Generator<'c, E> {
    pub fn new(config: &'c Config, entropy: E) -> Self {
        Self { config, entropy }
    }

    /// Generates one complete test case with a fresh per-case state.
    pub fn case<V: Visitor>(&mut self) -> V {
        let mut ctx = Context::new(self.config, &mut self.entropy);
        ctx.case();
        ctx.into_visitor()
    }

    /// Generates a lone expression at `depth` in the main-expression context.
    pub fn expression<V: Visitor>(&mut self, depth: u32) -> V {
        let mut ctx = Context::new(self.config, &mut self.entropy);
        ctx.expression(depth);
        ctx.into_visitor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Nesting, Preset};
    use rand::{rngs::StdRng, SeedableRng};

    fn main_ctx(config: &Config, seed: u64) -> Context<'_, StdRng, String> {
        Context::new(config, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn zero_max_integer() {
        let config = Config::default();
        let mut ctx = main_ctx(&config, 42);
        for _ in 0..1000 {
            ctx.normal_integer(0);
            ctx.visitor.visit_char(' ');
        }
        let text = ctx.into_visitor();
        for token in text.split_whitespace() {
            assert!(token == "0" || token == "00", "{token}");
        }
    }

    #[test]
    fn collapses_past_max_depth() {
        let config = Config {
            max_depth: 2,
            ..Config::default()
        };
        let mut ctx = main_ctx(&config, 1);
        for _ in 0..10_000 {
            let f = ctx.decide(3);
            assert!(matches!(f, Factor::Power | Factor::Integer), "{f:?}");
        }
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            seen.insert(ctx.decide(2));
        }
        for f in [Factor::Derivative, Factor::Trig, Factor::SubExpr] {
            assert!(seen.contains(&f), "{f:?}");
        }
        // nothing declared, so calls turn into trig functions
        assert!(!seen.contains(&Factor::UserFunction));
        assert!(!seen.contains(&Factor::Retry));
    }

    #[test]
    fn derivative_retries_in_declarations() {
        let config = Config {
            weights: crate::Weights {
                derivative: 100,
                ..Default::default()
            },
            ..Config::default()
        };
        let mut ctx: Context<'_, _, String> = Context::with_state(
            &config,
            StdRng::seed_from_u64(3),
            State::declaration(Arity::X),
        );
        for _ in 0..100 {
            assert_eq!(ctx.decide(1), Factor::Retry);
        }
        // exhausted retries collapse instead of looping forever
        ctx.factor(1);
        let text = ctx.into_visitor();
        assert!(!text.contains("dx"), "{text}");
        assert!(!text.contains('('), "{text}");
    }

    #[test]
    fn pow_variables() {
        let config = Config::default();
        let cases = [
            (State::main(), "x"),
            (State::declaration(Arity::X), "x"),
            (State::declaration(Arity::Y), "y"),
            (State::declaration(Arity::XY), "xy"),
            (State::declaration(Arity::YX), "xy"),
        ];
        for (state, allowed) in cases {
            let mut ctx: Context<'_, _, String> =
                Context::with_state(&config, StdRng::seed_from_u64(9), state);
            for _ in 0..200 {
                ctx.pow();
            }
            let text = ctx.into_visitor();
            let vars: std::collections::BTreeSet<char> =
                text.chars().filter(|c| c.is_ascii_alphabetic()).collect();
            assert_eq!(vars.into_iter().collect::<String>(), allowed);
        }
    }

    #[test]
    fn call_weighting() {
        let config = Config::default();
        let mut state = State::main();
        state.declare(Function::F, Arity::X);
        state.declare(Function::G, Arity::XY);
        state.declare(Function::H, Arity::Y);
        let mut ctx: Context<'_, _, String> =
            Context::with_state(&config, StdRng::seed_from_u64(5), state);
        // arguments past max depth are terminals, so each call is one short token
        let depth = config.max_depth + 1;
        let total = 30_000;
        for _ in 0..total {
            ctx.call(depth);
            ctx.visitor.visit_char(' ');
        }
        let text = ctx.into_visitor();
        let count = |prefix| text.split(' ').filter(|t| t.starts_with(prefix)).count();
        assert_eq!(count("h("), 0);
        let f = count("f{") as f64 / total as f64;
        let g = count("g(") as f64 / total as f64;
        assert!((f - 0.67).abs() < 0.02, "{f}");
        assert!((g - 0.33).abs() < 0.02, "{g}");
    }

    #[test]
    fn call_arguments_follow_arity() {
        let config = Config::default();
        let mut ctx = main_ctx(&config, 11);
        ctx.call_function(Function::G, Arity::YX, config.max_depth + 1);
        ctx.visitor.visit_char(' ');
        ctx.call_function(Function::F, Arity::X, config.max_depth + 1);
        let text = ctx.into_visitor();
        let (g, f) = text.split_once(' ').unwrap();
        assert!(g.starts_with("g("));
        assert_eq!(g.matches(',').count(), 1);
        assert!(f.starts_with("f{"));
        assert!(["f{0}(", "f{1}(", "f{2}("].iter().any(|p| f.starts_with(p)));
        assert!(!f.contains(','));
    }

    #[test]
    fn zero_max_depth_expression() {
        let config = Config {
            max_depth: 0,
            ..Config::default()
        };
        let mut generator = Generator::new(&config, StdRng::seed_from_u64(2));
        for _ in 0..500 {
            let (text, nesting): (String, Nesting) = generator.expression(1);
            assert_eq!(nesting.max(), 0, "{text}");
            assert!(!text.is_empty());
        }
    }

    /// Splits a flat expression into its terms' factor counts. A sign right
    /// after a variable or digit starts a new term; signs after `*` belong to
    /// an integer and exponents are unsigned.
    fn term_shapes(text: &str) -> Vec<usize> {
        let mut terms = vec![1];
        let mut prev = None;
        for c in text.chars() {
            match c {
                '+' | '-' if matches!(prev, Some(p) if p == 'x' || char::is_ascii_digit(&p)) => {
                    terms.push(1)
                }
                '*' => *terms.last_mut().unwrap() += 1,
                _ => {}
            }
            prev = Some(c);
        }
        terms
    }

    #[test]
    fn term_and_factor_counts() {
        let config = Config {
            max_depth: 0,
            expr_length: 3,
            term_length: 2,
            ..Config::default()
        };
        assert_eq!(term_shapes("-x^2*-03+x-+4"), [2, 1, 1]);

        let mut generator = Generator::new(&config, StdRng::seed_from_u64(21));
        let (mut terms_seen, mut factors_seen) = ([false; 7], [false; 5]);
        for _ in 0..20_000 {
            let text: String = generator.expression(1);
            assert!(!text.contains("**") && !text.starts_with('*'), "{text}");
            let shapes = term_shapes(&text);
            assert!((1..=6).contains(&shapes.len()), "{text}");
            terms_seen[shapes.len()] = true;
            for factors in shapes {
                assert!((1..=4).contains(&factors), "{text}");
                factors_seen[factors] = true;
            }
        }
        assert!(terms_seen[1] && terms_seen[6]);
        assert!(factors_seen[1] && factors_seen[4]);
    }

    #[test]
    fn collapse_uses_both_buckets() {
        let config = Config::default();
        let mut ctx = main_ctx(&config, 17);
        let mut powers = 0;
        let total = 20_000;
        for _ in 0..total {
            if ctx.collapse() == Factor::Power {
                powers += 1;
            }
        }
        // pow 25 against signed integer 20
        let ratio = powers as f64 / total as f64;
        assert!((ratio - 25.0 / 45.0).abs() < 0.02, "{ratio}");

        let config = Config {
            weights: crate::Weights {
                pow: 0,
                signed_integer: 0,
                ..Default::default()
            },
            ..Config::default()
        };
        let mut ctx = main_ctx(&config, 17);
        assert_eq!(ctx.collapse(), Factor::Power);
    }

    #[test]
    fn nesting_bounded_by_depth() {
        for max_depth in 0..=4 {
            let config = Config {
                max_depth,
                ..Config::default()
            };
            let mut generator = Generator::new(&config, StdRng::seed_from_u64(max_depth as u64));
            for _ in 0..500 {
                let (text, nesting): (String, Nesting) = generator.case();
                assert!(nesting.is_balanced(), "{text}");
                assert!(nesting.max() <= max_depth as usize + 1, "{text}");
            }
        }
    }

    #[test]
    fn is_deterministic() {
        for preset in Preset::all() {
            let config = preset.config();
            let run = || {
                let mut generator = Generator::new(&config, StdRng::seed_from_u64(77));
                (0..20)
                    .map(|_| generator.case::<(String, u64)>())
                    .collect::<Vec<_>>()
            };
            assert_eq!(run(), run());
        }
    }

    #[test]
    fn arbitrary_bytes() {
        let config = Config::default();
        let seed = b"qwertyqwertyqwertyqwertyqwertyqwerty";
        let mut u = arbitrary::Unstructured::new(seed);
        let old: String = Generator::new(&config, &mut u).case();
        for _ in 0..10 {
            let mut u = arbitrary::Unstructured::new(seed);
            let case: String = Generator::new(&config, &mut u).case();
            assert_eq!(case, old);
        }

        // exhausted input still terminates with a shortest case
        let mut u = arbitrary::Unstructured::new(&[]);
        let (case, nesting): (String, Nesting) = Generator::new(&config, &mut u).case();
        assert!(nesting.is_balanced());
        assert!(case.ends_with('\n'));
    }
}
