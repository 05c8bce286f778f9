use crate::Factor;
use itoa::Buffer as itoaBuffer;

/// Receives the output of the generator as it is produced.
///
/// This is implemented for
/// - `String` and `Vec<u8>` to produce the text of a test case
/// - `u64` to produce an identifier of the derivation shape (which factor kinds
///   were chosen and how they nest), ignoring literal values
/// - [`Nesting`] to measure bracket nesting
/// - tuples of visitors, to collect several of the above in one pass
///
/// Brackets are reported with `visit_open`/`visit_close` rather than as characters,
/// so that shape-aware visitors do not need to re-scan the text.
pub trait Visitor {
    fn new() -> Self;
    fn visit_factor(&mut self, _factor: Factor) {}
    fn visit_open(&mut self) {}
    fn visit_close(&mut self) {}
    fn visit_literal(&mut self, _s: &str) {}
    fn visit_char(&mut self, _c: char) {}
    fn visit_u32(&mut self, _num: u32) {}
}

/// Returns the generated text as bytes.
impl Visitor for Vec<u8> {
    fn new() -> Self {
        Default::default()
    }
    fn visit_open(&mut self) {
        self.push(b'(');
    }
    fn visit_close(&mut self) {
        self.push(b')');
    }
    fn visit_literal(&mut self, val: &str) {
        self.extend(val.as_bytes());
    }
    fn visit_char(&mut self, c: char) {
        let mut b = [0; 4];
        let result = c.encode_utf8(&mut b);
        self.extend(result.as_bytes())
    }
    fn visit_u32(&mut self, num: u32) {
        self.extend(itoaBuffer::new().format(num).as_bytes());
    }
}

/// Returns the generated text.
impl Visitor for String {
    fn new() -> Self {
        Default::default()
    }
    fn visit_open(&mut self) {
        self.push('(');
    }
    fn visit_close(&mut self) {
        self.push(')');
    }
    fn visit_literal(&mut self, val: &str) {
        self.push_str(val);
    }
    fn visit_char(&mut self, c: char) {
        self.push(c)
    }
    fn visit_u32(&mut self, num: u32) {
        self.push_str(itoaBuffer::new().format(num));
    }
}

fn id_hash(val: &mut u64, rule_id: u64) {
    *val = fxhash::hash64(&(rule_id, *val));
}

/// Returns an identifier of the derivation shape.
impl Visitor for u64 {
    fn new() -> Self {
        u64::MAX
    }
    fn visit_factor(&mut self, factor: Factor) {
        id_hash(self, fxhash::hash64(&(0, factor as u64)))
    }
    fn visit_open(&mut self) {
        id_hash(self, 1)
    }
    fn visit_close(&mut self) {
        id_hash(self, 2)
    }
}

/// Tracks bracket nesting of the generated text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Nesting {
    depth: usize,
    max: usize,
    underflow: bool,
}

impl Nesting {
    /// Deepest bracket nesting seen.
    pub fn max(&self) -> usize {
        self.max
    }

    /// `true` if every opened bracket was closed, and never closed before being opened.
    pub fn is_balanced(&self) -> bool {
        !self.underflow && self.depth == 0
    }
}

impl Visitor for Nesting {
    fn new() -> Self {
        Default::default()
    }
    fn visit_open(&mut self) {
        self.depth += 1;
        self.max = self.max.max(self.depth);
    }
    fn visit_close(&mut self) {
        match self.depth.checked_sub(1) {
            Some(d) => self.depth = d,
            None => self.underflow = true,
        }
    }
}

macro_rules! impl_visitor_tuple {
    ( $($name:ident)+) => (
        #[allow(non_snake_case)]
        impl<$($name: Visitor),+> Visitor for ($($name,)+) {
            fn new() -> ($($name,)+) {
                ($({ let x: $name = Visitor::new(); x},)+)
            }

            fn visit_factor(&mut self, factor: Factor) {
                let ($(ref mut $name,)+) = *self;
                $($name.visit_factor(factor);)+
            }
            fn visit_open(&mut self) {
                let ($(ref mut $name,)+) = *self;
                $($name.visit_open();)+
            }
            fn visit_close(&mut self) {
                let ($(ref mut $name,)+) = *self;
                $($name.visit_close();)+
            }
            fn visit_literal(&mut self, val: &str) {
                let ($(ref mut $name,)+) = *self;
                $($name.visit_literal(val);)+
            }
            fn visit_char(&mut self, c: char) {
                let ($(ref mut $name,)+) = *self;
                $($name.visit_char(c);)+
            }
            fn visit_u32(&mut self, num: u32) {
                let ($(ref mut $name,)+) = *self;
                $($name.visit_u32(num);)+
            }
        }
    );
}

impl_visitor_tuple! { T }
impl_visitor_tuple! { T B }
impl_visitor_tuple! { T B C }
impl_visitor_tuple! { T B C D }
