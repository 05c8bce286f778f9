use crate::Entropy;

/// An ordered table of `(weight, value)` pairs resolved by a single draw.
///
/// Entries are checked in insertion order against their cumulative weight, so
/// `pick(draw)` returns the first entry whose running total reaches `draw`.
/// Draws past the total land on the fallback: when weights do not sum to the
/// span of the draw, the residual mass goes to the fallback value.
///
/// ```
/// use polygen::WeightTable;
///
/// let table = WeightTable::new('c').with(10, 'a').with(30, 'b');
/// assert_eq!(table.pick(10), 'a');
/// assert_eq!(table.pick(11), 'b');
/// assert_eq!(table.pick(40), 'b');
/// assert_eq!(table.pick(41), 'c');
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable<T> {
    entries: Vec<(u32, T)>,
    fallback: T,
}

impl<T: Copy> WeightTable<T> {
    pub fn new(fallback: T) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    pub fn with(mut self, weight: u32, value: T) -> Self {
        self.entries.push((weight, value));
        self
    }

    /// Sum of all weights, not counting the fallback.
    pub fn total(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, (w, _)| acc.saturating_add(*w))
    }

    pub fn pick(&self, draw: u32) -> T {
        let mut cumulative = 0u32;
        for (weight, value) in self.entries.iter() {
            cumulative = cumulative.saturating_add(*weight);
            if draw <= cumulative {
                return *value;
            }
        }
        self.fallback
    }

    /// Draws once from `[1, span]` and picks.
    ///
    /// A `span` of 0 draws the sentinel 0, which selects the first entry.
    pub fn choose<E: Entropy + ?Sized>(&self, entropy: &mut E, span: u32) -> T {
        self.pick(entropy.random_int(1, span))
    }
}
