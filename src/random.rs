use arbitrary::Unstructured;
use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;

/// Source of the bounded draws every production is built on.
///
/// Implemented for seedable `rand` generators, so that a fixed seed reproduces a
/// corpus byte for byte, and for [`Unstructured`], so that a fuzzer can steer the
/// generator with its own input bytes.
pub trait Entropy {
    /// Returns a uniformly distributed integer in `[low, high]`.
    ///
    /// Returns `0` when `low > high`. Callers must not rely on the value in that case.
    fn random_int(&mut self, low: u32, high: u32) -> u32;

    /// Returns `true` with probability `percent / 100`.
    fn random_chance(&mut self, percent: u32) -> bool {
        self.random_int(1, 100) <= percent
    }
}

macro_rules! impl_entropy_for_rng {
    ($($rng:ty),* $(,)*) => (
        $(
            impl Entropy for $rng {
                fn random_int(&mut self, low: u32, high: u32) -> u32 {
                    if low > high {
                        return 0;
                    }
                    self.random_range(low..=high)
                }
            }
        )*
    )
}

impl_entropy_for_rng!(StdRng, ThreadRng);

/// Draws from fuzzer-provided bytes. Once the bytes run out every draw
/// returns `low`, which steers the grammar towards its shortest productions.
impl Entropy for Unstructured<'_> {
    fn random_int(&mut self, low: u32, high: u32) -> u32 {
        if low > high {
            return 0;
        }
        self.int_in_range(low..=high).unwrap_or(low)
    }
}

impl<E: Entropy + ?Sized> Entropy for &mut E {
    fn random_int(&mut self, low: u32, high: u32) -> u32 {
        (**self).random_int(low, high)
    }
}
