//! The generator signature trait and the default signature type.
//!
//! A generator's signature is an opaque value carrying, at minimum, a pair `(k, n)` giving
//! the number of target (input) and source (output) ports. Following the common split
//! between an operation's behaviour and its plain signature data, we expose a trait so a
//! host application can use its own generator-label type, plus a ready made struct for the
//! common case.

use smol_str::SmolStr;

/// A generator signature: the number of target (input) and source (output) ports.
///
/// `sig` is totally ordered and comparable for equality (§3); the core imposes only
/// decidable equality, so `PartialEq`/`Eq` are required but `Ord` is only needed by
/// signature types that want a canonical enumeration order (matching does not rely on it).
pub trait Signature: Clone + PartialEq + Eq + std::fmt::Debug {
    /// `k`: the number of target ports (a generator's inputs).
    fn num_targets(&self) -> usize;
    /// `n`: the number of source ports (a generator's outputs).
    fn num_sources(&self) -> usize;
}

/// Per-port y-offsets and tile height for a generator, used by the layout engine (§4.6).
///
/// Defaulted to the dense `0..k-1` / `0..n-1` ranges and `max(1, k, n)` height, so a host
/// signature type only needs to override this when it wants a taller tile or a
/// non-default port arrangement.
pub trait GeneratorLayout: Signature {
    /// y-offsets of target ports within the generator's tile.
    fn target_offsets(&self) -> Vec<usize> {
        (0..self.num_targets()).collect()
    }

    /// y-offsets of source ports within the generator's tile.
    fn source_offsets(&self) -> Vec<usize> {
        (0..self.num_sources()).collect()
    }

    /// The height (in grid rows) of the generator's tile.
    fn height(&self) -> usize {
        1.max(self.num_targets()).max(self.num_sources())
    }
}

impl<S: Signature> GeneratorLayout for S {}

/// A simple, name-carrying signature suitable for most uses.
///
/// Two `GeneratorSignature`s are "matchable" (§3) by plain structural equality: same name,
/// same arity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorSignature {
    /// The generator's name, used only for display/debugging and matchability.
    pub name: SmolStr,
    /// `k`, the number of target (input) ports.
    pub inputs: usize,
    /// `n`, the number of source (output) ports.
    pub outputs: usize,
}

impl GeneratorSignature {
    /// Create a new signature with the given name and arity.
    pub fn new(name: impl Into<SmolStr>, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }
}

impl Signature for GeneratorSignature {
    fn num_targets(&self) -> usize {
        self.inputs
    }

    fn num_sources(&self) -> usize {
        self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_offsets_are_dense() {
        let f = GeneratorSignature::new("f", 2, 3);
        assert_eq!(f.target_offsets(), vec![0, 1]);
        assert_eq!(f.source_offsets(), vec![0, 1, 2]);
        assert_eq!(f.height(), 3);
    }

    #[test]
    fn zero_arity_generator_has_no_ports_of_that_role() {
        let f = GeneratorSignature::new("unit", 0, 1);
        assert!(f.target_offsets().is_empty());
        assert_eq!(f.height(), 1);
    }
}
