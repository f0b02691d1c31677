//! Collision layers decide which colliders are allowed to touch each other.

/// A set of up to 32 collision layers, stored as a bitmask.
///
/// Every collider has two of these: its `layers` say what it is,
/// its `mask` says what it collides with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub struct LayerSet(u32);

impl LayerSet {
    /// Number of distinct layers a set can hold.
    pub const CAPACITY: usize = 32;

    /// A set containing no layers. Colliders with an empty mask collide with nothing.
    pub const fn empty() -> Self {
        LayerSet(0)
    }

    /// A set containing every layer.
    pub const fn all() -> Self {
        LayerSet(u32::MAX)
    }

    /// A set containing just the given layer.
    /// Layers outside of the capacity produce an empty set.
    pub fn single(layer: usize) -> Self {
        Self::empty().with(layer)
    }

    pub const fn from_bits(bits: u32) -> Self {
        LayerSet(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Add a layer in a builder-like chain.
    pub fn with(mut self, layer: usize) -> Self {
        self.insert(layer);
        self
    }

    /// Add a layer. Does nothing if the layer is out of range.
    pub fn insert(&mut self, layer: usize) {
        if layer < Self::CAPACITY {
            self.0 |= 1 << layer;
        } else {
            log::debug!("Ignored collision layer {layer} outside of 0..{}", Self::CAPACITY);
        }
    }

    pub fn remove(&mut self, layer: usize) {
        if layer < Self::CAPACITY {
            self.0 &= !(1 << layer);
        }
    }

    pub fn contains(&self, layer: usize) -> bool {
        layer < Self::CAPACITY && self.0 & (1 << layer) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check whether the two sets have at least one layer in common.
    pub fn intersects(&self, other: LayerSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate over the layers in the set in ascending order.
    pub fn iter(&self) -> LayerIter {
        LayerIter { bits: self.0 }
    }
}

impl Default for LayerSet {
    /// Layer 0 only.
    fn default() -> Self {
        LayerSet(1)
    }
}

impl FromIterator<usize> for LayerSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = LayerSet::empty();
        for layer in iter {
            set.insert(layer);
        }
        set
    }
}

/// Iterator over the layers in a [`LayerSet`].
pub struct LayerIter {
    bits: u32,
}

impl Iterator for LayerIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let first_bit_idx = self.bits.trailing_zeros();
        self.bits ^= 1 << first_bit_idx;
        Some(first_bit_idx as usize)
    }
}
