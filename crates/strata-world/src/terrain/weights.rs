use strata_regions::RegionId;

/// Sparse region -> weight map.
///
/// Entries keep insertion order so weighted sums are reproducible bit for bit.
/// Zero weights are never stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightMap {
    entries: Vec<(RegionId, f64)>,
}

impl WeightMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `w` to the weight of `id`.
    pub fn add(&mut self, id: RegionId, w: f64) {
        if w <= 0.0 {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some((_, v)) => *v += w,
            None => self.entries.push((id, w)),
        }
    }

    /// Replaces the weight of `id`.
    pub fn set(&mut self, id: RegionId, w: f64) {
        match self.entries.iter().position(|(k, _)| *k == id) {
            Some(i) if w > 0.0 => self.entries[i].1 = w,
            Some(i) => {
                self.entries.remove(i);
            }
            None if w > 0.0 => self.entries.push((id, w)),
            None => {}
        }
    }

    #[inline]
    pub fn get(&self, id: RegionId) -> f64 {
        self.entries
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| *w).sum()
    }

    /// Accumulates `other * t`, skipping the corner entirely when `t` is zero.
    pub fn add_scaled(&mut self, other: &WeightMap, t: f64) {
        if t > 0.0 {
            for (id, w) in other.iter() {
                self.add(id, w * t);
            }
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(RegionId, f64) -> bool) {
        self.entries.retain(|(k, v)| keep(*k, *v));
    }

    /// Highest weight; ties keep the earliest entry.
    pub fn heaviest(&self) -> Option<(RegionId, f64)> {
        let mut best: Option<(RegionId, f64)> = None;
        for (id, w) in self.iter() {
            if best.is_none_or(|(_, bw)| w > bw) {
                best = Some((id, w));
            }
        }
        best
    }
}

impl FromIterator<(RegionId, f64)> for WeightMap {
    fn from_iter<I: IntoIterator<Item = (RegionId, f64)>>(iter: I) -> Self {
        let mut map = WeightMap::new();
        for (id, w) in iter {
            map.add(id, w);
        }
        map
    }
}
