use crate::types::Claim;

/// Claimed spans of one input, kept sorted by `start` and non-overlapping.
///
/// Lookups are binary searches over the interval list. A map lives for
/// exactly one engine call.
#[derive(Debug, Default)]
pub struct ClaimMap {
    claims: Vec<Claim>,
}

impl ClaimMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no position in `[start, end)` is claimed.
    pub fn is_free(&self, start: usize, end: usize) -> bool {
        let idx = self.claims.partition_point(|claim| claim.end <= start);
        match self.claims.get(idx) {
            Some(next) => next.start >= end,
            None => true,
        }
    }

    /// Add claims produced by one rule. Callers check `is_free` first;
    /// overlapping or empty claims are dropped here as well.
    pub fn commit(&mut self, pending: Vec<Claim>) {
        for claim in pending {
            if claim.is_empty() || !self.is_free(claim.start, claim.end) {
                continue;
            }
            let idx = self.claims.partition_point(|c| c.start < claim.start);
            self.claims.insert(idx, claim);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn into_vec(self) -> Vec<Claim> {
        self.claims
    }
}
