/// Union-find over `0..n` with path halving and union by rank.
#[derive(Debug, Clone)]
pub(crate) struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub(crate) fn new(n: usize) -> Self {
        Self { parent: (0..n as u32).collect(), rank: vec![0; n] }
    }

    /// Representative of the set containing `x`.
    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] as usize != x {
            self.parent[x] = self.parent[self.parent[x] as usize]; // path halving
            x = self.parent[x] as usize;
        }
        x
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were already merged.
    pub(crate) fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb { return false }

        let (root, child) = if self.rank[ra] >= self.rank[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[child] = root as u32;
        if self.rank[root] == self.rank[child] {
            self.rank[root] += 1;
        }
        true
    }

    /// Dense set labels, numbered in order of first appearance, and the number of sets.
    pub(crate) fn labels(&mut self) -> (Vec<u32>, usize) {
        let mut dense = vec![u32::MAX; self.parent.len()];
        let mut next = 0u32;
        let labels = (0..self.parent.len())
            .map(|x| {
                let root = self.find(x);
                if dense[root] == u32::MAX {
                    dense[root] = next;
                    next += 1;
                }
                dense[root]
            })
            .collect();
        (labels, next as usize)
    }
}
