//! Union-find over `0..n`, used by [`crate::fsm::FiniteStateMachine::without_epsilons`]
//! to group states reachable from each other purely by epsilon transitions.
//!
//! Ported directly from the teacher's `common::algorithms::DisjointSets`.

#[derive(Clone)]
struct ElementData {
    parent: usize,
    min: usize,
    rank: usize,
}

pub struct DisjointSets {
    elements: Vec<ElementData>,
}

impl DisjointSets {
    pub fn new(n: usize) -> Self {
        let mut elements = Vec::with_capacity(n);
        for i in 0..n {
            elements.push(ElementData {
                parent: i,
                min: i,
                rank: 0,
            });
        }
        Self { elements }
    }

    pub fn find_set(&mut self, x: usize) -> usize {
        let parent = self.elements[x].parent;
        if parent != x {
            self.elements[x].parent = self.find_set(parent);
        }
        self.elements[x].parent
    }

    pub fn find_set_min(&mut self, x: usize) -> usize {
        let root = self.find_set(x);
        self.elements[root].min
    }

    pub fn union_sets(&mut self, x: usize, y: usize) {
        let mut x = self.find_set(x);
        let mut y = self.find_set(y);
        if x == y {
            return;
        }

        if self.elements[x].rank < self.elements[y].rank {
            std::mem::swap(&mut x, &mut y);
        }
        self.elements[y].parent = x;
        if self.elements[x].rank == self.elements[y].rank {
            self.elements[x].rank += 1;
        }

        if self.elements[y].min < self.elements[x].min {
            self.elements[x].min = self.elements[y].min;
        }
    }
}
