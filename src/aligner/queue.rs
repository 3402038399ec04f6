//! Monotone bucket queues for Dijkstra-style searches with small integer edge weights

use std::collections::VecDeque;

/// Priority queue over vertex ids `0..order` used by the shortest path search
///
/// Queues are monotone: every pushed cost is at least the cost of the last
/// popped vertex, and at most that cost plus [`PathQueue::MAX_EDGE_COST`].
pub trait PathQueue {
    /// Largest single edge cost the queue supports
    const MAX_EDGE_COST: u8;

    fn with_order(order: usize) -> Self;

    fn push(&mut self, vertex: usize, cost: u32);

    /// Decrease the cost of a vertex that is currently queued
    fn fix(&mut self, vertex: usize, cost: u32);

    fn pop(&mut self) -> Option<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two-bucket queue for edge weights in {0, 1} (0-1 BFS)
///
/// Bucket 0 holds the vertices at distance `offset`, bucket 1 those at
/// `offset + 1`. When bucket 0 runs empty the buckets are swapped, which
/// suffices because no vertex can be pushed more than one level ahead of the
/// frontier. Within a bucket vertices are popped in arbitrary order.
#[derive(Debug, Clone)]
pub struct BucketQueue {
    position: Vec<usize>,
    cost: Vec<u32>,
    buckets: [Vec<usize>; 2],
    offset: u32,
    length: usize,
}

impl BucketQueue {
    pub fn new(order: usize) -> Self {
        Self {
            position: vec![0; order],
            cost: vec![0; order],
            buckets: [Vec::with_capacity(512), Vec::with_capacity(512)],
            offset: 0,
            length: 0,
        }
    }

    /// Distance of the current frontier
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Last cost recorded for a vertex
    pub fn cost(&self, vertex: usize) -> u32 {
        self.cost[vertex]
    }

    #[inline]
    fn bucket_of(&self, cost: u32) -> usize {
        debug_assert!(cost >= self.offset && cost - self.offset < 2,
            "cost {cost} outside the queue window at offset {}", self.offset);

        (cost - self.offset) as usize
    }

    fn remove(&mut self, vertex: usize) {
        let p = self.bucket_of(self.cost[vertex]);
        let i = self.position[vertex];

        let bucket = &mut self.buckets[p];
        bucket.swap_remove(i);
        if let Some(&moved) = bucket.get(i) {
            self.position[moved] = i;
        }

        self.length -= 1;
    }
}

impl PathQueue for BucketQueue {
    const MAX_EDGE_COST: u8 = 1;

    fn with_order(order: usize) -> Self {
        Self::new(order)
    }

    fn push(&mut self, vertex: usize, cost: u32) {
        let p = self.bucket_of(cost);

        self.position[vertex] = self.buckets[p].len();
        self.buckets[p].push(vertex);
        self.cost[vertex] = cost;
        self.length += 1;
    }

    fn fix(&mut self, vertex: usize, cost: u32) {
        self.remove(vertex);
        self.push(vertex, cost);
    }

    fn pop(&mut self) -> Option<usize> {
        if self.length == 0 {
            return None;
        }

        if self.buckets[0].is_empty() {
            self.buckets.swap(0, 1);
            self.offset += 1;
        }

        let vertex = self.buckets[0].pop()?;
        self.length -= 1;

        Some(vertex)
    }

    #[inline]
    fn len(&self) -> usize {
        self.length
    }
}

/// Layered (bucket) queue for arbitrary non-negative integer edge weights
///
/// The layer number represents the priority of the queued vertex. Decreasing
/// a cost queues the vertex again and leaves a stale entry behind, which is
/// skipped when popped.
#[derive(Debug, Clone)]
pub struct LayeredQueue {
    layers: VecDeque<Vec<(usize, u32)>>,
    layer_min: usize,

    /// Push counter per vertex, used to recognize stale layer entries
    stamp: Vec<u32>,
    queued: Vec<bool>,
    length: usize,
}

impl LayeredQueue {
    pub fn new(order: usize) -> Self {
        Self {
            layers: VecDeque::with_capacity(64),
            layer_min: 0,
            stamp: vec![0; order],
            queued: vec![false; order],
            length: 0,
        }
    }

    fn queue_layer(&mut self, vertex: usize, priority: usize) {
        if self.layers.is_empty() {
            self.layers.push_back(Vec::default());
            self.layer_min = priority;
        } else {
            let layer_max = self.layer_min + self.layers.len();

            if priority < self.layer_min {
                let diff = self.layer_min - priority;
                self.layers.reserve(diff);

                for _ in 0..diff {
                    self.layers.push_front(Vec::default())
                }

                self.layer_min = priority;
            } else if priority >= layer_max {
                self.layers.resize(priority - self.layer_min + 1, Vec::default());
            }
        }

        self.stamp[vertex] = self.stamp[vertex].wrapping_add(1);
        let ix = priority - self.layer_min;
        self.layers[ix].push((vertex, self.stamp[vertex]));
    }
}

impl PathQueue for LayeredQueue {
    const MAX_EDGE_COST: u8 = u8::MAX;

    fn with_order(order: usize) -> Self {
        Self::new(order)
    }

    fn push(&mut self, vertex: usize, cost: u32) {
        self.queue_layer(vertex, cost as usize);
        self.queued[vertex] = true;
        self.length += 1;
    }

    fn fix(&mut self, vertex: usize, cost: u32) {
        self.queue_layer(vertex, cost as usize);
    }

    fn pop(&mut self) -> Option<usize> {
        loop {
            let entry = self.layers.front_mut()?.pop();

            while self.layers.front().is_some_and(|layer| layer.is_empty()) {
                self.layers.pop_front();
                self.layer_min += 1;
            }

            if let Some((vertex, stamp)) = entry {
                if self.queued[vertex] && self.stamp[vertex] == stamp {
                    self.queued[vertex] = false;
                    self.length -= 1;

                    return Some(vertex);
                }
            }
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.length
    }
}
