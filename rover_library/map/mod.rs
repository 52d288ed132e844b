//! Graph map the planner searches.
//!
//! Vertices carry a position and an occupancy probability; edges are
//! undirected. A vertex with `occupancy_probability >= 1.0` is an obstacle.

use crate::algorithms::astar::SearchGraph;
use crate::messages::Point2;
use rover_core::{RoverError, RoverResult};

/// Occupancy at or above which a vertex cannot be entered
pub const OCCUPIED: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: usize,
    pub position: Point2,
    pub occupancy_probability: f64,
    pub g_cost: f64,
    pub f_cost: f64,
}

impl Vertex {
    fn new(id: usize, position: Point2) -> Self {
        Self {
            id,
            position,
            occupancy_probability: 0.0,
            g_cost: f64::INFINITY,
            f_cost: f64::INFINITY,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupancy_probability >= OCCUPIED
    }
}

#[derive(Debug, Clone, Default)]
pub struct Map {
    vertices: Vec<Vertex>,
    adjacency: Vec<Vec<usize>>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform `cols` x `rows` grid with 4-connectivity.
    ///
    /// Ids are row-major starting at the origin: vertex `row * cols + col`
    /// sits at `(col * spacing, row * spacing)`.
    pub fn grid(cols: usize, rows: usize, spacing: f64) -> Self {
        let mut map = Self::new();
        for row in 0..rows {
            for col in 0..cols {
                map.add_vertex(Point2::new(col as f64 * spacing, row as f64 * spacing));
            }
        }
        for row in 0..rows {
            for col in 0..cols {
                let id = row * cols + col;
                if col + 1 < cols {
                    map.connect(id, id + 1);
                }
                if row + 1 < rows {
                    map.connect(id, id + cols);
                }
            }
        }
        map
    }

    /// Append a free vertex and return its id
    pub fn add_vertex(&mut self, position: Point2) -> usize {
        let id = self.vertices.len();
        self.vertices.push(Vertex::new(id, position));
        self.adjacency.push(Vec::new());
        id
    }

    /// Connect two vertices in both directions
    pub fn add_edge(&mut self, a: usize, b: usize) -> RoverResult<()> {
        self.check_id(a)?;
        self.check_id(b)?;
        if a != b {
            self.connect(a, b);
        }
        Ok(())
    }

    fn connect(&mut self, a: usize, b: usize) {
        if !self.adjacency[a].contains(&b) {
            self.adjacency[a].push(b);
            self.adjacency[b].push(a);
        }
    }

    fn check_id(&self, id: usize) -> RoverResult<()> {
        if id < self.vertices.len() {
            Ok(())
        } else {
            Err(RoverError::not_found(format!(
                "vertex {} (map has {} vertices)",
                id,
                self.vertices.len()
            )))
        }
    }

    pub fn set_occupancy(&mut self, id: usize, probability: f64) -> RoverResult<()> {
        self.check_id(id)?;
        self.vertices[id].occupancy_probability = probability;
        Ok(())
    }

    /// Mark `id` as an obstacle
    pub fn block(&mut self, id: usize) -> RoverResult<()> {
        self.set_occupancy(id, OCCUPIED)
    }

    pub fn vertex(&self, id: usize) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(a).is_some_and(|n| n.contains(&b))
    }

    /// Closest vertex to `point` no farther than `radius`.
    ///
    /// Linear scan; equal distances resolve to the lowest id.
    pub fn nearest_within(&self, point: &Point2, radius: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for vertex in &self.vertices {
            let d = vertex.position.distance(point);
            if d <= radius && best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((vertex.id, d));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl SearchGraph for Map {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn position(&self, id: usize) -> Point2 {
        self.vertices[id].position
    }

    fn is_traversable(&self, id: usize) -> bool {
        !self.vertices[id].is_occupied()
    }

    fn neighbors(&self, id: usize) -> &[usize] {
        &self.adjacency[id]
    }

    fn costs(&self, id: usize) -> (f64, f64) {
        let v = &self.vertices[id];
        (v.g_cost, v.f_cost)
    }

    fn set_costs(&mut self, id: usize, g_cost: f64, f_cost: f64) {
        let v = &mut self.vertices[id];
        v.g_cost = g_cost;
        v.f_cost = f_cost;
    }

    fn reset_costs(&mut self) {
        for v in &mut self.vertices {
            v.g_cost = f64::INFINITY;
            v.f_cost = f64::INFINITY;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let map = Map::grid(4, 3, 0.5);
        assert_eq!(map.len(), 12);
        assert_eq!(map.vertex(5).unwrap().position, Point2::new(0.5, 0.5));

        // Corner has two neighbours, interior has four
        assert_eq!(map.neighbors(0), &[1, 4]);
        assert_eq!(map.neighbors(5).len(), 4);
        assert!(map.has_edge(3, 7));
        assert!(!map.has_edge(3, 4));
    }

    #[test]
    fn test_occupancy() {
        let mut map = Map::grid(2, 2, 1.0);
        map.set_occupancy(1, 0.5).unwrap();
        assert!(map.is_traversable(1));
        map.block(1).unwrap();
        assert!(!map.is_traversable(1));
        assert!(map.block(99).is_err());
    }

    #[test]
    fn test_nearest_within() {
        let map = Map::grid(4, 4, 1.0);
        assert_eq!(map.nearest_within(&Point2::new(0.1, 0.1), 0.5), Some(0));
        assert_eq!(map.nearest_within(&Point2::new(2.9, 3.2), 0.5), Some(15));
        // Halfway between 0 and 1 resolves to the lower id
        assert_eq!(map.nearest_within(&Point2::new(0.5, 0.0), 0.5), Some(0));
        assert_eq!(map.nearest_within(&Point2::new(10.0, 10.0), 1.0), None);
    }

    #[test]
    fn test_add_edge_validates_ids() {
        let mut map = Map::new();
        let a = map.add_vertex(Point2::new(0.0, 0.0));
        let b = map.add_vertex(Point2::new(1.0, 0.0));
        map.add_edge(a, b).unwrap();
        map.add_edge(b, a).unwrap();
        assert_eq!(map.neighbors(a), &[b]);
        assert!(matches!(map.add_edge(a, 7), Err(RoverError::NotFound(_))));
    }

    #[test]
    fn test_reset_costs() {
        let mut map = Map::grid(2, 1, 1.0);
        map.set_costs(0, 0.0, 1.0);
        map.reset_costs();
        assert_eq!(map.costs(0), (f64::INFINITY, f64::INFINITY));
    }
}
