#[cfg(test)]
mod tests {
    use super::super::{
        astar_search, astar_search_with_cost, path_cost, reconstruct_path, Heuristic,
        PredecessorMap, SearchGraph,
    };
    use crate::map::Map;
    use crate::messages::Point2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rover_core::RoverError;

    fn euclidean(a: &Point2, b: &Point2) -> f64 {
        Heuristic::Euclidean.cost(a, b)
    }

    fn plan(map: &mut Map, start: usize, goal: usize) -> Option<Vec<usize>> {
        let predecessors = astar_search(map, start, goal, euclidean);
        reconstruct_path(&predecessors, start, goal).ok()
    }

    fn assert_valid_path(map: &Map, path: &[usize]) {
        for pair in path.windows(2) {
            assert!(
                map.has_edge(pair[0], pair[1]),
                "{} -> {} is not an edge",
                pair[0],
                pair[1]
            );
        }
    }

    /// Single-source shortest path costs honouring traversability
    fn bellman_ford(map: &Map, start: usize) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; map.len()];
        dist[start] = 0.0;
        for _ in 0..map.len() {
            let mut changed = false;
            for u in 0..map.len() {
                if dist[u].is_infinite() {
                    continue;
                }
                for &v in map.neighbors(u) {
                    if !map.is_traversable(v) {
                        continue;
                    }
                    let candidate = dist[u] + euclidean(&map.position(u), &map.position(v));
                    if candidate < dist[v] {
                        dist[v] = candidate;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        dist
    }

    fn random_graph(rng: &mut StdRng, vertices: usize) -> Map {
        let mut map = Map::new();
        for _ in 0..vertices {
            map.add_vertex(Point2::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)));
        }
        for a in 0..vertices {
            for b in (a + 1)..vertices {
                if rng.gen_bool(0.25) {
                    map.add_edge(a, b).unwrap();
                }
            }
        }
        for id in 1..vertices {
            if rng.gen_bool(0.1) {
                map.block(id).unwrap();
            }
        }
        map
    }

    #[test]
    fn test_open_grid_corner_to_corner() {
        let mut map = Map::grid(4, 4, 1.0);
        let path = plan(&mut map, 0, 15).unwrap();

        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&15));
        // Manhattan-shortest on a 4-connected grid
        assert_eq!(path.len(), 7);
        assert_valid_path(&map, &path);
    }

    #[test]
    fn test_tie_break_prefers_lowest_id() {
        // 2 --- 3
        // |     |
        // 0 --- 1
        let mut map = Map::grid(2, 2, 1.0);
        assert_eq!(plan(&mut map, 0, 3).unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let mut map = Map::grid(6, 6, 1.0);
        map.block(14).unwrap();
        map.block(20).unwrap();

        let first = plan(&mut map, 0, 35).unwrap();
        for _ in 0..10 {
            assert_eq!(plan(&mut map, 0, 35).unwrap(), first);
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let mut map = Map::grid(3, 3, 1.0);
        let predecessors = astar_search(&mut map, 4, 4, euclidean);

        let mut expected = PredecessorMap::new();
        expected.insert(4, 4);
        assert_eq!(predecessors, expected);
        assert_eq!(reconstruct_path(&predecessors, 4, 4).unwrap(), vec![4]);
    }

    #[test]
    fn test_path_around_obstacle_row() {
        // Row y = 2 blocked except for vertex 11
        let mut map = Map::grid(4, 4, 1.0);
        for id in [8, 9, 10] {
            map.block(id).unwrap();
        }

        let path = plan(&mut map, 0, 15).unwrap();
        assert!(path.contains(&11));
        assert!(!path.iter().any(|id| [8, 9, 10].contains(id)));
        assert_valid_path(&map, &path);
    }

    #[test]
    fn test_no_path_exists() {
        let mut map = Map::grid(4, 4, 1.0);
        for id in 8..12 {
            map.block(id).unwrap();
        }

        let predecessors = astar_search(&mut map, 0, 15, euclidean);
        assert!(!predecessors.contains_key(&15));
        assert!(matches!(
            reconstruct_path(&predecessors, 0, 15),
            Err(RoverError::NotFound(_))
        ));
    }

    #[test]
    fn test_out_of_range_vertices() {
        let mut map = Map::grid(2, 2, 1.0);
        assert!(astar_search(&mut map, 0, 42, euclidean).is_empty());
    }

    #[test]
    fn test_optimal_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let vertices = rng.gen_range(2..=20);
            let mut map = random_graph(&mut rng, vertices);
            let goal = rng.gen_range(0..vertices);
            let expected = bellman_ford(&map, 0);

            match plan(&mut map, 0, goal) {
                Some(path) => {
                    assert_valid_path(&map, &path);
                    let cost = path_cost(&map, &path, euclidean);
                    assert!(
                        (cost - expected[goal]).abs() < 1e-9,
                        "A* cost {} vs brute force {}",
                        cost,
                        expected[goal]
                    );
                }
                None => assert!(expected[goal].is_infinite()),
            }
        }
    }

    #[test]
    fn test_separate_edge_cost() {
        // Zero heuristic and unit edges reduce to breadth-first hop count
        let mut map = Map::grid(5, 5, 1.0);
        let predecessors = astar_search_with_cost(&mut map, 0, 24, |_, _| 0.0, |_, _| 1.0);
        let path = reconstruct_path(&predecessors, 0, 24).unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path_cost(&map, &path, |_, _| 1.0), 8.0);
    }

    #[test]
    fn test_scratch_costs_left_on_graph() {
        let mut map = Map::grid(3, 1, 2.0);
        let _ = astar_search(&mut map, 0, 2, euclidean);
        assert_eq!(map.costs(0).0, 0.0);
        assert_eq!(map.costs(1).0, 2.0);

        // A later search starts from clean scratch
        let _ = astar_search(&mut map, 2, 1, euclidean);
        assert_eq!(map.costs(0).0, f64::INFINITY);
    }

    #[test]
    fn test_broken_chain() {
        let mut predecessors = PredecessorMap::new();
        predecessors.insert(3, 2);
        // 2 has no predecessor
        assert!(reconstruct_path(&predecessors, 0, 3).is_err());

        // Cycle that never reaches the start
        predecessors.insert(2, 3);
        assert!(reconstruct_path(&predecessors, 0, 3).is_err());
    }

    #[test]
    fn test_heuristics() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(Heuristic::Euclidean.cost(&a, &b), 5.0);
        assert_eq!(Heuristic::Manhattan.cost(&a, &b), 7.0);
        let diagonal = Heuristic::Diagonal.cost(&a, &b);
        assert!((diagonal - (4.0 + (2f64.sqrt() - 1.0) * 3.0)).abs() < 1e-12);
        assert_eq!(Heuristic::default(), Heuristic::Euclidean);
    }
}
