//! Structural properties of built quadtrees

use rstest::rstest;

use qtree::domain::{BuildOptions, Point, QuadTree, Quadrant, Region, TreeBuilder};
use qtree::infrastructure::traits::{PointGenerator, UniformPointGenerator};
use qtree::util::testing;

fn random_points(n: usize, seed: u64) -> Vec<Point> {
    UniformPointGenerator.generate(n, Some(seed))
}

fn leaf_snapshot(tree: &QuadTree) -> Vec<(Region, Vec<usize>, usize, bool)> {
    tree.leaves()
        .map(|leaf| {
            (
                leaf.region(),
                leaf.point_indices().to_vec(),
                leaf.depth(),
                leaf.is_forced(),
            )
        })
        .collect()
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(10)]
fn given_random_points_when_building_then_every_point_is_in_a_containing_leaf(#[case] k: usize) {
    testing::init_test_setup();
    // Arrange
    let points = random_points(300, 11);

    // Act
    let tree = QuadTree::build(points.clone(), k).unwrap();

    // Assert
    for (i, p) in points.iter().enumerate() {
        let holders: Vec<_> = tree
            .leaves()
            .filter(|leaf| leaf.point_indices().contains(&i))
            .collect();
        assert!(!holders.is_empty(), "point {i} {p} is in no leaf");
        assert!(holders.iter().all(|leaf| leaf.region().contains(p)));
    }
}

#[rstest]
#[case(1)]
#[case(4)]
fn given_random_points_when_building_then_leaves_tile_the_root(#[case] k: usize) {
    // Arrange
    let points = random_points(150, 5);

    // Act
    let tree = QuadTree::build(points, k).unwrap();

    // Assert: areas add up and no two leaves share interior
    let root_area = tree.root_region().area();
    let leaf_area: f64 = tree.leaves().map(|leaf| leaf.region().area()).sum();
    assert!(((leaf_area - root_area) / root_area).abs() < 1e-9);

    let regions: Vec<Region> = tree.leaves().map(|leaf| leaf.region()).collect();
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            assert!(!a.overlaps_interior(b), "{a} overlaps {b}");
        }
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(7)]
fn given_threshold_when_building_then_no_unforced_leaf_exceeds_it(#[case] k: usize) {
    let tree = QuadTree::build(random_points(500, 3), k).unwrap();

    assert!(tree.leaves().all(|leaf| leaf.is_forced() || leaf.len() <= k));
}

#[test]
fn given_split_nodes_when_inspecting_then_children_are_parent_quadrants() {
    // Arrange
    let tree = QuadTree::build(random_points(200, 21), 2).unwrap();

    // Act / Assert
    let mut splits = 0;
    for (_, node) in tree.nodes() {
        let Some(children) = tree.children(node) else {
            continue;
        };
        splits += 1;
        assert!(node.points.is_empty(), "split node keeps points");
        for (quadrant, child) in Quadrant::ALL.iter().zip(children) {
            assert_eq!(child.region, node.region.quadrant(*quadrant));
            assert_eq!(child.depth, node.depth + 1);
        }
    }
    assert!(splits > 0);
}

#[test]
fn given_same_input_when_building_twice_then_trees_are_identical() {
    let points = random_points(250, 99);

    let a = QuadTree::build(points.clone(), 3).unwrap();
    let b = QuadTree::build(points, 3).unwrap();

    assert_eq!(leaf_snapshot(&a), leaf_snapshot(&b));
    assert_eq!(a.node_count(), b.node_count());
}

#[rstest]
#[case(1, 200)]
#[case(3, 1000)]
#[case(16, 1000)]
fn given_parallel_option_when_building_then_matches_sequential(
    #[case] k: usize,
    #[case] n: usize,
) {
    // Arrange
    let points = random_points(n, 42);
    let sequential = TreeBuilder::new(BuildOptions::with_threshold(k));
    let parallel = TreeBuilder::new(BuildOptions {
        parallel: true,
        ..BuildOptions::with_threshold(k)
    });

    // Act
    let a = sequential.build(points.clone()).unwrap();
    let b = parallel.build(points).unwrap();

    // Assert
    assert_eq!(leaf_snapshot(&a), leaf_snapshot(&b));
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn given_diagonal_pair_when_building_then_split_once_into_sw_and_ne() {
    // Arrange
    let points = [(0.0, 0.0), (1.0, 1.0)];

    // Act
    let tree = QuadTree::build(points, 1).unwrap();

    // Assert
    let root = tree.root_region();
    assert!((root.x0 + 0.1).abs() < 1e-12);
    assert!((root.y0 + 0.1).abs() < 1e-12);
    assert!((root.width - 1.21).abs() < 1e-12);
    assert!((root.height - 1.21).abs() < 1e-12);

    let leaves: Vec<_> = tree.leaves().collect();
    assert_eq!(leaves.len(), 4);
    // NW, NE, SE, SW
    assert_eq!(leaves[0].len(), 0);
    assert_eq!(leaves[1].point_indices(), &[1]);
    assert_eq!(leaves[2].len(), 0);
    assert_eq!(leaves[3].point_indices(), &[0]);
}

#[test]
fn given_identical_points_when_building_then_guard_stops_recursion() {
    testing::init_test_setup();
    // Arrange
    let points = [(0.0, 0.0); 3];

    // Act
    let tree = QuadTree::build(points, 1).unwrap();

    // Assert
    let max_depth = BuildOptions::default().max_depth;
    let stats = tree.stats();
    assert!(stats.max_depth <= max_depth);
    assert!(stats.node_count <= 16 * max_depth + 1);

    let occupied: Vec<_> = tree.leaves().filter(|leaf| !leaf.is_empty()).collect();
    assert!(!occupied.is_empty());
    for leaf in occupied {
        assert_eq!(leaf.point_indices(), &[0, 1, 2]);
        assert!(leaf.is_forced());
    }
}

#[rstest]
#[case(1e12, 1e12)]
#[case(-1e15, -1e15)]
#[case(1e12, -3e14)]
#[case(4.5e15, 0.25)]
fn given_duplicates_at_large_magnitude_when_building_then_tree_stays_small(
    #[case] x: f64,
    #[case] y: f64,
) {
    testing::init_test_setup();
    // Arrange: float spacing near these coordinates is far above min_extent
    let points = vec![
        Point::new(x, y),
        Point::new(x, y),
        Point::new(x, y),
        Point::new(x + 1.0, y + 1.0),
    ];
    let options = BuildOptions::with_threshold(1);

    // Act
    let tree = QuadTree::build_with(points, &options).unwrap();

    // Assert
    let stats = tree.stats();
    assert!(stats.max_depth <= options.max_depth);
    assert!(
        stats.node_count <= 16 * options.max_depth + 1,
        "{} nodes",
        stats.node_count
    );
    assert!(tree.leaves().all(|leaf| leaf.is_forced() || leaf.len() <= 1));
    assert!(stats.forced_leaf_count >= 1);
}

#[test]
fn given_duplicates_at_large_magnitude_when_building_in_parallel_then_matches_sequential() {
    // Arrange
    let points = vec![Point::new(1e12, 1e12); 5];
    let sequential = TreeBuilder::new(BuildOptions::with_threshold(1));
    let parallel = TreeBuilder::new(BuildOptions {
        parallel: true,
        ..BuildOptions::with_threshold(1)
    });

    // Act
    let a = sequential.build(points.clone()).unwrap();
    let b = parallel.build(points).unwrap();

    // Assert
    assert_eq!(leaf_snapshot(&a), leaf_snapshot(&b));
    assert!(a.node_count() <= 16 * BuildOptions::default().max_depth + 1);
}

#[test]
fn given_many_duplicates_with_small_depth_limit_when_building_then_forced_at_limit() {
    // Arrange
    let options = BuildOptions {
        max_depth: 4,
        ..BuildOptions::with_threshold(2)
    };
    let points = vec![Point::new(0.3, 0.7); 100];

    // Act
    let tree = QuadTree::build_with(points, &options).unwrap();

    // Assert
    assert_eq!(tree.depth(), 4);
    let forced: Vec<_> = tree.leaves().filter(|leaf| leaf.is_forced()).collect();
    assert_eq!(forced.len(), 1);
    assert_eq!(forced[0].len(), 100);
    assert_eq!(forced[0].depth(), 4);
}

#[test]
fn given_point_on_both_split_lines_when_building_then_it_lands_in_every_quadrant() {
    // Arrange: root [0,4]x[0,4] splits at x=2, y=2
    let builder = TreeBuilder::new(BuildOptions::with_threshold(2));
    let points = vec![
        Point::new(2.0, 2.0),
        Point::new(0.5, 0.5),
        Point::new(3.5, 3.5),
    ];

    // Act
    let tree = builder
        .build_in(Region::new(0.0, 0.0, 4.0, 4.0), points)
        .unwrap();

    // Assert
    let leaves: Vec<_> = tree.leaves().collect();
    assert_eq!(leaves.len(), 4);
    assert!(leaves.iter().all(|leaf| leaf.point_indices().contains(&0)));
    // NW, NE, SE, SW
    assert_eq!(leaves[0].point_indices(), &[0]);
    assert_eq!(leaves[1].point_indices(), &[0, 2]);
    assert_eq!(leaves[2].point_indices(), &[0]);
    assert_eq!(leaves[3].point_indices(), &[0, 1]);
    assert_eq!(tree.stats().point_refs, 6);
}

#[test]
fn given_few_points_when_building_then_root_is_the_only_leaf() {
    let tree = QuadTree::build([(1.0, 2.0), (3.0, 5.0), (-1.0, 0.0)], 3).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.leaf_count(), 1);
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.leaves().next().unwrap().len(), 3);
}
