use dungeon_procgen::{
    BossPolicy, Corner, Dungeon, DungeonDefinition, Floor, FloorSize, GridPoint, MazeParams,
    SizeRange, StartPolicy,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, VecDeque};
use std::thread;

fn reachable_from_start(floor: &Floor) -> BTreeSet<GridPoint> {
    let mut seen = BTreeSet::from([floor.start()]);
    let mut open = VecDeque::from([floor.start()]);
    while let Some(p) = open.pop_front() {
        for dir in floor.cell(p).unwrap().links.iter() {
            let next = floor
                .extent()
                .neighbor(p, dir)
                .expect("passages never leave the grid");
            if floor.cell(next).map_or(false, |c| c.visited) && seen.insert(next) {
                open.push_back(next);
            }
        }
    }

    seen
}

fn assert_floor_is_sound(floor: &Floor) {
    let visited: BTreeSet<_> = floor.visited_cells().map(|(p, _)| p).collect();
    for p in visited.iter() {
        assert!(p.x < floor.width() && p.y < floor.height());
    }
    assert!(visited.contains(&floor.start()));
    assert!(visited.contains(&floor.end()));
    assert_ne!(floor.start(), floor.end());

    let reached = reachable_from_start(floor);
    assert_eq!(reached, visited);
}

// Never samples a single-cell floor.
fn definition(floors: usize, params: MazeParams) -> DungeonDefinition {
    DungeonDefinition {
        maze: params,
        ..DungeonDefinition::new(
            floors,
            FloorSize {
                width: SizeRange { min: 1, max: 14 },
                height: SizeRange { min: 2, max: 11 },
            },
        )
    }
}

fn any_params() -> impl Strategy<Value = MazeParams> {
    let start = prop_oneof![
        Just(StartPolicy::RandomEdge),
        Just(StartPolicy::Random),
        Just(StartPolicy::Fixed { x: 0, y: 0 }),
        Just(StartPolicy::Corner(Corner::BottomLeft)),
        Just(StartPolicy::Corner(Corner::BottomRight)),
        Just(StartPolicy::Corner(Corner::TopLeft)),
        Just(StartPolicy::Corner(Corner::TopRight)),
    ];
    let boss = prop_oneof![
        Just(BossPolicy::LastCarved),
        Just(BossPolicy::Farthest),
        Just(BossPolicy::CornerSeeking),
        Just(BossPolicy::CenterSeeking),
    ];
    (start, boss, 0u32..=100, 0u32..=100, 0u32..=100).prop_map(
        |(start, boss, coverage_percent, branch_percent, straight_percent)| MazeParams {
            start,
            boss,
            coverage_percent,
            branch_percent,
            straight_percent,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn generated_floors_are_connected_and_in_bounds(
        seed in any::<u32>(),
        params in any_params(),
        width in 1u32..=14,
        height in 1u32..=11,
    ) {
        let definition = DungeonDefinition {
            maze: params,
            ..DungeonDefinition::new(3, FloorSize::fixed(width, height))
        };
        match definition.generate("prop", seed) {
            Ok(dungeon) => {
                prop_assert!(width * height >= 2);
                for floor in dungeon.floors() {
                    prop_assert_eq!((floor.width(), floor.height()), (width, height));
                    assert_floor_is_sound(floor);
                    prop_assert_eq!(floor.check(), Ok(()));
                }
            }
            Err(err) => {
                prop_assert_eq!((width, height), (1, 1));
                prop_assert!(err.is_layout_too_small());
            }
        }
    }

    #[test]
    fn same_seed_gives_identical_bytes(seed in any::<u32>(), params in any_params()) {
        let definition = definition(2, params);
        let a = definition.generate("a", seed).unwrap();
        let b = definition.generate("b", seed).unwrap();
        prop_assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        prop_assert_eq!(a.floors(), b.floors());
    }
}

#[test]
fn floors_of_one_dungeon_differ() {
    let definition = DungeonDefinition::new(5, FloorSize::fixed(9, 6));
    for seed in [1u32, 370545889, 0xDEAD_BEEF] {
        let dungeon = definition.generate("depths", seed).unwrap();
        let layouts: BTreeSet<_> = dungeon.floors().iter().map(|f| f.render()).collect();
        assert_eq!(layouts.len(), 5, "seed {} repeated a floor", seed);
    }
}

#[test]
fn different_seeds_give_different_dungeons() {
    let definition = DungeonDefinition::new(1, FloorSize::fixed(9, 6));
    let a = definition.generate("x", 1).unwrap();
    let b = definition.generate("x", 2).unwrap();
    assert_ne!(a.canonical_bytes(), b.canonical_bytes());
}

#[test]
fn concurrent_generations_agree() {
    let definition = DungeonDefinition::new(4, FloorSize::fixed(12, 9));
    let expected: Vec<Dungeon> = (0..8u32)
        .map(|seed| definition.generate("threads", seed).unwrap())
        .collect();

    let results: Vec<Dungeon> = thread::scope(|s| {
        let handles: Vec<_> = (0..8u32)
            .map(|seed| {
                let definition = &definition;
                s.spawn(move || definition.generate("threads", seed).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, expected);
}

#[test]
fn one_wide_floors_run_along_their_axis() {
    for (width, height) in [(1u32, 7u32), (7, 1), (1, 2)] {
        for seed in 0..50u32 {
            let dungeon = DungeonDefinition::new(2, FloorSize::fixed(width, height))
                .generate("corridor", seed)
                .unwrap();
            for floor in dungeon.floors() {
                assert_floor_is_sound(floor);
                for (_, cell) in floor.visited_cells() {
                    assert!(cell.links.count() <= 2);
                }
            }
        }
    }
}

#[test]
fn single_cell_floor_is_rejected() {
    let definition = DungeonDefinition::new(1, FloorSize::fixed(1, 1));
    let err = definition.generate("tiny", 370545889).unwrap_err();
    assert!(err.is_layout_too_small());
    assert_eq!(err.floor_index(), Some(0));
}
