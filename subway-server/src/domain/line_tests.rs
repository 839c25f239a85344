//! Unit tests for the line aggregate's path maintenance.

use super::*;

fn station(n: u64) -> Station {
    Station::new(StationId::new(n), StationName::new(format!("S{n}")).unwrap())
}

fn id(n: u64) -> StationId {
    StationId::new(n)
}

fn mins(n: i64) -> TravelTime {
    TravelTime::from_minutes(n).unwrap()
}

fn km(v: f64) -> Distance {
    Distance::from_km(v).unwrap()
}

/// A line with participants `1..=n` and no sections.
fn line_with_stations(n: u64) -> Line {
    let mut line = Line::create("2호선", TimeTable::all_day(), 6).unwrap();
    for i in 1..=n {
        line.add_station(station(i)).unwrap();
    }
    line
}

fn ordered_ids(line: &Line) -> Vec<u64> {
    line.ordered_stations()
        .unwrap()
        .iter()
        .map(|s| s.id().get())
        .collect()
}

/// Micrometres in one metre.
const UM_PER_M: i64 = 1_000_000;

fn section_values(line: &Line, up: u64) -> (u64, i64, i64) {
    let s = line.section_from(id(up)).unwrap();
    (s.downstream().get(), s.duration().as_secs(), s.distance().as_micrometres() / UM_PER_M)
}

#[test]
fn create_line() {
    let line = Line::create("2호선", TimeTable::all_day(), 6).unwrap();
    assert_eq!(line.name().as_str(), "2호선");
    assert_eq!(line.interval(), 6);
    assert_eq!(line.time_table(), TimeTable::all_day());
    assert!(line.id().is_none());
    assert!(line.stations().is_empty());
    assert_eq!(line.section_count(), 0);
}

#[test]
fn create_rejects_blank_name_and_zero_interval() {
    assert_eq!(
        Line::create("  ", TimeTable::all_day(), 6).unwrap_err(),
        LineError::InvalidLine("name cannot be empty")
    );
    assert_eq!(
        Line::create("2호선", TimeTable::all_day(), 0).unwrap_err(),
        LineError::InvalidLine("interval must be positive")
    );
}

#[test]
fn add_station_does_not_link() {
    let mut line = line_with_stations(0);
    line.add_station(station(1)).unwrap();

    assert_eq!(line.stations(), &[station(1)]);
    assert_eq!(line.section_count(), 0);
    assert!(line.ordered_stations().unwrap().is_empty());
    assert_eq!(line.start_station().unwrap(), None);
}

#[test]
fn add_station_twice_is_duplicate() {
    let mut line = line_with_stations(1);
    assert_eq!(
        line.add_station(station(1)).unwrap_err(),
        LineError::DuplicateStation(id(1))
    );
    assert_eq!(line.stations().len(), 1);
}

#[test]
fn first_section_starts_path() {
    let mut line = line_with_stations(2);
    line.add_section(id(1), id(2), mins(10), km(1.5)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2]);
    assert_eq!(line.start_station().unwrap(), Some(station(1)));
    assert_eq!(line.end_station().unwrap(), Some(station(2)));
}

#[test]
fn extend_end() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(7), km(2.0)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2, 3]);
    assert_eq!(section_values(&line, 2), (3, 420, 2000));
}

#[test]
fn extend_start() {
    let mut line = line_with_stations(3);
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();
    line.add_section(id(1), id(2), mins(7), km(2.0)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2, 3]);
    assert_eq!(line.start_station().unwrap(), Some(station(1)));
}

#[test]
fn splice_after_upstream() {
    // A=1, B=2, C=3: A->C(10, 2.0) then A->B(4, 0.8)
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(3), mins(10), km(2.0)).unwrap();
    line.add_section(id(1), id(2), mins(4), km(0.8)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2, 3]);
    assert_eq!(section_values(&line, 1), (2, 240, 800));
    assert_eq!(section_values(&line, 2), (3, 360, 1200));
    assert_eq!(line.section_from(id(2)).unwrap().distance(), km(1.2));
    assert_eq!(line.section_count(), 2);
}

#[test]
fn splice_before_downstream() {
    // A->C(10, 2.0) then B->C(4, 0.8) gives A->B(6, 1.2), B->C(4, 0.8)
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(3), mins(10), km(2.0)).unwrap();
    line.add_section(id(2), id(3), mins(4), km(0.8)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2, 3]);
    assert_eq!(section_values(&line, 1), (2, 360, 1200));
    assert_eq!(section_values(&line, 2), (3, 240, 800));
}

#[test]
fn splice_in_middle_of_longer_path() {
    let mut line = line_with_stations(4);
    line.add_section(id(1), id(2), mins(10), km(2.0)).unwrap();
    line.add_section(id(2), id(3), mins(10), km(2.0)).unwrap();
    line.add_section(id(2), id(4), mins(3), km(0.5)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2, 4, 3]);
    assert_eq!(section_values(&line, 4), (3, 420, 1500));
}

#[test]
fn splice_must_be_strictly_shorter() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(3), mins(10), km(2.0)).unwrap();
    let before = line.clone();

    // Equal duration
    assert!(matches!(
        line.add_section(id(1), id(2), mins(10), km(1.0)),
        Err(LineError::InvalidSection(_))
    ));
    // Longer duration
    assert!(matches!(
        line.add_section(id(1), id(2), mins(11), km(1.0)),
        Err(LineError::InvalidSection(_))
    ));
    // Equal distance
    assert!(matches!(
        line.add_section(id(1), id(2), mins(5), km(2.0)),
        Err(LineError::InvalidSection(_))
    ));
    // Longer distance, backward splice
    assert!(matches!(
        line.add_section(id(2), id(3), mins(5), km(2.5)),
        Err(LineError::InvalidSection(_))
    ));

    assert_eq!(line, before);
}

#[test]
fn sub_metre_section_is_positive() {
    let mut line = line_with_stations(2);
    line.add_section(id(1), id(2), mins(1), km(0.0004)).unwrap();

    let section = line.section_from(id(1)).unwrap();
    assert_eq!(section.distance().as_micrometres(), 400_000);
    assert_eq!(ordered_ids(&line), vec![1, 2]);
}

#[test]
fn splice_within_a_metre_of_the_original() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(3), mins(10), km(1.0)).unwrap();
    line.add_section(id(1), id(2), mins(9), km(0.9996)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2, 3]);
    let rest = line.section_from(id(2)).unwrap();
    assert_eq!(rest.distance().as_micrometres(), 400_000);
    assert_eq!(rest.duration(), mins(1));
}

#[test]
fn non_positive_distance_rejected() {
    let mut line = line_with_stations(2);
    for d in [0.0, -1.5, 0.0004] {
        assert_eq!(
            line.add_section(id(1), id(2), mins(1), km(d)).unwrap_err(),
            LineError::InvalidSection("distance must be positive")
        );
    }
    assert_eq!(line.section_count(), 0);
}

#[test]
fn same_station_rejected() {
    let mut line = line_with_stations(1);
    assert!(matches!(
        line.add_section(id(1), id(1), mins(1), km(1.0)),
        Err(LineError::InvalidSection(_))
    ));
}

#[test]
fn unknown_station_rejected() {
    let mut line = line_with_stations(1);
    assert_eq!(
        line.add_section(id(1), id(9), mins(1), km(1.0)).unwrap_err(),
        LineError::StationNotFound(id(9))
    );
    assert_eq!(
        line.add_section(id(8), id(1), mins(1), km(1.0)).unwrap_err(),
        LineError::StationNotFound(id(8))
    );
}

#[test]
fn duplicate_section_rejected() {
    let mut line = line_with_stations(2);
    line.add_section(id(1), id(2), mins(10), km(2.0)).unwrap();
    assert_eq!(
        line.add_section(id(1), id(2), mins(4), km(1.0)).unwrap_err(),
        LineError::InvalidSection("section already exists")
    );
}

#[test]
fn second_component_rejected() {
    let mut line = line_with_stations(4);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    assert!(matches!(
        line.add_section(id(3), id(4), mins(5), km(1.0)),
        Err(LineError::InvalidSection(_))
    ));
    assert_eq!(ordered_ids(&line), vec![1, 2]);
}

#[test]
fn cycle_rejected() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();
    let before = line.clone();

    assert!(matches!(
        line.add_section(id(3), id(1), mins(5), km(1.0)),
        Err(LineError::InvalidSection(_))
    ));
    assert_eq!(line, before);
}

#[test]
fn shortcut_across_path_rejected() {
    // 1->2->3: 1->3 would give 1 two outgoing sections and 3 two incoming
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();

    assert_eq!(
        line.add_section(id(1), id(3), mins(1), km(0.1)).unwrap_err(),
        LineError::InvalidSection("both stations are already linked in this direction")
    );
}

#[test]
fn splice_with_linked_station_rejected() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();
    let before = line.clone();

    // 2 -> 1: 2 has an outgoing section, 1 already starts the path
    assert!(matches!(
        line.add_section(id(2), id(1), mins(1), km(0.1)),
        Err(LineError::InvalidSection(_))
    ));
    // 3 -> 2: 2 has an incoming section, 3 already ends the path
    assert!(matches!(
        line.add_section(id(3), id(2), mins(1), km(0.1)),
        Err(LineError::InvalidSection(_))
    ));
    assert_eq!(line, before);
}

#[test]
fn delete_middle_station_merges_sections() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(30), km(1.5)).unwrap();
    line.add_section(id(2), id(3), mins(30), km(1.5)).unwrap();

    line.delete_station(id(2)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 3]);
    let merged = line.section_from(id(1)).unwrap();
    assert_eq!(merged.downstream(), id(3));
    assert_eq!(merged.duration(), mins(60));
    assert_eq!(merged.distance(), km(3.0));
    assert!(!line.contains_station(id(2)));
}

#[test]
fn delete_with_wall_clock_durations() {
    let mut line = line_with_stations(3);
    let duration = TravelTime::parse("01:01").unwrap();
    line.add_section(id(1), id(2), duration, km(1.5)).unwrap();
    line.add_section(id(2), id(3), duration, km(1.5)).unwrap();

    line.delete_station(id(2)).unwrap();

    assert_eq!(
        line.ordered_stations().unwrap(),
        vec![station(1), station(3)]
    );
    assert_eq!(
        line.section_from(id(1)).unwrap().duration(),
        TravelTime::parse("02:02").unwrap()
    );
}

#[test]
fn delete_start_station() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();

    line.delete_station(id(1)).unwrap();

    assert_eq!(ordered_ids(&line), vec![2, 3]);
    assert_eq!(line.section_count(), 1);
}

#[test]
fn delete_end_station() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();

    line.delete_station(id(3)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2]);
}

#[test]
fn delete_last_section_leaves_empty_path() {
    let mut line = line_with_stations(2);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();

    line.delete_station(id(2)).unwrap();

    assert_eq!(line.section_count(), 0);
    assert!(line.ordered_stations().unwrap().is_empty());
    assert_eq!(line.start_station().unwrap(), None);
    assert_eq!(line.stations(), &[station(1)]);
}

#[test]
fn delete_unlinked_station() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();

    line.delete_station(id(3)).unwrap();

    assert_eq!(ordered_ids(&line), vec![1, 2]);
    assert_eq!(line.stations().len(), 2);
}

#[test]
fn delete_unknown_station() {
    let mut line = line_with_stations(2);
    let before = line.clone();
    assert_eq!(
        line.delete_station(id(7)).unwrap_err(),
        LineError::StationNotFound(id(7))
    );
    assert_eq!(line, before);
}

#[test]
fn splice_then_delete_restores_original() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(3), mins(10), km(2.0)).unwrap();
    let original = *line.section_from(id(1)).unwrap();

    line.add_section(id(1), id(2), mins(4), km(0.8)).unwrap();
    line.delete_station(id(2)).unwrap();

    assert_eq!(*line.section_from(id(1)).unwrap(), original);
}

#[test]
fn reads_are_idempotent() {
    let mut line = line_with_stations(4);
    line.add_section(id(3), id(4), mins(5), km(1.0)).unwrap();
    line.add_section(id(2), id(3), mins(5), km(1.0)).unwrap();
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();

    let first = line.ordered_stations().unwrap();
    let second = line.ordered_stations().unwrap();
    assert_eq!(first, second);
    assert_eq!(ordered_ids(&line), vec![1, 2, 3, 4]);
}

#[test]
fn sections_in_path_order() {
    let mut line = line_with_stations(3);
    line.add_section(id(2), id(3), mins(2), km(0.2)).unwrap();
    line.add_section(id(1), id(2), mins(1), km(0.1)).unwrap();

    let sections = line.sections().unwrap();
    let pairs: Vec<_> = sections
        .iter()
        .map(|s| (s.upstream().get(), s.downstream().get()))
        .collect();
    assert_eq!(pairs, vec![(1, 2), (2, 3)]);
}

#[test]
fn clear_stations_removes_everything() {
    let mut line = line_with_stations(3);
    line.add_section(id(1), id(2), mins(5), km(1.0)).unwrap();

    line.clear_stations();

    assert!(line.stations().is_empty());
    assert_eq!(line.section_count(), 0);
    assert!(line.ordered_stations().unwrap().is_empty());
}

#[test]
fn restore_valid_line() {
    let line = Line::restore(
        LineId::new(4),
        "4호선",
        TimeTable::all_day(),
        5,
        vec![station(1), station(2), station(3)],
        vec![
            (id(2), id(3), mins(2), km(0.5)),
            (id(1), id(2), mins(3), km(0.7)),
        ],
    )
    .unwrap();

    assert_eq!(line.id(), Some(LineId::new(4)));
    assert_eq!(ordered_ids(&line), vec![1, 2, 3]);
}

#[test]
fn restore_rejects_broken_graphs() {
    let stations = || vec![station(1), station(2), station(3), station(4)];
    let restore = |sections: Vec<(StationId, StationId, TravelTime, Distance)>| {
        Line::restore(
            LineId::new(1),
            "1호선",
            TimeTable::all_day(),
            5,
            stations(),
            sections,
        )
    };

    // Cycle
    assert!(matches!(
        restore(vec![
            (id(1), id(2), mins(1), km(1.0)),
            (id(2), id(1), mins(1), km(1.0)),
        ]),
        Err(LineError::InvalidGraphState(_))
    ));
    // Branch
    assert!(matches!(
        restore(vec![
            (id(1), id(2), mins(1), km(1.0)),
            (id(1), id(3), mins(1), km(1.0)),
        ]),
        Err(LineError::InvalidGraphState(_))
    ));
    // Two components
    assert!(matches!(
        restore(vec![
            (id(1), id(2), mins(1), km(1.0)),
            (id(3), id(4), mins(1), km(1.0)),
        ]),
        Err(LineError::InvalidGraphState(_))
    ));
    // Path plus a detached cycle
    assert!(matches!(
        restore(vec![
            (id(1), id(2), mins(1), km(1.0)),
            (id(3), id(4), mins(1), km(1.0)),
            (id(4), id(3), mins(1), km(1.0)),
        ]),
        Err(LineError::InvalidGraphState(_))
    ));
    // Unknown station
    assert!(matches!(
        restore(vec![(id(1), id(9), mins(1), km(1.0))]),
        Err(LineError::InvalidGraphState(_))
    ));
    // Self loop
    assert!(matches!(
        restore(vec![(id(1), id(1), mins(1), km(1.0))]),
        Err(LineError::InvalidGraphState(_))
    ));
    // Non-positive distance
    assert!(matches!(
        restore(vec![(id(1), id(2), mins(1), km(0.0))]),
        Err(LineError::InvalidGraphState(_))
    ));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    const STATIONS: u64 = 6;

    #[derive(Debug, Clone)]
    enum Op {
        AddSection {
            up: u64,
            down: u64,
            secs: i64,
            um: i64,
        },
        Delete(u64),
        AddStation(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (1..=STATIONS + 1, 1..=STATIONS + 1, 0i64..3600, -100i64..5000)
                .prop_map(|(up, down, secs, um)| Op::AddSection { up, down, secs, um }),
            1 => (1..=STATIONS + 1).prop_map(Op::Delete),
            1 => (1..=STATIONS + 1).prop_map(Op::AddStation),
        ]
    }

    fn apply(line: &mut Line, op: &Op) -> Result<(), LineError> {
        match *op {
            Op::AddSection {
                up,
                down,
                secs,
                um,
            } => line.add_section(
                id(up),
                id(down),
                TravelTime::from_secs(secs).unwrap(),
                Distance::from_micrometres(um),
            ),
            Op::Delete(n) => line.delete_station(id(n)),
            Op::AddStation(n) => line.add_station(station(n)),
        }
    }

    fn total_distance(line: &Line) -> i64 {
        line.sections()
            .unwrap()
            .iter()
            .map(|s| s.distance().as_micrometres())
            .sum()
    }

    fn assert_path_invariants(line: &Line) -> Result<(), TestCaseError> {
        let ordered = line.ordered_stations().unwrap();
        let sections = line.sections().unwrap();

        if sections.is_empty() {
            prop_assert!(ordered.is_empty());
        } else {
            prop_assert_eq!(ordered.len(), sections.len() + 1);
        }
        prop_assert_eq!(sections.len(), line.section_count());

        let mut seen = std::collections::HashSet::new();
        for s in &ordered {
            prop_assert!(seen.insert(s.id()), "station {} repeated", s.id());
            prop_assert!(line.contains_station(s.id()));
        }

        for (pair, section) in ordered.windows(2).zip(&sections) {
            prop_assert_eq!(section.upstream(), pair[0].id());
            prop_assert_eq!(section.downstream(), pair[1].id());
            prop_assert!(section.distance().is_positive());
        }
        Ok(())
    }

    proptest! {
        /// Any sequence of operations keeps a single path, and failed
        /// operations change nothing
        #[test]
        fn operations_preserve_invariants(ops in prop::collection::vec(op(), 0..40)) {
            let mut line = line_with_stations(STATIONS);
            for op in &ops {
                let before = line.clone();
                match apply(&mut line, op) {
                    Ok(()) => {
                        // Splicing never changes the overall length of the path
                        if let Op::AddSection { up, down, .. } = op {
                            let spliced = before.section_from(id(*up)).is_some()
                                || before.section_into(id(*down)).is_some();
                            if spliced {
                                prop_assert_eq!(total_distance(&line), total_distance(&before));
                            }
                        }
                    }
                    Err(_) => {
                        prop_assert_eq!(&line, &before);
                    }
                }
                assert_path_invariants(&line)?;
            }
        }

        /// Splicing a station into any section and deleting it again
        /// restores the line exactly
        #[test]
        fn splice_then_delete_roundtrip(
            weights in prop::collection::vec((1i64..3600, 2i64..5000), 1..6),
            pick in any::<prop::sample::Index>(),
            split in 1u32..100,
            backward in any::<bool>(),
        ) {
            let n = weights.len() as u64 + 1;
            let mut line = line_with_stations(n);
            for (i, (secs, um)) in weights.iter().enumerate() {
                let up = i as u64 + 1;
                line.add_section(
                    id(up),
                    id(up + 1),
                    TravelTime::from_secs(*secs).unwrap(),
                    Distance::from_micrometres(*um),
                )
                .unwrap();
            }
            line.add_station(station(100)).unwrap();
            let original = line.clone();

            let edge = line.sections().unwrap()[pick.index(weights.len())];
            let secs = edge.duration().as_secs() * i64::from(split) / 100;
            let um = edge.distance().as_micrometres() * i64::from(split) / 100;
            prop_assume!(secs < edge.duration().as_secs());
            prop_assume!(um > 0 && um < edge.distance().as_micrometres());

            let duration = TravelTime::from_secs(secs).unwrap();
            let distance = Distance::from_micrometres(um);
            if backward {
                line.add_section(id(100), edge.downstream(), duration, distance).unwrap();
            } else {
                line.add_section(edge.upstream(), id(100), duration, distance).unwrap();
            }
            prop_assert_eq!(line.section_count(), original.section_count() + 1);

            line.delete_station(id(100)).unwrap();
            line.add_station(station(100)).unwrap();
            prop_assert_eq!(line, original);
        }
    }
}
