use enumap::EnuMap;

#[derive(EnuMap, Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Correct,
    Wrong,
    LevelUp,
}

#[test]
fn test_basic_enumap() {
    let map = CueMap {
        correct: 1,
        wrong: 2,
        level_up: 3,
    };

    assert_eq!(map.get(&Cue::Correct), &1);
    assert_eq!(map.get(&Cue::Wrong), &2);
    assert_eq!(map.get(&Cue::LevelUp), &3);
}

#[test]
fn test_enumap_mut() {
    let mut map = CueMap::<u32>::default();

    *map.get_mut(&Cue::Correct) += 5;
    *map.get_mut(&Cue::LevelUp) = 9;

    assert_eq!(map.get(&Cue::Correct), &5);
    assert_eq!(map.get(&Cue::Wrong), &0);
    assert_eq!(map.get(&Cue::LevelUp), &9);
}

#[test]
fn test_from_fn_and_map() {
    let names = CueMap::from_fn(|cue| format!("{cue:?}"));
    assert_eq!(names.level_up, "LevelUp");

    let lengths = names.map(|_, name| name.len());
    assert_eq!(lengths.get(&Cue::Correct), &7);
    assert_eq!(lengths.get(&Cue::Wrong), &5);
}

#[test]
fn test_iter_follows_declaration_order() {
    assert_eq!(Cue::VARIANTS, [Cue::Correct, Cue::Wrong, Cue::LevelUp]);

    let map = CueMap::from_fn(|cue| cue == Cue::Wrong);
    let keys: Vec<Cue> = map.iter().map(|(cue, _)| cue).collect();
    assert_eq!(keys, Cue::VARIANTS);
    assert_eq!(map.iter().filter(|(_, flagged)| **flagged).count(), 1);
}
