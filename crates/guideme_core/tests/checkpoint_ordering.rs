use guideme_core::{Checkpoint, TourRepository, TourStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

fn names(checkpoints: &[Checkpoint]) -> Vec<(&str, i64)> {
    checkpoints
        .iter()
        .map(|checkpoint| (checkpoint.name.as_str(), checkpoint.order))
        .collect()
}

fn assert_contiguous(store: &TourStore, tour_id: i64) {
    let orders = store
        .list_checkpoints(tour_id)
        .into_iter()
        .map(|checkpoint| checkpoint.order)
        .collect::<Vec<_>>();
    let expected = (0..orders.len() as i64).collect::<Vec<_>>();
    assert_eq!(orders, expected, "tour {tour_id} ranks must be 0..n");
}

#[test]
fn gdansk_walkthrough_reorders_and_closes_gaps() {
    let store = TourStore::in_memory();
    let tour = store.create_tour("Gdańsk").unwrap();
    assert_eq!(tour.id, 1);

    let a = store.create_checkpoint(tour.id, "A").unwrap();
    let b = store.create_checkpoint(tour.id, "B").unwrap();
    let c = store.create_checkpoint(tour.id, "C").unwrap();
    assert_eq!((a.order, b.order, c.order), (0, 1, 2));

    assert!(store.move_after(a.id, c.id).unwrap());
    assert_eq!(
        names(&store.list_checkpoints(tour.id)),
        vec![("B", 0), ("C", 1), ("A", 2)]
    );

    assert!(store.delete_checkpoint(b.id).unwrap());
    assert_eq!(
        names(&store.list_checkpoints(tour.id)),
        vec![("C", 0), ("A", 1)]
    );
}

#[test]
fn first_checkpoint_of_a_tour_gets_order_zero() {
    let store = TourStore::in_memory();
    let first = store.create_tour("First").unwrap();
    let second = store.create_tour("Second").unwrap();

    store.create_checkpoint(first.id, "x").unwrap();
    store.create_checkpoint(first.id, "y").unwrap();
    let other = store.create_checkpoint(second.id, "z").unwrap();

    assert_eq!(other.order, 0);
    let next = store.create_checkpoint(first.id, "w").unwrap();
    assert_eq!(next.order, 2);
}

#[test]
fn move_before_then_after_restores_adjacency() {
    let store = TourStore::in_memory();
    let tour = store.create_tour("Old Town").unwrap();
    let ids = ["A", "B", "C", "D"]
        .iter()
        .map(|name| store.create_checkpoint(tour.id, name).unwrap().id)
        .collect::<Vec<_>>();
    let (a, c) = (ids[0], ids[2]);

    assert!(store.move_before(a, c).unwrap());
    assert_eq!(
        names(&store.list_checkpoints(tour.id)),
        vec![("B", 0), ("A", 1), ("C", 2), ("D", 3)]
    );

    assert!(store.move_after(a, c).unwrap());
    assert_eq!(
        names(&store.list_checkpoints(tour.id)),
        vec![("B", 0), ("C", 1), ("A", 2), ("D", 3)]
    );
}

#[test]
fn move_across_tours_is_rejected_without_changes() {
    let store = TourStore::in_memory();
    let north = store.create_tour("North").unwrap();
    let south = store.create_tour("South").unwrap();
    let n1 = store.create_checkpoint(north.id, "n1").unwrap();
    store.create_checkpoint(north.id, "n2").unwrap();
    let s1 = store.create_checkpoint(south.id, "s1").unwrap();
    store.create_checkpoint(south.id, "s2").unwrap();

    let north_before = store.list_checkpoints(north.id);
    let south_before = store.list_checkpoints(south.id);

    assert!(!store.move_before(n1.id, s1.id).unwrap());
    assert!(!store.move_after(s1.id, n1.id).unwrap());

    assert_eq!(store.list_checkpoints(north.id), north_before);
    assert_eq!(store.list_checkpoints(south.id), south_before);
}

#[test]
fn move_with_unknown_ids_is_rejected() {
    let store = TourStore::in_memory();
    let tour = store.create_tour("T").unwrap();
    let a = store.create_checkpoint(tour.id, "A").unwrap();

    assert!(!store.move_before(a.id, 999).unwrap());
    assert!(!store.move_after(999, a.id).unwrap());
}

#[test]
fn move_onto_itself_is_accepted_as_no_op() {
    let store = TourStore::in_memory();
    let tour = store.create_tour("T").unwrap();
    let a = store.create_checkpoint(tour.id, "A").unwrap();
    store.create_checkpoint(tour.id, "B").unwrap();

    assert!(store.move_before(a.id, a.id).unwrap());
    assert!(store.move_after(a.id, a.id).unwrap());
    assert_eq!(
        names(&store.list_checkpoints(tour.id)),
        vec![("A", 0), ("B", 1)]
    );
}

#[test]
fn ranks_stay_contiguous_through_mixed_operations() {
    let store = TourStore::in_memory();
    let tour = store.create_tour("Mixed").unwrap();
    let mut live = Vec::new();

    // Deterministic operation mix driven by a small linear congruential sequence.
    let mut seed: u64 = 0x5eed;
    for step in 0..200 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let roll = (seed >> 33) as usize;
        match roll % 4 {
            0 | 1 if live.len() < 12 => {
                let created = store
                    .create_checkpoint(tour.id, &format!("cp-{step}"))
                    .unwrap();
                live.push(created.id);
            }
            2 if !live.is_empty() => {
                let victim = live.remove(roll % live.len());
                assert!(store.delete_checkpoint(victim).unwrap());
            }
            _ if live.len() >= 2 => {
                let mover = live[roll % live.len()];
                let target = live[(roll / 7) % live.len()];
                let moved = if roll % 2 == 0 {
                    store.move_before(mover, target).unwrap()
                } else {
                    store.move_after(mover, target).unwrap()
                };
                assert!(moved);
            }
            _ => {}
        }
        assert_contiguous(&store, tour.id);
        assert_eq!(store.list_checkpoints(tour.id).len(), live.len());
    }
}

#[test]
fn deleting_a_tour_cascades_to_its_checkpoints() {
    let store = TourStore::in_memory();
    let doomed = store.create_tour("Doomed").unwrap();
    let kept = store.create_tour("Kept").unwrap();
    let lost = store.create_checkpoint(doomed.id, "lost").unwrap();
    store.create_checkpoint(kept.id, "kept").unwrap();

    assert!(store.delete_tour(doomed.id).unwrap());
    assert!(store.list_checkpoints(doomed.id).is_empty());
    assert!(store.get_checkpoint(lost.id).is_none());
    assert_eq!(store.list_checkpoints(kept.id).len(), 1);
    assert!(store.get_tour(doomed.id).is_none());

    assert!(!store.delete_tour(doomed.id).unwrap());
}

#[test]
fn checkpoints_may_reference_unknown_tours() {
    let store = TourStore::in_memory();
    let orphan = store.create_checkpoint(42, "stray").unwrap();
    assert_eq!(orphan.order, 0);
    assert_eq!(store.list_checkpoints(42), vec![orphan]);

    // Deleting the unknown tour still sweeps its orphans.
    assert!(!store.delete_tour(42).unwrap());
    assert!(store.list_checkpoints(42).is_empty());
}

#[test]
fn ids_are_never_reused_after_deletion() {
    let store = TourStore::in_memory();
    let first = store.create_tour("one").unwrap();
    let cp = store.create_checkpoint(first.id, "cp").unwrap();
    assert!(store.delete_checkpoint(cp.id).unwrap());
    assert!(store.delete_tour(first.id).unwrap());

    let second = store.create_tour("two").unwrap();
    let next_cp = store.create_checkpoint(second.id, "cp").unwrap();
    assert!(second.id > first.id);
    assert!(next_cp.id > cp.id);
}

#[test]
fn tours_are_listed_by_id_and_accept_empty_names() {
    let store = TourStore::in_memory();
    let blank = store.create_tour("").unwrap();
    let named = store.create_tour("Named").unwrap();
    store.create_tour("Third").unwrap();
    assert!(store.delete_tour(named.id).unwrap());

    let listed = store
        .list_tours()
        .into_iter()
        .map(|tour| tour.id)
        .collect::<Vec<_>>();
    assert_eq!(listed, vec![blank.id, named.id + 1]);
    assert_eq!(store.get_tour(blank.id).unwrap().name, "");
}

#[test]
fn location_updates_set_and_clear_both_coordinates() {
    let store = TourStore::in_memory();
    let tour = store.create_tour("Map").unwrap();
    let crane = store.create_checkpoint(tour.id, "Crane").unwrap();

    assert!(store.update_location(crane.id, 54.3503, 18.6571).unwrap());
    let located = store.get_checkpoint(crane.id).unwrap();
    assert_eq!(located.location(), Some((54.3503, 18.6571)));

    // No range validation on coordinates.
    assert!(store.update_location(crane.id, 500.0, -900.0).unwrap());

    assert!(store.clear_location(crane.id).unwrap());
    let cleared = store.get_checkpoint(crane.id).unwrap();
    assert_eq!((cleared.latitude, cleared.longitude), (None, None));

    assert!(!store.update_location(999, 1.0, 2.0).unwrap());
    assert!(!store.clear_location(999).unwrap());
}

#[test]
fn concurrent_creation_keeps_ids_unique_and_ranks_contiguous() {
    let store = Arc::new(TourStore::in_memory());
    let tour_id = store.create_tour("Busy").unwrap().id;

    let workers = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..25)
                    .map(|index| {
                        store
                            .create_checkpoint(tour_id, &format!("w{worker}-{index}"))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    let mut ids = BTreeSet::new();
    for worker in workers {
        for id in worker.join().unwrap() {
            assert!(ids.insert(id), "checkpoint id {id} assigned twice");
        }
    }

    assert_eq!(ids.len(), 200);
    assert_contiguous(&store, tour_id);
}
