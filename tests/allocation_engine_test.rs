// ==========================================
// 座位分配引擎集成测试
// ==========================================
// 测试目标: 验证分配结果的完整性与约束
// 覆盖范围: 完整性、容量、大考场优先、中心一致、确定性、随机模式占用不变
// ==========================================

mod test_helpers;

use exam_seating::domain::{AllocationMode, AllocationRun, Candidate, RoomInventory, RoomType};
use exam_seating::engine::{AllocationError, AllocationOrchestrator, ValidationIssue};
use std::collections::{HashMap, HashSet};
use test_helpers::{candidate, example_inventory, multi_center_inventory, roster};

// ==========================================
// 测试辅助函数
// ==========================================

fn mixed_roster() -> Vec<Candidate> {
    let mut all = roster(12, "ibn sina");
    all.extend(
        roster(9, "Collège Al Amal")
            .into_iter()
            .map(|mut c| {
                c.code = format!("B{}", c.code);
                c
            }),
    );
    all
}

fn run(mode: AllocationMode, seed: Option<u64>) -> AllocationRun {
    AllocationOrchestrator::default()
        .run(&mixed_roster(), &multi_center_inventory(), mode, seed)
        .unwrap()
}

fn occupancy_map(run: &AllocationRun) -> HashMap<(String, String), u32> {
    run.occupancy
        .iter()
        .map(|o| ((o.center.clone(), o.room.clone()), o.occupied))
        .collect()
}

// ==========================================
// 性质测试
// ==========================================

#[test]
fn test_every_candidate_placed_exactly_once() {
    for mode in [AllocationMode::Priority, AllocationMode::Random] {
        let run = run(mode, Some(3));
        let roster = mixed_roster();

        assert_eq!(run.assignments.len(), roster.len());
        let codes: HashSet<&str> = run.assignments.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes.len(), roster.len());
        for c in &roster {
            assert!(codes.contains(c.code.as_str()), "考生 {} 未分配", c.code);
        }
    }
}

#[test]
fn test_capacity_respected_and_seats_contiguous() {
    let inventory = multi_center_inventory();
    let run = run(AllocationMode::Random, Some(11));

    let mut seats: HashMap<(String, String), Vec<u32>> = HashMap::new();
    for a in &run.assignments {
        seats
            .entry((a.center.clone(), a.room.clone()))
            .or_default()
            .push(a.seat_number);
    }

    for ((center, room), mut numbers) in seats {
        let id = inventory.find_room(&center, &room).unwrap();
        let capacity = inventory.room(id).capacity;
        numbers.sort_unstable();
        assert!(numbers.len() as u32 <= capacity);
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected, "{}/{} 座位号不连续", center, room);
    }
}

#[test]
fn test_grande_rooms_full_before_any_petite_used() {
    for mode in [AllocationMode::Priority, AllocationMode::Random] {
        let run = run(mode, Some(5));

        for center in ["Lycée Ibn Sina", "Collège Al Amal"] {
            let rooms: Vec<_> = run.occupancy.iter().filter(|o| o.center == center).collect();
            let petite_used = rooms
                .iter()
                .any(|o| o.room_type == RoomType::Petite && o.occupied > 0);
            if petite_used {
                assert!(rooms
                    .iter()
                    .filter(|o| o.room_type == RoomType::Grande)
                    .all(|o| o.occupied == o.capacity));
            }
        }
    }
}

#[test]
fn test_assignment_center_matches_resolved_label() {
    let run = run(AllocationMode::Priority, None);
    for a in &run.assignments {
        if a.code.starts_with('B') {
            assert_eq!(a.center, "Collège Al Amal");
        } else {
            assert_eq!(a.center, "Lycée Ibn Sina");
        }
    }
}

#[test]
fn test_priority_mode_is_deterministic_and_sorted() {
    let a = run(AllocationMode::Priority, None);
    let b = run(AllocationMode::Priority, None);
    assert_eq!(a.assignments, b.assignments);

    let labels: HashMap<String, String> = mixed_roster()
        .into_iter()
        .map(|c| (c.code.clone(), c.exam_center.unwrap_or_default()))
        .collect();
    let keys: Vec<_> = a
        .assignments
        .iter()
        .map(|s| {
            (
                labels[&s.code].clone(),
                s.region.clone(),
                s.province.clone(),
                s.language.clone(),
                s.last_name.clone(),
                s.first_name.clone(),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_random_mode_occupancy_is_seed_independent() {
    let baseline = occupancy_map(&run(AllocationMode::Random, Some(1)));
    for seed in [2, 3, 99, 12345] {
        assert_eq!(occupancy_map(&run(AllocationMode::Random, Some(seed))), baseline);
    }
    assert_eq!(occupancy_map(&run(AllocationMode::Random, None)), baseline);
    assert_eq!(occupancy_map(&run(AllocationMode::Priority, None)), baseline);
}

// ==========================================
// 示例场景
// ==========================================

#[test]
fn test_example_scenario_three_candidates() {
    let roster = vec![
        candidate("1", "Alami", "R", "A"),
        candidate("2", "Bennani", "R", "A"),
        candidate("3", "Chraibi", "R", "A"),
    ];

    let run = AllocationOrchestrator::default()
        .run(&roster, &example_inventory(), AllocationMode::Priority, None)
        .unwrap();

    let placed: Vec<(&str, &str, u32)> = run
        .assignments
        .iter()
        .map(|a| (a.code.as_str(), a.room.as_str(), a.seat_number))
        .collect();
    assert_eq!(placed, vec![("1", "R1", 1), ("2", "R1", 2), ("3", "R2", 1)]);
    assert!(run.assignments.iter().all(|a| a.center == "A"));
}

#[test]
fn test_fourth_candidate_rejected_before_allocation() {
    let roster = vec![
        candidate("1", "Alami", "R", "A"),
        candidate("2", "Bennani", "R", "A"),
        candidate("3", "Chraibi", "R", "A"),
        candidate("4", "Daoudi", "R", "A"),
    ];

    let err = AllocationOrchestrator::default()
        .run(&roster, &example_inventory(), AllocationMode::Priority, None)
        .unwrap_err();

    match err {
        AllocationError::Validation(report) => {
            assert!(report.has(|i| matches!(
                i,
                ValidationIssue::InsufficientCapacity { center: None, capacity: 3, required: 4 }
            )));
        }
        other => panic!("期望校验失败，实际: {other}"),
    }
}

#[test]
fn test_validation_reports_all_issues_at_once() {
    let inventory = RoomInventory::new(
        vec!["Vide".to_string()],
        example_inventory().rooms().to_vec(),
    );
    let mut blank = candidate("2", "Bennani", "R", "A");
    blank.exam_center = Some("  ".to_string());
    let roster = vec![
        candidate("1", "Alami", "R", "A"),
        blank,
        candidate("3", "Chraibi", "R", "Inconnu"),
        candidate("4", "Daoudi", "R", "Vide"),
    ];

    let err = AllocationOrchestrator::default()
        .run(&roster, &inventory, AllocationMode::Random, Some(1))
        .unwrap_err();
    let AllocationError::Validation(report) = err else {
        panic!("期望校验失败");
    };

    assert!(report.has(|i| matches!(i, ValidationIssue::UnassignedCenter { code } if code == "2")));
    assert!(report.has(|i| matches!(i, ValidationIssue::UnresolvedCenter(_))));
    assert!(report.has(|i| matches!(i, ValidationIssue::EmptyCenter { center } if center == "Vide")));
}
