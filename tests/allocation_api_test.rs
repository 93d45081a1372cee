// ==========================================
// 分配 API 端到端测试
// ==========================================
// 测试目标: 导入 → 分配 → 持久化 → 导出 的完整链路
// 覆盖范围: 失败不落库、结果整体替换、配置默认值、歧义策略
// ==========================================

mod test_helpers;

use exam_seating::api::ApiError;
use exam_seating::app::AppState;
use exam_seating::config::config_keys;
use exam_seating::domain::AllocationMode;
use exam_seating::engine::ValidationIssue;
use test_helpers::{create_test_db, write_csv};

const ROSTER_HEADER: &str = "Code,LastName,FirstName,region,province,centreExamen,langues,Genre";
const ROOMS_HEADER: &str = "center,name,capacity,type,climatise,camera";

async fn setup(roster: &[&str], rooms: &[&str]) -> (tempfile::NamedTempFile, AppState) {
    let (db_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let roster_file = write_csv(roster);
    let rooms_file = write_csv(rooms);

    state
        .import_api
        .import_candidates(&roster_file.path().to_string_lossy())
        .await
        .unwrap();
    state
        .import_api
        .import_rooms(&rooms_file.path().to_string_lossy(), false)
        .await
        .unwrap();

    (db_file, state)
}

async fn standard_setup() -> (tempfile::NamedTempFile, AppState) {
    setup(
        &[
            ROSTER_HEADER,
            "C1,Alami,Sara,Rabat-Salé,Rabat,Ibn Sina,AR,F",
            "C2,Bennani,Omar,Rabat-Salé,Rabat,Ibn Sina,FR,M",
            "C3,Chraibi,Nadia,Fès-Meknès,Fès,Al Amal,FR,F",
            "C4,Daoudi,Youssef,Rabat-Salé,Salé,ibn sina,AR/FR,M",
        ],
        &[
            ROOMS_HEADER,
            "Lycée Ibn Sina,S1,2,Petite,Oui,Non",
            "Lycée Ibn Sina,S2,2,Grande,Non,Oui",
            "Collège Al Amal,S1,5,Grande,Non,Non",
        ],
    )
    .await
}

#[tokio::test]
async fn test_full_flow_persists_and_exports() {
    let (_db, state) = standard_setup().await;

    let run = state
        .allocation_api
        .allocate(Some(AllocationMode::Random), Some(42))
        .await
        .unwrap();
    assert_eq!(run.candidate_count(), 4);

    let stored = state.allocation_api.last_run().unwrap().unwrap();
    assert_eq!(stored.run_id, run.run_id);
    assert_eq!(stored.assignments, run.assignments);

    // Grande S2 先满，再用 Petite S1
    let ibn_sina: Vec<_> = stored
        .occupancy
        .iter()
        .filter(|o| o.center == "Lycée Ibn Sina")
        .map(|o| (o.room.as_str(), o.occupied))
        .collect();
    assert_eq!(ibn_sina, vec![("S1", 1), ("S2", 2)]);

    let dir = tempfile::tempdir().unwrap();
    let seats = dir.path().join("seats.csv");
    let summary = dir.path().join("summary.csv");
    let unused = dir.path().join("unused.csv");
    let exported = state
        .allocation_api
        .export(&seats, Some(&summary), Some(&unused))
        .unwrap();
    assert_eq!(exported.seat_rows, 4);
    assert_eq!(exported.summary_rows, Some(2));
    assert_eq!(exported.unused_rows, Some(0));

    let text = std::fs::read_to_string(&seats).unwrap();
    assert!(text.starts_with("Code,LastName,FirstName,region,province,Center,Room,SeatNumber,RoomType,language"));

    let stats = state.allocation_api.stats().unwrap();
    assert_eq!(stats.candidates, 4);
    assert_eq!(stats.capacity.total, 9);
    assert_eq!(stats.last_mode, Some(AllocationMode::Random));
}

#[tokio::test]
async fn test_seeded_runs_are_reproducible_through_api() {
    let (_db, state) = standard_setup().await;

    let a = state
        .allocation_api
        .allocate(Some(AllocationMode::Random), Some(7))
        .await
        .unwrap();
    let b = state
        .allocation_api
        .allocate(Some(AllocationMode::Random), Some(7))
        .await
        .unwrap();
    assert_eq!(a.assignments, b.assignments);
}

#[tokio::test]
async fn test_insufficient_capacity_persists_nothing() {
    let (_db, state) = setup(
        &[
            ROSTER_HEADER,
            "C1,Alami,Sara,R,P,A,FR,F",
            "C2,Bennani,Omar,R,P,A,FR,M",
            "C3,Chraibi,Nadia,R,P,A,FR,F",
        ],
        &[ROOMS_HEADER, "A,R1,2,Grande,,"],
    )
    .await;

    let err = state
        .allocation_api
        .allocate(Some(AllocationMode::Priority), None)
        .await
        .unwrap_err();
    match err {
        ApiError::ValidationFailed(report) => {
            assert!(report.has(|i| matches!(
                i,
                ValidationIssue::InsufficientCapacity { capacity: 2, required: 3, .. }
            )));
        }
        other => panic!("期望校验失败，实际: {other}"),
    }
    assert!(state.allocation_api.last_run().unwrap().is_none());
}

#[tokio::test]
async fn test_failed_run_keeps_previous_result() {
    let (_db, state) = standard_setup().await;
    let first = state.allocation_api.allocate(None, None).await.unwrap();

    // 删除 Al Amal 唯一考场后，C3 无法解析
    assert!(state.room_api.delete_room("Collège Al Amal", "S1").unwrap());
    assert!(state.allocation_api.allocate(None, None).await.is_err());

    let stored = state.allocation_api.last_run().unwrap().unwrap();
    assert_eq!(stored.run_id, first.run_id);
}

#[tokio::test]
async fn test_default_mode_read_from_config() {
    let (_db, state) = standard_setup().await;

    let run = state.allocation_api.allocate(None, None).await.unwrap();
    assert_eq!(run.mode, AllocationMode::Priority);

    state
        .config_api
        .update_config(config_keys::DEFAULT_MODE, "RANDOM")
        .unwrap();
    state
        .config_api
        .update_config(config_keys::RANDOM_SEED, "9")
        .unwrap();
    let run = state.allocation_api.allocate(None, None).await.unwrap();
    assert_eq!(run.mode, AllocationMode::Random);
    assert_eq!(run.seed, Some(9));
}

#[tokio::test]
async fn test_ambiguity_policy_from_config() {
    let (_db, state) = setup(
        &[ROSTER_HEADER, "C1,Alami,Sara,R,P,Lycée Ibn,FR,F"],
        &[
            ROOMS_HEADER,
            "Lycée Ibn Sina,S1,5,Grande,,",
            "Lycée Ibn Rochd,S1,5,Grande,,",
        ],
    )
    .await;

    let err = state.allocation_api.allocate(None, None).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::ValidationFailed(ref report)
            if report.has(|i| matches!(i, ValidationIssue::UnresolvedCenter(_)))
    ));

    state
        .config_api
        .update_config(config_keys::AMBIGUITY_POLICY, "FIRST_MATCH")
        .unwrap();
    let run = state.allocation_api.allocate(None, None).await.unwrap();
    assert_eq!(run.assignments[0].center, "Lycée Ibn Sina");
}

#[tokio::test]
async fn test_center_seating_grouped_by_room() {
    let (_db, state) = standard_setup().await;

    // 尚未分配
    let err = state.allocation_api.center_seating("Lycée Ibn Sina").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    state
        .allocation_api
        .allocate(Some(AllocationMode::Priority), None)
        .await
        .unwrap();

    let seating = state
        .allocation_api
        .center_seating(" Lycée Ibn Sina ")
        .unwrap();
    let rooms: Vec<&str> = seating.iter().map(|r| r.room.as_str()).collect();
    assert_eq!(rooms, vec!["S1", "S2"]);
    for room in &seating {
        let seats: Vec<u32> = room.assignments.iter().map(|a| a.seat_number).collect();
        let expected: Vec<u32> = (1..=seats.len() as u32).collect();
        assert_eq!(seats, expected);
        assert!(room.assignments.iter().all(|a| a.room == room.room));
    }
    let total: usize = seating.iter().map(|r| r.assignments.len()).sum();
    assert_eq!(total, 3);

    let err = state.allocation_api.center_seating("Lycée Inconnu").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(msg) if msg.contains("Lycée Inconnu")));

    let err = state.allocation_api.center_seating("  ").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
