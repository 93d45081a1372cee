// ==========================================
// 考场座位分配系统 - 分配结果汇总
// ==========================================
// 输出: 各中心人数/大考场人数/使用考场数 + 未使用考场列表
//       单中心按考场分组的座位表（签到表/门贴的数据来源）
// ==========================================

use crate::domain::assignment::{AllocationRun, RoomOccupancy, SeatAssignment};
use crate::domain::types::RoomType;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// 单中心汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterSummary {
    pub center: String,
    pub candidates: usize,
    pub in_grande: usize,
    pub rooms_used: usize,
}

/// 各中心汇总（按考场清单中首次出现的顺序）
pub fn center_summaries(run: &AllocationRun) -> Vec<CenterSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_center: HashMap<&str, CenterSummary> = HashMap::new();

    for occ in &run.occupancy {
        let summary = by_center.entry(occ.center.as_str()).or_insert_with(|| {
            order.push(occ.center.as_str());
            CenterSummary {
                center: occ.center.clone(),
                candidates: 0,
                in_grande: 0,
                rooms_used: 0,
            }
        });
        if occ.occupied > 0 {
            summary.rooms_used += 1;
        }
    }

    for assignment in &run.assignments {
        if let Some(summary) = by_center.get_mut(assignment.center.as_str()) {
            summary.candidates += 1;
            if assignment.room_type == RoomType::Grande {
                summary.in_grande += 1;
            }
        }
    }

    order
        .into_iter()
        .filter_map(|center| by_center.remove(center))
        .filter(|s| s.candidates > 0)
        .collect()
}

/// 本次分配未使用的考场
pub fn unused_rooms(run: &AllocationRun) -> Vec<&RoomOccupancy> {
    run.occupancy.iter().filter(|o| o.occupied == 0).collect()
}

/// 单考场座位表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSeating {
    pub room: String,
    pub room_type: RoomType,
    pub assignments: Vec<SeatAssignment>,
}

/// 指定中心的座位表：考场按名称排序，考场内按座位号排序
///
/// 中心名精确匹配（忽略首尾空白）；该中心没有考生时返回空列表。
pub fn center_seating(run: &AllocationRun, center: &str) -> Vec<RoomSeating> {
    let center = center.trim();
    let mut by_room: BTreeMap<&str, RoomSeating> = BTreeMap::new();

    for a in run.assignments.iter().filter(|a| a.center == center) {
        by_room
            .entry(a.room.as_str())
            .or_insert_with(|| RoomSeating {
                room: a.room.clone(),
                room_type: a.room_type,
                assignments: Vec::new(),
            })
            .assignments
            .push(a.clone());
    }

    by_room
        .into_values()
        .map(|mut seating| {
            seating.assignments.sort_by_key(|a| a.seat_number);
            seating
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::Candidate;
    use crate::domain::room::{Room, RoomInventory};
    use crate::domain::types::AllocationMode;
    use crate::engine::orchestrator::AllocationOrchestrator;

    #[test]
    fn test_summaries_and_unused_rooms() {
        let inventory = RoomInventory::from_rooms(vec![
            Room::new("A", "G1", 2, RoomType::Grande),
            Room::new("A", "P1", 2, RoomType::Petite),
            Room::new("B", "G1", 2, RoomType::Grande),
            Room::new("C", "G1", 2, RoomType::Grande),
        ]);
        let roster = vec![
            Candidate::new("1", "A", "a", "R", "P", "FR", Some("A")),
            Candidate::new("2", "B", "b", "R", "P", "FR", Some("A")),
            Candidate::new("3", "C", "c", "R", "P", "FR", Some("A")),
            Candidate::new("4", "D", "d", "R", "P", "FR", Some("B")),
        ];

        let run = AllocationOrchestrator::default()
            .run(&roster, &inventory, AllocationMode::Priority, None)
            .unwrap();

        let summaries = center_summaries(&run);
        assert_eq!(
            summaries,
            vec![
                CenterSummary { center: "A".into(), candidates: 3, in_grande: 2, rooms_used: 2 },
                CenterSummary { center: "B".into(), candidates: 1, in_grande: 1, rooms_used: 1 },
            ]
        );

        let unused: Vec<(&str, &str)> = unused_rooms(&run)
            .iter()
            .map(|o| (o.center.as_str(), o.room.as_str()))
            .collect();
        assert_eq!(unused, vec![("C", "G1")]);
    }

    #[test]
    fn test_center_seating_grouped_by_room() {
        let inventory = RoomInventory::from_rooms(vec![
            Room::new("A", "S2", 2, RoomType::Grande),
            Room::new("A", "S1", 2, RoomType::Petite),
            Room::new("B", "S1", 2, RoomType::Grande),
        ]);
        let roster = vec![
            Candidate::new("1", "A", "a", "R", "P", "FR", Some("A")),
            Candidate::new("2", "B", "b", "R", "P", "FR", Some("A")),
            Candidate::new("3", "C", "c", "R", "P", "FR", Some("A")),
            Candidate::new("4", "D", "d", "R", "P", "FR", Some("B")),
        ];
        let run = AllocationOrchestrator::default()
            .run(&roster, &inventory, AllocationMode::Priority, None)
            .unwrap();

        let seating = center_seating(&run, " A ");
        let rooms: Vec<(&str, Vec<(&str, u32)>)> = seating
            .iter()
            .map(|s| {
                (
                    s.room.as_str(),
                    s.assignments
                        .iter()
                        .map(|a| (a.code.as_str(), a.seat_number))
                        .collect(),
                )
            })
            .collect();
        assert_eq!(
            rooms,
            vec![("S1", vec![("3", 1)]), ("S2", vec![("1", 1), ("2", 2)])]
        );
        assert_eq!(seating[0].room_type, RoomType::Petite);

        assert!(center_seating(&run, "C").is_empty());
    }
}
