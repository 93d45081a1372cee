// ==========================================
// 考场座位分配系统 - 座位占用台账
// ==========================================
// 生命周期: 每次分配新建，由单次分配独占，结果产出后丢弃（不落库）
// 索引: RoomId（清单快照下标）
// ==========================================

use crate::domain::assignment::RoomOccupancy;
use crate::domain::room::{RoomId, RoomInventory};

#[derive(Debug, Clone)]
pub struct OccupationLedger {
    capacity: Vec<u32>,
    occupied: Vec<u32>,
}

impl OccupationLedger {
    /// 由清单快照创建空台账
    pub fn new(inventory: &RoomInventory) -> Self {
        let capacity: Vec<u32> = inventory.rooms().iter().map(|r| r.capacity).collect();
        let occupied = vec![0; capacity.len()];
        Self { capacity, occupied }
    }

    pub fn occupied(&self, room: RoomId) -> u32 {
        self.occupied[room.0]
    }

    pub fn has_space(&self, room: RoomId) -> bool {
        self.occupied[room.0] < self.capacity[room.0]
    }

    /// 占用下一个座位，返回座位号（count + 1）；已满时返回 None
    pub fn take_seat(&mut self, room: RoomId) -> Option<u32> {
        if !self.has_space(room) {
            return None;
        }
        self.occupied[room.0] += 1;
        Some(self.occupied[room.0])
    }

    /// 已占用座位总数
    pub fn total_occupied(&self) -> u64 {
        self.occupied.iter().map(|&n| n as u64).sum()
    }

    /// 导出各考场占用（清单顺序）
    pub fn snapshot(&self, inventory: &RoomInventory) -> Vec<RoomOccupancy> {
        inventory
            .room_ids()
            .map(|id| {
                let room = inventory.room(id);
                RoomOccupancy {
                    center: room.center.clone(),
                    room: room.name.clone(),
                    room_type: room.room_type,
                    capacity: room.capacity,
                    occupied: self.occupied(id),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::Room;
    use crate::domain::types::RoomType;

    #[test]
    fn test_take_seat_until_full() {
        let inv = RoomInventory::from_rooms(vec![Room::new("A", "R1", 2, RoomType::Grande)]);
        let mut ledger = OccupationLedger::new(&inv);
        let r1 = RoomId(0);

        assert_eq!(ledger.take_seat(r1), Some(1));
        assert_eq!(ledger.take_seat(r1), Some(2));
        assert_eq!(ledger.take_seat(r1), None);
        assert!(!ledger.has_space(r1));
        assert_eq!(ledger.total_occupied(), 2);
    }
}
