// ==========================================
// 考场座位分配系统 - 考场清单领域模型
// ==========================================
// 约束: capacity > 0; (center, name) 唯一（由校验层检查）
// 约束: RoomId 为清单快照内的稳定下标，不依赖名称字符串
// ==========================================

use crate::domain::types::RoomType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Room - 考场
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub center: String,      // 所属中心名称
    pub name: String,        // 考场名称
    pub capacity: u32,       // 座位数
    pub room_type: RoomType, // Grande / Petite
    pub climatise: bool,     // 空调（透传）
    pub camera: bool,        // 监控（透传）
}

impl Room {
    pub fn new(center: &str, name: &str, capacity: u32, room_type: RoomType) -> Self {
        Self {
            center: center.trim().to_string(),
            name: name.trim().to_string(),
            capacity,
            room_type,
            climatise: false,
            camera: false,
        }
    }
}

/// 清单快照内的考场标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub usize);

// ==========================================
// Center - 考试中心
// ==========================================
// grande/petite 各自保持清单顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Center {
    pub name: String,
    pub grande: Vec<RoomId>,
    pub petite: Vec<RoomId>,
}

impl Center {
    fn new(name: String) -> Self {
        Self {
            name,
            grande: Vec::new(),
            petite: Vec::new(),
        }
    }

    pub fn room_count(&self) -> usize {
        self.grande.len() + self.petite.len()
    }

    pub fn is_empty(&self) -> bool {
        self.room_count() == 0
    }

    /// 分配遍历顺序: 先 Grande 后 Petite
    pub fn rooms_in_fill_order(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.grande.iter().chain(self.petite.iter()).copied()
    }
}

/// 容量汇总（总计/大考场/小考场）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapacityTotals {
    pub total: u64,
    pub grande: u64,
    pub petite: u64,
}

/// 单中心统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterStats {
    pub center: String,
    pub room_count: usize,
    pub total_capacity: u64,
    pub grande_capacity: u64,
    pub climatise_count: usize,
    pub camera_count: usize,
}

// ==========================================
// RoomInventory - 考场清单
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RoomInventory {
    rooms: Vec<Room>,
    centers: Vec<Center>,
    center_index: HashMap<String, usize>,
}

impl RoomInventory {
    /// 仅由考场构建（中心按首次出现顺序）
    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        Self::new(Vec::new(), rooms)
    }

    /// 由显式声明的中心 + 考场构建
    ///
    /// 声明的中心允许没有考场（被考生引用时由校验层报 EmptyCenter）。
    pub fn new(declared_centers: Vec<String>, rooms: Vec<Room>) -> Self {
        let mut inventory = Self::default();

        for name in declared_centers {
            inventory.ensure_center(name.trim());
        }

        for mut room in rooms {
            room.center = room.center.trim().to_string();
            let center_idx = inventory.ensure_center(&room.center);
            let id = RoomId(inventory.rooms.len());
            match room.room_type {
                RoomType::Grande => inventory.centers[center_idx].grande.push(id),
                RoomType::Petite => inventory.centers[center_idx].petite.push(id),
            }
            inventory.rooms.push(room);
        }

        inventory
    }

    fn ensure_center(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.center_index.get(name) {
            return idx;
        }
        let idx = self.centers.len();
        self.centers.push(Center::new(name.to_string()));
        self.center_index.insert(name.to_string(), idx);
        idx
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.0]
    }

    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> {
        (0..self.rooms.len()).map(RoomId)
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    /// 中心名称（清单顺序）
    pub fn center_names(&self) -> Vec<&str> {
        self.centers.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn center(&self, name: &str) -> Option<&Center> {
        self.center_index
            .get(name.trim())
            .map(|&idx| &self.centers[idx])
    }

    /// 某中心的全部考场（先 Grande 后 Petite）
    pub fn rooms_of(&self, center: &str) -> Vec<&Room> {
        self.center(center)
            .map(|c| c.rooms_in_fill_order().map(|id| self.room(id)).collect())
            .unwrap_or_default()
    }

    pub fn find_room(&self, center: &str, name: &str) -> Option<RoomId> {
        let center = self.center(center)?;
        center
            .rooms_in_fill_order()
            .find(|&id| self.rooms[id.0].name == name.trim())
    }

    // ==========================================
    // 容量聚合
    // ==========================================

    pub fn total_capacity(&self) -> u64 {
        self.rooms.iter().map(|r| r.capacity as u64).sum()
    }

    pub fn center_capacity(&self, center: &str) -> u64 {
        self.rooms_of(center).iter().map(|r| r.capacity as u64).sum()
    }

    pub fn capacity_totals(&self) -> CapacityTotals {
        let mut totals = CapacityTotals::default();
        for room in &self.rooms {
            let cap = room.capacity as u64;
            totals.total += cap;
            match room.room_type {
                RoomType::Grande => totals.grande += cap,
                RoomType::Petite => totals.petite += cap,
            }
        }
        totals
    }

    /// 各中心统计（不含空中心）
    pub fn stats_by_center(&self) -> Vec<CenterStats> {
        self.centers
            .iter()
            .filter(|c| !c.is_empty())
            .map(|center| {
                let rooms: Vec<&Room> =
                    center.rooms_in_fill_order().map(|id| self.room(id)).collect();
                CenterStats {
                    center: center.name.clone(),
                    room_count: rooms.len(),
                    total_capacity: rooms.iter().map(|r| r.capacity as u64).sum(),
                    grande_capacity: rooms
                        .iter()
                        .filter(|r| r.room_type == RoomType::Grande)
                        .map(|r| r.capacity as u64)
                        .sum(),
                    climatise_count: rooms.iter().filter(|r| r.climatise).count(),
                    camera_count: rooms.iter().filter(|r| r.camera).count(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inventory() -> RoomInventory {
        RoomInventory::new(
            vec!["Vide".to_string()],
            vec![
                Room::new("A", "P1", 10, RoomType::Petite),
                Room::new("A", "G1", 30, RoomType::Grande),
                Room::new(" B ", "G1", 20, RoomType::Grande),
                Room::new("A", "G2", 25, RoomType::Grande),
            ],
        )
    }

    #[test]
    fn test_fill_order_is_grande_then_petite() {
        let inv = sample_inventory();
        let names: Vec<&str> = inv.rooms_of("A").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["G1", "G2", "P1"]);
    }

    #[test]
    fn test_center_order_and_trim() {
        let inv = sample_inventory();
        assert_eq!(inv.center_names(), vec!["Vide", "A", "B"]);
        assert!(inv.center("Vide").unwrap().is_empty());
        assert_eq!(inv.center_capacity("B"), 20);
    }

    #[test]
    fn test_capacity_totals() {
        let inv = sample_inventory();
        let totals = inv.capacity_totals();
        assert_eq!(totals.total, 85);
        assert_eq!(totals.grande, 75);
        assert_eq!(totals.petite, 10);
        assert_eq!(inv.total_capacity(), 85);
    }

    #[test]
    fn test_stats_by_center_skips_empty_centers() {
        let inv = sample_inventory();
        let stats = inv.stats_by_center();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].center, "A");
        assert_eq!(stats[0].room_count, 3);
        assert_eq!(stats[0].grande_capacity, 55);
    }

    #[test]
    fn test_find_room() {
        let inv = sample_inventory();
        let id = inv.find_room("B", "G1").unwrap();
        assert_eq!(inv.room(id).capacity, 20);
        assert!(inv.find_room("B", "P9").is_none());
    }
}
