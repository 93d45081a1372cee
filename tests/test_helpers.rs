// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use exam_seating::db;
use exam_seating::domain::{Candidate, Room, RoomInventory, RoomType};
use std::error::Error;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写出临时 CSV 文件
pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// 创建测试考生
pub fn candidate(code: &str, last: &str, region: &str, center: &str) -> Candidate {
    Candidate::new(code, last, "Prenom", region, "Province", "FR", Some(center))
}

/// 批量生成考生（姓名/地区循环变化）
pub fn roster(count: usize, center: &str) -> Vec<Candidate> {
    (0..count)
        .map(|i| {
            Candidate::new(
                format!("C{:04}", i),
                format!("Nom{}", (i * 7) % 11),
                format!("Prenom{}", i % 5),
                format!("Region{}", i % 3),
                format!("Province{}", i % 2),
                if i % 4 == 0 { "AR" } else { "FR" },
                Some(center),
            )
        })
        .collect()
}

/// 单中心清单: A {R1: 2 Grande, R2: 1 Petite}
pub fn example_inventory() -> RoomInventory {
    RoomInventory::from_rooms(vec![
        Room::new("A", "R1", 2, RoomType::Grande),
        Room::new("A", "R2", 1, RoomType::Petite),
    ])
}

/// 多中心清单（Petite 在前，验证大考场优先）
pub fn multi_center_inventory() -> RoomInventory {
    RoomInventory::from_rooms(vec![
        Room::new("Lycée Ibn Sina", "P1", 4, RoomType::Petite),
        Room::new("Lycée Ibn Sina", "G1", 6, RoomType::Grande),
        Room::new("Lycée Ibn Sina", "G2", 5, RoomType::Grande),
        Room::new("Collège Al Amal", "G1", 8, RoomType::Grande),
        Room::new("Collège Al Amal", "P1", 3, RoomType::Petite),
    ])
}
