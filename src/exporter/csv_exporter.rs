// ==========================================
// 考场座位分配系统 - CSV 导出
// ==========================================
// 座位表列: Code, LastName, FirstName, region, province, Center, Room,
//           SeatNumber, RoomType, language
// ==========================================

use crate::domain::assignment::AllocationRun;
use crate::engine::summary::{center_summaries, unused_rooms};
use crate::exporter::error::ExportResult;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const SEAT_LIST_HEADERS: [&str; 10] = [
    "Code",
    "LastName",
    "FirstName",
    "region",
    "province",
    "Center",
    "Room",
    "SeatNumber",
    "RoomType",
    "language",
];

pub struct CsvExporter;

impl CsvExporter {
    /// 写出座位表（保持分配顺序）
    pub fn write_seat_list<W: Write>(&self, run: &AllocationRun, out: W) -> ExportResult<usize> {
        let mut writer = Writer::from_writer(out);
        writer.write_record(SEAT_LIST_HEADERS)?;

        for a in &run.assignments {
            writer.write_record([
                a.code.as_str(),
                a.last_name.as_str(),
                a.first_name.as_str(),
                a.region.as_str(),
                a.province.as_str(),
                a.center.as_str(),
                a.room.as_str(),
                a.seat_number.to_string().as_str(),
                a.room_type.as_str(),
                a.language.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(run.assignments.len())
    }

    /// 写出各中心汇总
    pub fn write_center_summary<W: Write>(&self, run: &AllocationRun, out: W) -> ExportResult<usize> {
        let mut writer = Writer::from_writer(out);
        writer.write_record(["Center", "Candidates", "InGrande", "RoomsUsed"])?;

        let summaries = center_summaries(run);
        for s in &summaries {
            writer.write_record([
                s.center.as_str(),
                s.candidates.to_string().as_str(),
                s.in_grande.to_string().as_str(),
                s.rooms_used.to_string().as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(summaries.len())
    }

    /// 写出未使用考场
    pub fn write_unused_rooms<W: Write>(&self, run: &AllocationRun, out: W) -> ExportResult<usize> {
        let mut writer = Writer::from_writer(out);
        writer.write_record(["Center", "Room", "RoomType", "Capacity"])?;

        let rooms = unused_rooms(run);
        for o in &rooms {
            writer.write_record([
                o.center.as_str(),
                o.room.as_str(),
                o.room_type.as_str(),
                o.capacity.to_string().as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(rooms.len())
    }

    pub fn export_seat_list(&self, run: &AllocationRun, path: &Path) -> ExportResult<usize> {
        let count = self.write_seat_list(run, File::create(path)?)?;
        info!(path = %path.display(), rows = count, "座位表已导出");
        Ok(count)
    }

    pub fn export_center_summary(&self, run: &AllocationRun, path: &Path) -> ExportResult<usize> {
        let count = self.write_center_summary(run, File::create(path)?)?;
        info!(path = %path.display(), rows = count, "中心汇总已导出");
        Ok(count)
    }

    pub fn export_unused_rooms(&self, run: &AllocationRun, path: &Path) -> ExportResult<usize> {
        let count = self.write_unused_rooms(run, File::create(path)?)?;
        info!(path = %path.display(), rows = count, "未使用考场已导出");
        Ok(count)
    }
}
