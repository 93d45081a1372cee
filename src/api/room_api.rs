// ==========================================
// 考场座位分配系统 - 考场维护 API
// ==========================================
// 职责: 单条考场/中心维护（新增、修改、删除）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::room::{Room, RoomInventory};
use crate::repository::RoomRepository;
use std::sync::Arc;
use tracing::info;

pub struct RoomApi {
    room_repo: Arc<RoomRepository>,
}

impl RoomApi {
    pub fn new(room_repo: Arc<RoomRepository>) -> Self {
        Self { room_repo }
    }

    pub fn inventory(&self) -> ApiResult<RoomInventory> {
        Ok(self.room_repo.load_inventory()?)
    }

    /// 按中心名 + 考场名查找
    pub fn room(&self, center: &str, name: &str) -> ApiResult<Room> {
        let inventory = self.room_repo.load_inventory()?;
        inventory
            .find_room(center.trim(), name.trim())
            .map(|id| inventory.room(id).clone())
            .ok_or_else(|| ApiError::NotFound(format!("考场 {}/{}", center, name)))
    }

    pub fn add_center(&self, name: &str) -> ApiResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("中心名称不能为空".to_string()));
        }
        self.room_repo.add_center(name)?;
        info!(center = %name, "中心已新增");
        Ok(())
    }

    pub fn add_room(&self, room: &Room) -> ApiResult<()> {
        check_room(room)?;
        self.room_repo.add_room(room)?;
        info!(center = %room.center, room = %room.name, "考场已新增");
        Ok(())
    }

    /// 修改考场（可改名或移到其他中心；原中心因此变空时一并删除）
    pub fn update_room(&self, center: &str, name: &str, room: &Room) -> ApiResult<()> {
        check_room(room)?;
        self.room_repo.update_room(center, name, room)?;
        info!(
            center = %center,
            room = %name,
            new_center = %room.center,
            new_room = %room.name,
            "考场已修改"
        );
        Ok(())
    }

    /// 删除考场
    ///
    /// # 返回
    /// - Ok(true): 所属中心因此变空并被删除
    pub fn delete_room(&self, center: &str, name: &str) -> ApiResult<bool> {
        Ok(self.room_repo.delete_room(center, name)?)
    }
}

fn check_room(room: &Room) -> ApiResult<()> {
    if room.center.trim().is_empty() || room.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("中心名称与考场名称不能为空".to_string()));
    }
    if room.capacity == 0 {
        return Err(ApiError::InvalidInput(format!(
            "考场 {}/{} 容量必须大于 0",
            room.center, room.name
        )));
    }
    Ok(())
}
