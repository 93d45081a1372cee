// ==========================================
// 考场座位分配系统 - 命令行入口
// ==========================================
// 命令: import-candidates / import-rooms / allocate / show / export /
//       stats / config / rooms（list / add / add-center / update / remove）
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use exam_seating::api::StatsResponse;
use exam_seating::app::{get_default_db_path, AppState, DB_PATH_ENV};
use exam_seating::domain::{AllocationMode, AllocationRun, Room, RoomType};
use exam_seating::engine::RoomSeating;
use exam_seating::logging;

#[derive(Parser)]
#[command(name = "exam-seating")]
#[command(version, about = "考场座位分配: 按考试中心将考生分配到考场座位")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 数据库文件路径
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// 输出调试日志
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 导入考生名单（CSV / Excel），整体替换现有名单
    ImportCandidates {
        file: PathBuf,
    },

    /// 导入考场清单（CSV / Excel），整体替换现有清单
    ImportRooms {
        file: PathBuf,
        /// 历史表格布局: 无 type 列，全部视为 Grande
        #[arg(long)]
        legacy: bool,
    },

    /// 执行座位分配并保存为最近一次结果
    Allocate {
        /// PRIORITY | RANDOM（默认读取配置 allocation.default_mode）
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<AllocationMode>,
        /// 随机种子（RANDOM 模式下可复现）
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// 显示最近一次分配结果
    Show {
        /// 只显示该中心，按考场分组
        #[arg(long)]
        center: Option<String>,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 导出最近一次分配结果为 CSV
    Export {
        /// 座位表输出文件
        file: PathBuf,
        /// 各中心汇总输出文件
        #[arg(long)]
        summary: Option<PathBuf>,
        /// 未使用考场输出文件
        #[arg(long)]
        unused: Option<PathBuf>,
    },

    /// 显示名单/清单/分配概况
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 考场维护
    Rooms {
        #[command(subcommand)]
        action: RoomAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 设置配置值
    Set { key: String, value: String },
    /// 读取配置值
    Get { key: String },
    /// 列出全部配置
    List,
}

#[derive(Subcommand)]
enum RoomAction {
    /// 列出全部考场
    List,
    /// 新增考场（中心不存在时自动创建）
    Add {
        center: String,
        name: String,
        capacity: u32,
        /// Grande | Petite
        #[arg(long = "type", value_parser = parse_room_type, default_value = "Grande")]
        room_type: RoomType,
        #[arg(long)]
        climatise: bool,
        #[arg(long)]
        camera: bool,
    },
    /// 新增中心（暂无考场）
    AddCenter { name: String },
    /// 修改考场；未给出的属性保持不变
    Update {
        center: String,
        name: String,
        /// 移到其他中心（不存在时自动创建）
        #[arg(long)]
        new_center: Option<String>,
        /// 重命名
        #[arg(long)]
        new_name: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        /// Grande | Petite
        #[arg(long = "type", value_parser = parse_room_type)]
        room_type: Option<RoomType>,
        #[arg(long)]
        climatise: Option<bool>,
        #[arg(long)]
        camera: Option<bool>,
    },
    /// 删除考场（中心因此变空时一并删除）
    Remove { center: String, name: String },
}

fn parse_mode(s: &str) -> Result<AllocationMode, String> {
    s.parse()
}

fn parse_room_type(s: &str) -> Result<RoomType, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_with_level("debug");
    } else {
        logging::init();
    }

    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    info!(db_path = %db_path, version = exam_seating::VERSION, "{}", exam_seating::APP_NAME);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::ImportCandidates { file } => {
            let summary = state
                .import_api
                .import_candidates(&file.to_string_lossy())
                .await?;
            println!("已导入 {} 名考生（批次 {}）", summary.imported, summary.batch_id);
        }

        Commands::ImportRooms { file, legacy } => {
            let summary = state
                .import_api
                .import_rooms(&file.to_string_lossy(), legacy)
                .await?;
            println!("已导入 {} 个考场（批次 {}）", summary.imported, summary.batch_id);
        }

        Commands::Allocate { mode, seed } => {
            let run = state.allocation_api.allocate(mode, seed).await?;
            println!(
                "分配完成: 模式 {}，{} 名考生，使用 {} 个考场",
                run.mode,
                run.candidate_count(),
                run.rooms_used()
            );
            if let Some(seed) = run.seed {
                println!("随机种子: {}", seed);
            }
        }

        Commands::Show {
            center: Some(center),
            json,
        } => {
            let seating = state.allocation_api.center_seating(&center)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&seating)?);
            } else {
                print_center_seating(&center, &seating);
            }
        }

        Commands::Show { center: None, json } => match state.allocation_api.last_run()? {
            Some(run) if json => println!("{}", serde_json::to_string_pretty(&run)?),
            Some(run) => print_run(&run),
            None => println!("尚无分配结果"),
        },

        Commands::Export {
            file,
            summary,
            unused,
        } => {
            let result = state
                .allocation_api
                .export(&file, summary.as_deref(), unused.as_deref())
                .context("导出失败")?;
            println!("座位表: {} 行 → {}", result.seat_rows, file.display());
            if let (Some(rows), Some(path)) = (result.summary_rows, summary) {
                println!("中心汇总: {} 行 → {}", rows, path.display());
            }
            if let (Some(rows), Some(path)) = (result.unused_rows, unused) {
                println!("未使用考场: {} 行 → {}", rows, path.display());
            }
        }

        Commands::Stats { json } => {
            let stats = state.allocation_api.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Set { key, value } => {
                let stored = state.config_api.update_config(&key, &value)?;
                println!("{} = {}", key, stored);
            }
            ConfigAction::Get { key } => match state.config_api.get_config(&key)? {
                Some(value) => println!("{} = {}", key, value),
                None => println!("{} 未设置（使用默认值）", key),
            },
            ConfigAction::List => {
                for (key, value) in state.config_api.list_configs()? {
                    println!("{} = {}", key, value);
                }
            }
        },

        Commands::Rooms { action } => match action {
            RoomAction::List => {
                let inventory = state.room_api.inventory()?;
                for center in inventory.centers() {
                    println!("{}", center.name);
                    for id in center.rooms_in_fill_order() {
                        let room = inventory.room(id);
                        println!("  {:<20} {:>4}  {}", room.name, room.capacity, room.room_type);
                    }
                }
            }
            RoomAction::Add {
                center,
                name,
                capacity,
                room_type,
                climatise,
                camera,
            } => {
                let mut room = Room::new(&center, &name, capacity, room_type);
                room.climatise = climatise;
                room.camera = camera;
                state.room_api.add_room(&room)?;
                println!("已新增考场 {}/{}", room.center, room.name);
            }
            RoomAction::AddCenter { name } => {
                state.room_api.add_center(&name)?;
                println!("已新增中心 {}", name.trim());
            }
            RoomAction::Update {
                center,
                name,
                new_center,
                new_name,
                capacity,
                room_type,
                climatise,
                camera,
            } => {
                let mut room = state.room_api.room(&center, &name)?;
                if let Some(v) = new_center {
                    room.center = v;
                }
                if let Some(v) = new_name {
                    room.name = v;
                }
                if let Some(v) = capacity {
                    room.capacity = v;
                }
                if let Some(v) = room_type {
                    room.room_type = v;
                }
                if let Some(v) = climatise {
                    room.climatise = v;
                }
                if let Some(v) = camera {
                    room.camera = v;
                }
                state.room_api.update_room(&center, &name, &room)?;
                println!(
                    "已修改考场 {}/{} → {}/{}（容量 {}，{}）",
                    center, name, room.center, room.name, room.capacity, room.room_type
                );
            }
            RoomAction::Remove { center, name } => {
                if state.room_api.delete_room(&center, &name)? {
                    println!("已删除考场 {}/{}，中心 {} 已无考场并被删除", center, name, center);
                } else {
                    println!("已删除考场 {}/{}", center, name);
                }
            }
        },
    }

    Ok(())
}

fn print_run(run: &AllocationRun) {
    println!(
        "分配 {}  模式 {}  时间 {}",
        run.run_id,
        run.mode,
        run.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "{:<10} {:<20} {:<20} {:<20} {:<12} {:>5} {:<6}",
        "Code", "Nom", "Prénom", "Centre", "Salle", "Place", "Type"
    );
    for a in &run.assignments {
        println!(
            "{:<10} {:<20} {:<20} {:<20} {:<12} {:>5} {:<6}",
            a.code, a.last_name, a.first_name, a.center, a.room, a.seat_number, a.room_type
        );
    }
}

fn print_center_seating(center: &str, seating: &[RoomSeating]) {
    println!("中心 {}", center.trim());
    for room in seating {
        println!("  考场 {}（{}，{} 人）", room.room, room.room_type, room.assignments.len());
        for a in &room.assignments {
            println!(
                "    {:>5}  {:<10} {:<20} {:<20} {:<6}",
                a.seat_number, a.code, a.last_name, a.first_name, a.language
            );
        }
    }
}

fn print_stats(stats: &StatsResponse) {
    println!("考生人数: {}", stats.candidates);
    println!(
        "总容量: {}（Grande {}，Petite {}）",
        stats.capacity.total, stats.capacity.grande, stats.capacity.petite
    );
    for c in &stats.centers {
        println!(
            "  {:<24} 考场 {:>3}  容量 {:>5}  Grande {:>5}  空调 {:>3}  监控 {:>3}",
            c.center, c.room_count, c.total_capacity, c.grande_capacity, c.climatise_count, c.camera_count
        );
    }
    match stats.last_mode {
        Some(mode) => {
            println!("最近一次分配: {}", mode);
            for s in &stats.last_summary {
                println!(
                    "  {:<24} 考生 {:>5}  大考场 {:>5}  使用考场 {:>3}",
                    s.center, s.candidates, s.in_grande, s.rooms_used
                );
            }
        }
        None => println!("尚无分配结果"),
    }
}
