// ==========================================
// 值班排班管理系统 - 主入口
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// ==========================================

// 禁止控制台窗口 (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use duty_roster::app::{get_default_db_path, AppState};

#[cfg(feature = "tauri-app")]
fn main() {
    use duty_roster::app::tauri_commands::*;

    // 初始化日志系统
    duty_roster::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", duty_roster::APP_NAME);
    tracing::info!("系统版本: {}", duty_roster::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("启动Tauri应用...");

    // 启动Tauri应用
    if let Err(e) = tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ==========================================
            // 排班相关命令 (10个)
            // ==========================================
            auto_schedule,
            get_schedule,
            get_my_schedule,
            update_item,
            publish_schedule,
            update_published_item,
            list_change_logs,
            check_scope,
            get_candidates,
            validate_candidate,

            // ==========================================
            // 学期相关命令 (6个)
            // ==========================================
            create_semester,
            activate_semester,
            list_semesters,
            get_active_semester,
            check_phase,
            advance_phase,

            // ==========================================
            // 规则相关命令 (2个)
            // ==========================================
            list_rules,
            update_rule,
        ])
        .run(tauri::generate_context!())
    {
        tracing::error!("启动Tauri应用失败: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Tauri应用已退出");
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    duty_roster::logging::init();

    println!("==================================================");
    println!("{}", duty_roster::APP_NAME);
    println!("系统版本: {}", duty_roster::VERSION);
    println!("==================================================");
    println!();

    // 库模式下仅做数据库初始化自检
    let db_path = get_default_db_path();
    match AppState::new(db_path.clone()) {
        Ok(_) => {
            println!("数据库初始化完成: {}", db_path);
            println!();
            println!("此可执行文件的桌面端需要启用 tauri-app 特性:");
            println!("使用: cargo run --features tauri-app");
            println!();
            println!("或者使用库模式:");
            println!("use duty_roster::app::AppState;");
        }
        Err(e) => {
            eprintln!("初始化失败: {}", e);
            std::process::exit(1);
        }
    }
}
