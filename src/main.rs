// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::Local;
use clap::Parser;
use marketrs::config::settings::Settings;
use marketrs::export;
use marketrs::scraper::orchestrator;
use marketrs::session::chrome::ChromeSession;
use marketrs::session::Session;
use marketrs::tasks;
use marketrs::utils::telemetry;
use marketrs::utils::text::replace_non_char_with_hyphen;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "marketrs", about = "Marketplace listing scraper")]
struct Args {
    /// 导出文件输出目录
    #[arg(default_value = "./output")]
    output_dir: PathBuf,
    /// 日志文件目录
    #[arg(default_value = "./log")]
    log_dir: PathBuf,
}

/// 主函数
///
/// 应用程序入口点，负责初始化组件、执行抓取并保证最终导出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.output_dir)?;
    std::fs::create_dir_all(&args.log_dir)?;

    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging; the guard flushes the log file on exit
    let _guard = telemetry::init_telemetry(&args.log_dir, &settings.site.name);
    info!("Starting marketrs...");

    // 3. Read the task list; a missing or malformed file is fatal
    let tasks = tasks::read_tasks(Path::new(&settings.site.task_file))?;
    info!("Loaded {} tasks", tasks.len());

    // 4. Launch the browser and warm it up on the start URL
    let session = ChromeSession::launch(&settings.browser).await?;
    session.open_url(&settings.site.start_url).await?;
    tokio::time::sleep(Duration::from_secs(settings.crawl.initial_load_secs)).await;

    // 5. Walk every task; whatever was accumulated is exported below
    //    even when a category iteration failed mid-way
    let (records, outcome) = orchestrator::run(&session, &settings, &tasks).await;

    let export_result = if records.is_empty() {
        error!("empty data sent to printer");
        Ok(())
    } else {
        let file_name = format!(
            "{}{}.xlsx",
            replace_non_char_with_hyphen(&settings.site.name),
            Local::now().format("%Y%m%d%H%M%S")
        );
        let path = args.output_dir.join(file_name);
        let result = export::export(&records, &path);
        if result.is_ok() {
            info!("Exported {} records to {}", records.len(), path.display());
        }
        result
    };

    session.shutdown().await;

    export_result?;
    outcome?;
    info!("scraping done");

    Ok(())
}
