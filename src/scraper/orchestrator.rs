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

use crate::config::settings::Settings;
use crate::scraper::category::walk_category;
use crate::scraper::record::ItemRecord;
use crate::session::{Session, SessionError};
use crate::tasks::Task;
use tracing::{error, info};

/// 按任务清单顺序抓取所有分类
///
/// 记录随任务推进不断累积；某个分类中途失败时停止后续
/// 任务，但已累积的记录原样返回，由调用方完成最终导出。
///
/// # 返回值
///
/// 已累积的记录与整体结果；`Err` 表示有任务未完成
pub async fn run(
    session: &dyn Session,
    settings: &Settings,
    tasks: &[Task],
) -> (Vec<ItemRecord>, Result<(), SessionError>) {
    let mut records = Vec::new();

    for task in tasks {
        match walk_category(session, settings, &task.name, &task.url).await {
            Ok(mut found) => {
                records.append(&mut found);
                info!("{} finished.", task.name);
            }
            Err(e) => {
                error!("{} aborted - {}", task.name, e);
                return (records, Err(e));
            }
        }
    }

    (records, Ok(()))
}
