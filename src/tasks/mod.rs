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

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// 任务清单错误类型
#[derive(Error, Debug)]
pub enum TaskError {
    /// 任务文件读取或解析失败
    #[error("Failed to read task file: {0}")]
    Csv(#[from] csv::Error),
    /// 市场URL非法
    #[error("Invalid marketplace url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

/// 单个抓取任务：一个分类名及其列表页URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    #[serde(rename = "Task name")]
    name: String,
    #[serde(rename = "Marketplace URL")]
    url: String,
}

/// 从CSV清单读取任务
///
/// 只取 "Task name" 与 "Marketplace URL" 两列，其余列忽略；
/// 行顺序即任务顺序。文件缺失、缺列或URL非法都是启动期
/// 致命错误，直接向调用方传播。
pub fn read_tasks(path: &Path) -> Result<Vec<Task>, TaskError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut tasks = Vec::new();

    for row in reader.deserialize() {
        let row: TaskRow = row?;
        Url::parse(&row.url).map_err(|source| TaskError::InvalidUrl {
            url: row.url.clone(),
            source,
        })?;
        tasks.push(Task {
            name: row.name,
            url: row.url,
        });
    }

    Ok(tasks)
}
