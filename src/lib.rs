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

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 导出模块
///
/// 将采集到的记录写入xlsx工作簿
pub mod export;

/// 抓取流程模块
///
/// 实现分类、列表页与详情页的遍历逻辑
pub mod scraper;

/// 会话模块
///
/// 封装浏览器自动化会话与页面元素操作
pub mod session;

/// 任务模块
///
/// 从CSV任务清单读取待抓取的分类
pub mod tasks;

/// 工具模块
///
/// 提供日志初始化和文本处理等辅助功能
pub mod utils;
