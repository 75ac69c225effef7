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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含站点、浏览器和抓取节奏等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 站点配置
    pub site: SiteSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 抓取节奏配置
    pub crawl: CrawlSettings,
}

/// 站点配置设置
#[derive(Debug, Deserialize)]
pub struct SiteSettings {
    /// 站点名称，用于日志文件和导出文件命名
    pub name: String,
    /// 启动后预热加载的起始URL
    pub start_url: String,
    /// 任务清单CSV文件路径
    pub task_file: String,
}

/// 浏览器配置设置
#[derive(Debug, Deserialize)]
pub struct BrowserSettings {
    /// 是否以无头模式运行
    pub headless: bool,
    /// 元素查找的隐式等待时间（秒）
    pub implicit_wait_secs: u64,
    /// 详情页可选字段查找的等待时间（毫秒）
    pub detail_wait_millis: u64,
    /// 窗口宽度
    pub window_width: u32,
    /// 窗口高度
    pub window_height: u32,
}

/// 抓取节奏配置设置
#[derive(Debug, Deserialize)]
pub struct CrawlSettings {
    /// 起始页预热等待时间（秒）
    pub initial_load_secs: u64,
    /// 分类页打开后的等待时间（秒）
    pub page_settle_secs: u64,
    /// 单个条目抓取后的间隔（秒）
    pub item_pause_secs: u64,
    /// 详情页关闭前的等待时间（秒）
    pub detail_settle_secs: u64,
    /// 翻页控件点击重试次数
    pub click_attempts: u32,
    /// 翻页控件点击重试间隔（秒）
    pub click_backoff_secs: u64,
    /// 单个分类允许的最大翻页数
    pub max_pages: u32,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default site settings
            .set_default("site.name", "Blueshift")?
            .set_default(
                "site.start_url",
                "https://blueshift.com/partners/#integration-partners",
            )?
            .set_default("site.task_file", "TASKS SCRIPTS TO FIX.csv")?
            // Default browser settings
            .set_default("browser.headless", false)?
            .set_default("browser.implicit_wait_secs", 5)?
            .set_default("browser.detail_wait_millis", 200)?
            .set_default("browser.window_width", 1920)?
            .set_default("browser.window_height", 1080)?
            // Default crawl pacing
            .set_default("crawl.initial_load_secs", 5)?
            .set_default("crawl.page_settle_secs", 1)?
            .set_default("crawl.item_pause_secs", 2)?
            .set_default("crawl.detail_settle_secs", 1)?
            .set_default("crawl.click_attempts", 3)?
            .set_default("crawl.click_backoff_secs", 2)?
            .set_default("crawl.max_pages", 100)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("MARKETRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
