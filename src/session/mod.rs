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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub mod chrome;

/// 标签页句柄
///
/// 会话内单调递增分配，标签页关闭后不复用
pub type TabId = u64;

/// 会话错误类型
#[derive(Error, Debug)]
pub enum SessionError {
    /// 元素未找到
    #[error("Element not found: {0}")]
    NotFound(String),
    /// 当前无活动标签页
    #[error("No active tab")]
    NoActiveTab,
    /// 标签页句柄无效
    #[error("No such tab: {0}")]
    UnknownTab(TabId),
    /// 浏览器启动或目标页创建失败
    #[error("Browser setup failed: {0}")]
    Setup(String),
    /// 浏览器协议错误
    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
    /// 页面脚本执行失败
    #[error("Script error: {0}")]
    Script(String),
}

/// 页面元素特质
///
/// 对单个DOM元素的读取与交互操作
#[async_trait]
pub trait Element: Send + Sync {
    /// 元素的可见文本
    async fn text(&self) -> Result<String, SessionError>;

    /// 读取属性值，属性不存在时返回None
    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError>;

    /// 在元素内查找第一个匹配的子元素
    async fn find(&self, selector: &str) -> Result<Box<dyn Element>, SessionError>;

    /// 在元素内查找全部匹配的子元素
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, SessionError>;

    /// 元素当前是否可见
    async fn is_displayed(&self) -> bool;

    /// 将元素滚动到可视区域
    async fn scroll_into_view(&self) -> Result<(), SessionError>;

    /// 通过DOM直接触发点击，绕过遮挡与可见性检查
    async fn click_js(&self) -> Result<(), SessionError>;
}

/// 浏览器会话特质
///
/// 单线程顺序驱动一个浏览器实例；所有操作共享会话状态
/// （当前标签页、DOM、历史），不可并发调用
#[async_trait]
pub trait Session: Send + Sync {
    /// 在当前标签页导航到URL
    async fn open_url(&self, url: &str) -> Result<(), SessionError>;

    /// 在新标签页打开URL，不切换焦点，由调用方决定何时切换
    async fn open_in_new_tab(&self, url: &str) -> Result<(), SessionError>;

    /// 当前标签页的句柄
    async fn current_tab(&self) -> Result<TabId, SessionError>;

    /// 切换到最近打开的标签页
    async fn switch_to_latest_tab(&self) -> Result<(), SessionError>;

    /// 切换到指定标签页
    async fn switch_to_tab(&self, tab: TabId) -> Result<(), SessionError>;

    /// 关闭当前标签页；之后必须先切换才能继续操作
    async fn close_current_tab(&self) -> Result<(), SessionError>;

    /// 在当前标签页查找元素，受隐式等待约束
    async fn find(&self, selector: &str) -> Result<Box<dyn Element>, SessionError>;

    /// 在当前标签页查找全部元素；超时前轮询，超时后返回空集
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, SessionError>;

    /// 调整后续元素查找的隐式等待时间
    fn set_implicit_wait(&self, wait: Duration);

    /// 当前的隐式等待时间
    fn implicit_wait(&self) -> Duration;
}

/// 滚动到元素并通过DOM点击，失败时按固定间隔重试
///
/// 耗尽重试次数后返回false，从不报错
pub async fn scroll_and_click(element: &dyn Element, max_attempts: u32, backoff: Duration) -> bool {
    for attempt in 1..=max_attempts {
        let result = async {
            element.scroll_into_view().await?;
            element.click_js().await
        }
        .await;
        match result {
            Ok(()) => return true,
            Err(e) => {
                warn!("Scroll click attempt {} failed: {}", attempt, e);
                tokio::time::sleep(backoff).await;
            }
        }
    }
    false
}
