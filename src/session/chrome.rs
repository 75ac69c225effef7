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

use crate::config::settings::BrowserSettings;
use crate::session::{Element, Session, SessionError, TabId};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// 元素查找的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 基于chromiumoxide的浏览器会话
///
/// 持有一个Chrome实例和按打开顺序排列的标签页列表，
/// 等价于WebDriver的window_handles
pub struct ChromeSession {
    browser: Browser,
    event_loop: JoinHandle<()>,
    tabs: Mutex<Vec<(TabId, Page)>>,
    current: Mutex<Option<TabId>>,
    next_tab_id: AtomicU64,
    implicit_wait: Mutex<Duration>,
}

impl ChromeSession {
    /// 启动浏览器并创建初始空白标签页
    ///
    /// # 参数
    ///
    /// * `settings` - 浏览器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(ChromeSession)` - 可用的会话
    /// * `Err(SessionError)` - 浏览器启动失败
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, SessionError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(settings.window_width, settings.window_height)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-extensions")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(SessionError::Setup)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // 浏览器事件必须持续消费，否则命令无法完成
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let session = Self {
            browser,
            event_loop,
            tabs: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            next_tab_id: AtomicU64::new(1),
            implicit_wait: Mutex::new(Duration::from_secs(settings.implicit_wait_secs)),
        };

        let page = session.browser.new_page("about:blank").await?;
        let id = session.register_tab(page);
        *session.current.lock() = Some(id);

        Ok(session)
    }

    /// 关闭浏览器并停止事件循环
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        self.event_loop.abort();
    }

    fn register_tab(&self, page: Page) -> TabId {
        let id = self.next_tab_id.fetch_add(1, Ordering::Relaxed);
        self.tabs.lock().push((id, page));
        id
    }

    fn current_page(&self) -> Result<Page, SessionError> {
        let current = (*self.current.lock()).ok_or(SessionError::NoActiveTab)?;
        let tabs = self.tabs.lock();
        tabs.iter()
            .find(|(id, _)| *id == current)
            .map(|(_, page)| page.clone())
            .ok_or(SessionError::UnknownTab(current))
    }

    async fn wait_for_element(
        &self,
        page: &Page,
        selector: &str,
    ) -> Result<chromiumoxide::Element, SessionError> {
        let deadline = tokio::time::Instant::now() + self.implicit_wait();
        loop {
            match page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(_) if tokio::time::Instant::now() < deadline => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(_) => return Err(SessionError::NotFound(selector.to_string())),
            }
        }
    }

    async fn wait_for_elements(
        &self,
        page: &Page,
        selector: &str,
    ) -> Result<Vec<chromiumoxide::Element>, SessionError> {
        let deadline = tokio::time::Instant::now() + self.implicit_wait();
        loop {
            match page.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                Ok(_) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Ok(Vec::new());
                    }
                }
                Err(e) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(e.into());
                    }
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn open_url(&self, url: &str) -> Result<(), SessionError> {
        let page = self.current_page()?;
        page.goto(url).await?;
        Ok(())
    }

    async fn open_in_new_tab(&self, url: &str) -> Result<(), SessionError> {
        // 后台创建目标页，不抢占当前标签页的焦点
        let params = CreateTargetParams::builder()
            .url(url)
            .background(true)
            .build()
            .map_err(SessionError::Setup)?;
        let page = self.browser.new_page(params).await?;
        self.register_tab(page);
        Ok(())
    }

    async fn current_tab(&self) -> Result<TabId, SessionError> {
        (*self.current.lock()).ok_or(SessionError::NoActiveTab)
    }

    async fn switch_to_latest_tab(&self) -> Result<(), SessionError> {
        let (id, page) = {
            let tabs = self.tabs.lock();
            tabs.last().cloned().ok_or(SessionError::NoActiveTab)?
        };
        page.activate().await?;
        *self.current.lock() = Some(id);
        Ok(())
    }

    async fn switch_to_tab(&self, tab: TabId) -> Result<(), SessionError> {
        let page = {
            let tabs = self.tabs.lock();
            tabs.iter()
                .find(|(id, _)| *id == tab)
                .map(|(_, page)| page.clone())
                .ok_or(SessionError::UnknownTab(tab))?
        };
        page.activate().await?;
        *self.current.lock() = Some(tab);
        Ok(())
    }

    async fn close_current_tab(&self) -> Result<(), SessionError> {
        let current = (*self.current.lock()).ok_or(SessionError::NoActiveTab)?;
        let page = {
            let mut tabs = self.tabs.lock();
            let index = tabs
                .iter()
                .position(|(id, _)| *id == current)
                .ok_or(SessionError::UnknownTab(current))?;
            tabs.remove(index).1
        };
        *self.current.lock() = None;
        page.close().await?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Box<dyn Element>, SessionError> {
        let page = self.current_page()?;
        let element = self.wait_for_element(&page, selector).await?;
        Ok(Box::new(ChromeElement { inner: element }))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, SessionError> {
        let page = self.current_page()?;
        let elements = self.wait_for_elements(&page, selector).await?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromeElement { inner: element }) as Box<dyn Element>)
            .collect())
    }

    fn set_implicit_wait(&self, wait: Duration) {
        *self.implicit_wait.lock() = wait;
    }

    fn implicit_wait(&self) -> Duration {
        *self.implicit_wait.lock()
    }
}

/// chromiumoxide元素的包装
struct ChromeElement {
    inner: chromiumoxide::Element,
}

#[async_trait]
impl Element for ChromeElement {
    async fn text(&self) -> Result<String, SessionError> {
        Ok(self.inner.inner_text().await?.unwrap_or_default())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError> {
        Ok(self.inner.attribute(name).await?)
    }

    async fn find(&self, selector: &str) -> Result<Box<dyn Element>, SessionError> {
        let element = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| SessionError::NotFound(selector.to_string()))?;
        Ok(Box::new(ChromeElement { inner: element }))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, SessionError> {
        let elements = self.inner.find_elements(selector).await?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromeElement { inner: element }) as Box<dyn Element>)
            .collect())
    }

    async fn is_displayed(&self) -> bool {
        let probe = "function() { \
             const rect = this.getBoundingClientRect(); \
             return rect.width > 0 && rect.height > 0; \
         }";
        match self.inner.call_js_fn(probe, false).await {
            Ok(ret) => matches!(ret.result.value, Some(serde_json::Value::Bool(true))),
            Err(_) => false,
        }
    }

    async fn scroll_into_view(&self) -> Result<(), SessionError> {
        self.inner.scroll_into_view().await?;
        Ok(())
    }

    async fn click_js(&self) -> Result<(), SessionError> {
        self.inner
            .call_js_fn("function() { this.click(); }", false)
            .await?;
        Ok(())
    }
}
