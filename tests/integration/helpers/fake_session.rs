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
use marketrs::config::settings::{BrowserSettings, CrawlSettings, Settings, SiteSettings};
use marketrs::scraper::{category, item, page};
use marketrs::session::{Element, Session, SessionError, TabId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 全零等待的测试配置
pub fn test_settings() -> Settings {
    Settings {
        site: SiteSettings {
            name: "TestSite".to_string(),
            start_url: "https://site.test/partners/".to_string(),
            task_file: "tasks.csv".to_string(),
        },
        browser: BrowserSettings {
            headless: true,
            implicit_wait_secs: 0,
            detail_wait_millis: 0,
            window_width: 1280,
            window_height: 800,
        },
        crawl: CrawlSettings {
            initial_load_secs: 0,
            page_settle_secs: 0,
            item_pause_secs: 0,
            detail_settle_secs: 0,
            click_attempts: 2,
            click_backoff_secs: 0,
            max_pages: 50,
        },
    }
}

/// 详情页脚本
#[derive(Clone, Default)]
pub struct FakeItemPage {
    pub description: Option<String>,
    pub categories: Vec<String>,
    pub links: Vec<FakeLink>,
}

#[derive(Clone)]
pub struct FakeLink {
    pub href: String,
    pub text: String,
}

/// 列表页卡片脚本；broken 卡片缺少标题链接，应被跳过
#[derive(Clone)]
pub struct FakeCard {
    pub name: String,
    pub url: String,
    pub icon: String,
    pub broken: bool,
}

impl FakeCard {
    pub fn good(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            icon: format!("{}/icon.png", url),
            broken: false,
        }
    }

    pub fn broken() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            icon: String::new(),
            broken: true,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeListingPage {
    pub cards: Vec<FakeCard>,
}

/// 站点脚本：分页的列表页序列加按URL索引的详情页
#[derive(Clone, Default)]
pub struct FakeSite {
    pub listing_pages: Vec<FakeListingPage>,
    pub items: HashMap<String, FakeItemPage>,
    /// true 时翻页控件永不消失，用于验证翻页上限
    pub sticky_next: bool,
}

impl FakeSite {
    /// 每个列表页给定数量的卡片，并为每张卡片生成完整的详情页
    pub fn with_pages(card_counts: &[usize]) -> Self {
        let mut site = FakeSite::default();
        let mut serial = 0usize;
        for &count in card_counts {
            let mut cards = Vec::new();
            for _ in 0..count {
                serial += 1;
                let url = format!("https://site.test/item/{}", serial);
                cards.push(FakeCard::good(&format!("Item {}", serial), &url));
                site.items.insert(
                    url,
                    FakeItemPage {
                        description: Some(format!("Description {}", serial)),
                        categories: vec!["Email".to_string()],
                        links: vec![
                            FakeLink {
                                href: "https://vendor.test/".to_string(),
                                text: "Visit Website".to_string(),
                            },
                            FakeLink {
                                href: "https://vendor.test/docs".to_string(),
                                text: "Documentation".to_string(),
                            },
                        ],
                    },
                );
            }
            site.listing_pages.push(FakeListingPage { cards });
        }
        site
    }
}

#[derive(Clone)]
enum TabKind {
    Blank,
    Listing,
    Item(String),
}

struct State {
    page_index: usize,
    tabs: Vec<(TabId, TabKind)>,
    current: Option<TabId>,
    next_tab_id: TabId,
    implicit_wait: Duration,
}

/// 纯内存会话，按站点脚本应答选择器查询
pub struct FakeSession {
    site: FakeSite,
    state: Arc<Mutex<State>>,
}

impl FakeSession {
    pub fn new(site: FakeSite) -> Self {
        let state = State {
            page_index: 0,
            tabs: vec![(1, TabKind::Blank)],
            current: Some(1),
            next_tab_id: 2,
            implicit_wait: Duration::ZERO,
        };
        Self {
            site,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// 仍然打开的标签页数量
    pub fn open_tabs(&self) -> usize {
        self.state.lock().tabs.len()
    }

    fn current_kind(&self) -> Result<TabKind, SessionError> {
        let state = self.state.lock();
        let current = state.current.ok_or(SessionError::NoActiveTab)?;
        state
            .tabs
            .iter()
            .find(|(id, _)| *id == current)
            .map(|(_, kind)| kind.clone())
            .ok_or(SessionError::UnknownTab(current))
    }

    fn listing_cards(&self) -> Vec<FakeCard> {
        let index = self.state.lock().page_index;
        match self.site.listing_pages.get(index) {
            Some(listing) => listing.cards.clone(),
            None => Vec::new(),
        }
    }

    fn has_next(&self) -> bool {
        let index = self.state.lock().page_index;
        self.site.sticky_next || index + 1 < self.site.listing_pages.len()
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn open_url(&self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn open_in_new_tab(&self, url: &str) -> Result<(), SessionError> {
        let kind = if self.site.items.contains_key(url) {
            TabKind::Item(url.to_string())
        } else {
            self.state.lock().page_index = 0;
            TabKind::Listing
        };
        let mut state = self.state.lock();
        let id = state.next_tab_id;
        state.next_tab_id += 1;
        state.tabs.push((id, kind));
        Ok(())
    }

    async fn current_tab(&self) -> Result<TabId, SessionError> {
        self.state.lock().current.ok_or(SessionError::NoActiveTab)
    }

    async fn switch_to_latest_tab(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        let latest = state.tabs.last().map(|(id, _)| *id);
        match latest {
            Some(id) => {
                state.current = Some(id);
                Ok(())
            }
            None => Err(SessionError::NoActiveTab),
        }
    }

    async fn switch_to_tab(&self, tab: TabId) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.tabs.iter().any(|(id, _)| *id == tab) {
            state.current = Some(tab);
            Ok(())
        } else {
            Err(SessionError::UnknownTab(tab))
        }
    }

    async fn close_current_tab(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        let current = state.current.ok_or(SessionError::NoActiveTab)?;
        let index = state
            .tabs
            .iter()
            .position(|(id, _)| *id == current)
            .ok_or(SessionError::UnknownTab(current))?;
        state.tabs.remove(index);
        state.current = None;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Box<dyn Element>, SessionError> {
        match self.current_kind()? {
            TabKind::Item(url) if selector == item::DESCRIPTION_SELECTOR => {
                let item_page = &self.site.items[&url];
                match &item_page.description {
                    Some(text) => Ok(Box::new(FakeElement::Text(text.clone()))),
                    None => Err(SessionError::NotFound(selector.to_string())),
                }
            }
            _ => Err(SessionError::NotFound(selector.to_string())),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, SessionError> {
        match self.current_kind()? {
            TabKind::Listing if selector == page::CARD_SELECTOR => Ok(self
                .listing_cards()
                .into_iter()
                .map(|card| Box::new(FakeElement::Card(card)) as Box<dyn Element>)
                .collect()),
            TabKind::Listing if selector == category::NEXT_PAGE_SELECTOR => {
                if self.has_next() {
                    Ok(vec![Box::new(FakeElement::NextButton {
                        state: Arc::clone(&self.state),
                        page_cap: self.site.listing_pages.len(),
                    })])
                } else {
                    Ok(Vec::new())
                }
            }
            TabKind::Item(url) if selector == item::CATEGORY_SELECTOR => Ok(self.site.items[&url]
                .categories
                .iter()
                .map(|label| Box::new(FakeElement::Text(label.clone())) as Box<dyn Element>)
                .collect()),
            TabKind::Item(url) if selector == item::HEADER_LINK_SELECTOR => Ok(self.site.items
                [&url]
                .links
                .iter()
                .map(|link| Box::new(FakeElement::Link(link.clone())) as Box<dyn Element>)
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    fn set_implicit_wait(&self, wait: Duration) {
        self.state.lock().implicit_wait = wait;
    }

    fn implicit_wait(&self) -> Duration {
        self.state.lock().implicit_wait
    }
}

enum FakeElement {
    Text(String),
    Link(FakeLink),
    Icon(String),
    Card(FakeCard),
    NextButton {
        state: Arc<Mutex<State>>,
        page_cap: usize,
    },
}

#[async_trait]
impl Element for FakeElement {
    async fn text(&self) -> Result<String, SessionError> {
        match self {
            FakeElement::Text(text) => Ok(text.clone()),
            FakeElement::Link(link) => Ok(link.text.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError> {
        match self {
            FakeElement::Link(link) if name == "href" => Ok(Some(link.href.clone())),
            FakeElement::Icon(src) if name == "src" => Ok(Some(src.clone())),
            _ => Ok(None),
        }
    }

    async fn find(&self, selector: &str) -> Result<Box<dyn Element>, SessionError> {
        match self {
            FakeElement::Card(card) if selector == page::CARD_TITLE_SELECTOR => {
                if card.broken {
                    Err(SessionError::NotFound(selector.to_string()))
                } else {
                    Ok(Box::new(FakeElement::Link(FakeLink {
                        href: card.url.clone(),
                        text: card.name.clone(),
                    })))
                }
            }
            FakeElement::Card(card) if selector == page::CARD_ICON_SELECTOR => {
                Ok(Box::new(FakeElement::Icon(card.icon.clone())))
            }
            _ => Err(SessionError::NotFound(selector.to_string())),
        }
    }

    async fn find_all(&self, _selector: &str) -> Result<Vec<Box<dyn Element>>, SessionError> {
        Ok(Vec::new())
    }

    async fn is_displayed(&self) -> bool {
        true
    }

    async fn scroll_into_view(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn click_js(&self) -> Result<(), SessionError> {
        if let FakeElement::NextButton { state, page_cap } = self {
            let mut state = state.lock();
            let last = page_cap.saturating_sub(1);
            state.page_index = (state.page_index + 1).min(last);
        }
        Ok(())
    }
}
