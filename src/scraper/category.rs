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
use crate::scraper::page::walk_page;
use crate::scraper::record::ItemRecord;
use crate::session::{scroll_and_click, Element, Session, SessionError};
use std::time::Duration;
use tracing::{info, warn};

/// 翻页控件
pub const NEXT_PAGE_SELECTOR: &str = ".facetwp-page.next";

/// 遍历一个分类的全部列表页
///
/// 在新标签页打开分类URL，只要翻页控件存在且可见就逐页
/// 遍历并点击翻页；控件消失后再走最后一页（末页没有翻页
/// 控件）。排名偏移按每页实际产出的记录数推进。翻页数受
/// `max_pages` 上限保护，控件不消失时提前结束而不是无限
/// 循环。结束后关闭分类标签页并切回先前的标签页。
pub async fn walk_category(
    session: &dyn Session,
    settings: &Settings,
    category: &str,
    url: &str,
) -> Result<Vec<ItemRecord>, SessionError> {
    session.open_in_new_tab(url).await?;
    session.switch_to_latest_tab().await?;
    tokio::time::sleep(Duration::from_secs(settings.crawl.page_settle_secs)).await;

    let mut records = Vec::new();
    let mut rank_offset = 0usize;
    let mut page_count = 1u32;

    let mut next = visible_next(session).await?;
    while let Some(button) = next {
        if page_count > settings.crawl.max_pages {
            warn!(
                "{}: pagination did not terminate after {} pages, stopping early",
                category, settings.crawl.max_pages
            );
            break;
        }

        let page_records = walk_page(session, settings, category, rank_offset).await?;
        rank_offset += page_records.len();
        records.extend(page_records);

        scroll_and_click(
            button.as_ref(),
            settings.crawl.click_attempts,
            Duration::from_secs(settings.crawl.click_backoff_secs),
        )
        .await;
        next = visible_next(session).await?;

        info!("Scraping {} on page {}", category, page_count);
        page_count += 1;
    }

    let page_records = walk_page(session, settings, category, rank_offset).await?;
    records.extend(page_records);
    info!("{} done", category);

    session.close_current_tab().await?;
    session.switch_to_latest_tab().await?;

    Ok(records)
}

/// 翻页控件存在且可见时返回它
async fn visible_next(session: &dyn Session) -> Result<Option<Box<dyn Element>>, SessionError> {
    let buttons = session.find_all(NEXT_PAGE_SELECTOR).await?;
    let Some(button) = buttons.into_iter().next() else {
        return Ok(None);
    };
    if button.is_displayed().await {
        Ok(Some(button))
    } else {
        Ok(None)
    }
}
