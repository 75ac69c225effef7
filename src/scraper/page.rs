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
use crate::scraper::item::extract_item;
use crate::scraper::record::ItemRecord;
use crate::session::{Element, Session, SessionError};
use std::time::Duration;
use tracing::error;

/// 列表页上的条目卡片
pub const CARD_SELECTOR: &str = ".row.facetwp-template > article";
/// 卡片内的标题链接
pub const CARD_TITLE_SELECTOR: &str = ".entry-title > a";
/// 卡片内的图标
pub const CARD_ICON_SELECTOR: &str = "img";

/// 遍历当前列表页上的全部条目卡片
///
/// 每张卡片读取标题链接与图标后进入详情页提取；卡片级
/// 失败记录日志后跳过，不影响本页其余条目。成功的条目
/// 之间保持固定间隔，避免触发站点的频率防护。
///
/// # 参数
///
/// * `category` - 分类名，用于排名标签与日志
/// * `rank_offset` - 本页第一张卡片的零基排名偏移
pub async fn walk_page(
    session: &dyn Session,
    settings: &Settings,
    category: &str,
    rank_offset: usize,
) -> Result<Vec<ItemRecord>, SessionError> {
    let cards = session.find_all(CARD_SELECTOR).await?;
    let mut records = Vec::new();

    for (index, card) in cards.iter().enumerate() {
        let rank = rank_offset + index;
        match scrape_card(session, settings, card.as_ref(), category, rank).await {
            Ok(record) => records.push(record),
            Err(e) => {
                error!("Error in {} at {} - {}", category, rank, e);
                continue;
            }
        }
        tokio::time::sleep(Duration::from_secs(settings.crawl.item_pause_secs)).await;
    }

    Ok(records)
}

async fn scrape_card(
    session: &dyn Session,
    settings: &Settings,
    card: &dyn Element,
    category: &str,
    rank: usize,
) -> Result<ItemRecord, SessionError> {
    let title = card.find(CARD_TITLE_SELECTOR).await?;
    let url = title
        .attr("href")
        .await?
        .ok_or_else(|| SessionError::NotFound("card title href".to_string()))?;
    let name = title.text().await?;
    let icon = card
        .find(CARD_ICON_SELECTOR)
        .await?
        .attr("src")
        .await?
        .unwrap_or_default();

    extract_item(session, settings, rank, &name, &url, category, &icon).await
}
