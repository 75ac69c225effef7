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
use crate::scraper::record::ItemRecord;
use crate::session::{Session, SessionError};
use chrono::Utc;
use std::time::Duration;
use tracing::warn;

/// 详情页简介容器
pub const DESCRIPTION_SELECTOR: &str = ".page-intro";
/// 详情页分类标签列表
pub const CATEGORY_SELECTOR: &str = "ul.post-categories > li";
/// 页头下方的外部链接
pub const HEADER_LINK_SELECTOR: &str = ".page-header-cta > a";

/// 抓取单个条目的详情页
///
/// 在新标签页打开详情页并提取字段；单个字段缺失只记录
/// 警告并写入空值，不中断整条记录。完成后关闭标签页并
/// 切回列表页。
///
/// # 参数
///
/// * `rank` - 条目在分类内的零基序号
/// * `name` - 列表卡片上的条目名称
/// * `url` - 详情页URL
/// * `category` - 所属分类名
/// * `icon_url` - 列表卡片上的图标URL
///
/// # 返回值
///
/// * `Ok(ItemRecord)` - 提取到的记录
/// * `Err(SessionError)` - 标签页操作失败，由调用方决定是否跳过
pub async fn extract_item(
    session: &dyn Session,
    settings: &Settings,
    rank: usize,
    name: &str,
    url: &str,
    category: &str,
    icon_url: &str,
) -> Result<ItemRecord, SessionError> {
    let listing_tab = session.current_tab().await?;
    session.open_in_new_tab(url).await?;
    session.switch_to_latest_tab().await?;

    // 详情页字段多为可选，缩短隐式等待以降低缺失字段的开销
    let page_wait = session.implicit_wait();
    session.set_implicit_wait(Duration::from_millis(settings.browser.detail_wait_millis));

    let mut record = ItemRecord::new();
    record.insert(
        "ListingScrapeDate",
        Utc::now().format("%Y-%m-%d").to_string(),
    );
    // 站点不公开卖家名
    record.insert("ListingSellerName", "");
    record.insert("ListingRank", format!("{} - {}", category, rank + 1));
    record.insert("Listing URL", url);
    record.insert("ListingName", name);
    record.insert("Icon URL", icon_url);

    match session.find(DESCRIPTION_SELECTOR).await {
        Ok(element) => match element.text().await {
            Ok(text) => record.insert("Short Description", text),
            Err(e) => {
                record.insert("Short Description", "");
                warn!("{}: Short Description not found - {}", name, e);
            }
        },
        Err(e) => {
            record.insert("Short Description", "");
            warn!("{}: Short Description not found - {}", name, e);
        }
    }

    record.insert("Category 1", "");
    record.insert("Category 2", "");
    match read_categories(session, &mut record).await {
        Ok(()) => {}
        Err(e) => warn!("{}: Categories not found - {}", name, e),
    }

    record.insert("Visit Website URL", "");
    record.insert("View documentation URL", "");
    if let Err(e) = read_header_links(session, &mut record).await {
        warn!("{}: Visit Website and Document URL not found - {}", name, e);
    }

    tokio::time::sleep(Duration::from_secs(settings.crawl.detail_settle_secs)).await;
    session.set_implicit_wait(page_wait);
    session.close_current_tab().await?;
    session.switch_to_tab(listing_tab).await?;

    Ok(record)
}

/// 分类标签按出现顺序写为 Category 1..N
async fn read_categories(
    session: &dyn Session,
    record: &mut ItemRecord,
) -> Result<(), SessionError> {
    let labels = session.find_all(CATEGORY_SELECTOR).await?;
    for (index, label) in labels.iter().enumerate() {
        let text = label.text().await?;
        record.insert(format!("Category {}", index + 1), text.trim());
    }
    Ok(())
}

/// 页头外部链接的归类规则
///
/// 恰好两个链接时依次为官网与文档；仅一个时按链接文本是否
/// 含 "Documentation" 归类；没有链接视作查找失败，两个字段
/// 保持为空。该启发式与站点当前布局绑定，不做进一步推断。
async fn read_header_links(
    session: &dyn Session,
    record: &mut ItemRecord,
) -> Result<(), SessionError> {
    let links = session.find_all(HEADER_LINK_SELECTOR).await?;
    if links.len() == 2 {
        record.insert(
            "Visit Website URL",
            links[0].attr("href").await?.unwrap_or_default(),
        );
        record.insert(
            "View documentation URL",
            links[1].attr("href").await?.unwrap_or_default(),
        );
        return Ok(());
    }

    let first = links
        .first()
        .ok_or_else(|| SessionError::NotFound(HEADER_LINK_SELECTOR.to_string()))?;
    let href = first.attr("href").await?.unwrap_or_default();
    if first.text().await?.contains("Documentation") {
        record.insert("View documentation URL", href);
    } else {
        record.insert("Visit Website URL", href);
    }
    Ok(())
}
