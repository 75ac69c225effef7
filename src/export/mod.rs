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

use crate::scraper::record::ItemRecord;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

/// 将记录导出为xlsx工作簿
///
/// 空记录集不产生文件。表头取首条记录的字段顺序；后续
/// 记录缺失的列写空串，首条记录之外新增的字段不会出现在
/// 表中（已知的有损导出行为，调用方应保证字段集一致）。
pub fn export(records: &[ItemRecord], path: &Path) -> Result<(), XlsxError> {
    if records.is_empty() {
        return Ok(());
    }

    let (headers, rows) = sheet_grid(records);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, header.as_str())?;
    }
    for (row_index, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_index as u32 + 1, col as u16, value.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// 表头与数据网格；列集固定为首条记录的键
fn sheet_grid(records: &[ItemRecord]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers: Vec<String> = records[0].keys().map(str::to_string).collect();
    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|header| record.get(header).unwrap_or("").to_string())
                .collect()
        })
        .collect();
    (headers, rows)
}
