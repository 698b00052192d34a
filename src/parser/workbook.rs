//! Workbook Parser
//!
//! calamineを使用してワークブックを開き、選択されたシートを[`Table`]として読み込みます。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{Cursor, Read};

use crate::api::SheetSelector;
use crate::error::Bs2AdError;
use crate::security::SecurityConfig;
use crate::table::Table;
use crate::types::CellValue;

/// ワークブックパーサー
///
/// calamineのラッパーとして、シート選択とテーブルへの変換を提供します。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズ上限を確認してからcalamineで解析します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - XLSXまたはXLSとして開けた場合
    /// * `Err(Bs2AdError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(Bs2AdError::Parse)` - スプレッドシートとして解析できない場合
    /// * `Err(Bs2AdError::UnsupportedFile)` - XLSX/XLS以外の形式の場合
    pub fn open<R: Read>(reader: R, security: &SecurityConfig) -> Result<Self, Bs2AdError> {
        // 上限+1バイトまで読めば超過を判定できる
        let mut buffer = Vec::new();
        reader
            .take(security.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;
        security.check_input_size(buffer.len() as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        match workbook {
            Sheets::Xlsx(_) | Sheets::Xls(_) => Ok(Self { workbook }),
            _ => Err(Bs2AdError::UnsupportedFile(
                "Only XLSX and XLS workbooks are supported".to_string(),
            )),
        }
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシート名を決定する
    ///
    /// * `Err(Bs2AdError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, Bs2AdError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                Bs2AdError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if names.iter().any(|n| n == name) {
                    Ok(name.clone())
                } else {
                    Err(Bs2AdError::Config(format!("Sheet '{}' not found", name)))
                }
            }
        }
    }

    /// シートをテーブルとして読み込む
    pub fn load_table(&mut self, sheet_name: &str) -> Result<Table, Bs2AdError> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        Ok(range_to_table(sheet_name, &range))
    }
}

/// 使用範囲をテーブルに変換する
///
/// 使用範囲の先頭行をヘッダーとします。使用範囲がA列から始まらない場合は、
/// 列位置がシート上と一致するよう先頭に空の列を補います。
fn range_to_table(sheet_name: &str, range: &Range<Data>) -> Table {
    let leading = range
        .start()
        .map(|(_, col)| col as usize)
        .unwrap_or(0);

    let mut rows = range.rows().map(|row| {
        std::iter::repeat(CellValue::Empty)
            .take(leading)
            .chain(row.iter().map(convert_cell))
            .collect::<Vec<_>>()
    });

    let header = rows.next().unwrap_or_default();
    Table::from_rows(sheet_name, header, rows.collect())
}

/// calamineのセル値を[`CellValue`]に変換する
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// ISO 8601形式の日時（ODS等で使用）を解析する
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
