//! Table Module
//!
//! 名前付きの列からなるテーブル構造を提供するモジュール。
//! 読み込み時の列順序を保持し、変換結果の列を元の列の右隣に挿入します。

use std::collections::HashSet;

use crate::error::Bs2AdError;
use crate::types::{format_number, Absent, CellValue};

/// 変換結果として追加される列のデフォルト名
pub const DEFAULT_OUTPUT_COLUMN: &str = "English_Date";

/// 名前付きの列
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// 1枚のシートを表すテーブル
///
/// すべての列は同じ行数を持ちます（ヘッダー行は含まない）。
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    sheet_name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// 空のテーブルを生成
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// ヘッダー行とデータ行からテーブルを構築する
    ///
    /// 列数はヘッダーとデータ行のうち最も長いものに合わせ、
    /// 足りないセルは空セルで埋めます。列名は[`unique_headers`]で正規化されます。
    pub fn from_rows(
        sheet_name: impl Into<String>,
        header: Vec<CellValue>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let names = unique_headers(&header, width);
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        let row_count = rows.len();
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(CellValue::Empty));
            }
        }

        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: row_count,
        }
    }

    /// 列を末尾に追加する
    ///
    /// 最初の列が行数を決定します。以降の列の長さが異なる場合はエラー。
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        cells: Vec<CellValue>,
    ) -> Result<(), Bs2AdError> {
        if self.columns.is_empty() {
            self.rows = cells.len();
        } else if cells.len() != self.rows {
            return Err(Bs2AdError::RowCountMismatch {
                expected: self.rows,
                actual: cells.len(),
            });
        }
        self.columns.push(Column::new(name, cells));
        Ok(())
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// 列名から位置を取得（同名の列がある場合は最初のもの）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// 指定位置のセル（範囲外は`None`）
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.columns.get(col).and_then(|c| c.cells.get(row))
    }

    /// `source`列の右隣に新しい列を挿入する
    ///
    /// # 戻り値
    ///
    /// * `Ok(usize)` - 挿入された列の位置
    /// * `Err(Bs2AdError::ColumnNotFound)` - `source`列が存在しない
    /// * `Err(Bs2AdError::RowCountMismatch)` - `cells`の件数が行数と一致しない
    ///
    /// エラーの場合、テーブルは変更されません。
    /// 挿入する列名の重複はチェックしません。
    pub fn insert_column_after(
        &mut self,
        source: &str,
        name: impl Into<String>,
        cells: Vec<CellValue>,
    ) -> Result<usize, Bs2AdError> {
        let index = self
            .column_index(source)
            .ok_or_else(|| Bs2AdError::ColumnNotFound(source.to_string()))?;

        if cells.len() != self.rows {
            return Err(Bs2AdError::RowCountMismatch {
                expected: self.rows,
                actual: cells.len(),
            });
        }

        self.columns.insert(index + 1, Column::new(name, cells));
        Ok(index + 1)
    }

    /// 変換結果を`source`列の右隣に挿入する
    ///
    /// `Absent`は空セルとして格納されます。
    pub fn insert_converted_column(
        &mut self,
        source: &str,
        name: impl Into<String>,
        converted: &[Result<String, Absent>],
    ) -> Result<usize, Bs2AdError> {
        let cells = converted
            .iter()
            .map(|result| match result {
                Ok(date) => CellValue::Text(date.clone()),
                Err(_) => CellValue::Empty,
            })
            .collect();
        self.insert_column_after(source, name, cells)
    }
}

/// ヘッダー行から重複のない列名を作る
///
/// - 空のヘッダーは`Unnamed: <列番号>`
/// - 数値のヘッダーは整数なら小数点なし
/// - 重複した名前には`.1`, `.2`, ... を付与
pub fn unique_headers(header: &[CellValue], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(width);

    for idx in 0..width {
        let base = match header.get(idx) {
            None | Some(CellValue::Empty) => format!("Unnamed: {}", idx),
            Some(CellValue::Number(n)) => format_number(*n),
            Some(other) => {
                let text = other.as_text().unwrap_or_default();
                if text.trim().is_empty() {
                    format!("Unnamed: {}", idx)
                } else {
                    text.into_owned()
                }
            }
        };

        let mut name = base.clone();
        let mut counter = 0;
        while seen.contains(&name) {
            counter += 1;
            name = format!("{}.{}", base, counter);
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}
