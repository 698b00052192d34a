//! Detector Module
//!
//! テーブルの中からBS暦の日付を含む列を推定するモジュール。
//!
//! 変換器の並び順判定（先頭 > 2000）とは意図的に異なる、緩い判定
//! （先頭または末尾 >= 2000）を使用します。ここでは「日付らしい列」を
//! 見つけられれば十分で、年月日の順序を決める必要はないためです。

use crate::table::Table;
use crate::types::ParsedTriple;

/// 年とみなす値の下限（デフォルト値）
pub const DEFAULT_DETECTION_THRESHOLD: i64 = 2000;

/// 日付列の検出器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDetector {
    threshold: i64,
}

impl Default for ColumnDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DETECTION_THRESHOLD)
    }
}

impl ColumnDetector {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// セルの文字列が日付らしいかどうか
    ///
    /// 3つの整数に分割でき、先頭または末尾が閾値以上であれば`true`。
    pub fn looks_like_date(&self, text: &str) -> bool {
        ParsedTriple::parse(text)
            .map(|t| t.first() >= self.threshold || t.last() >= self.threshold)
            .unwrap_or(false)
    }

    /// 日付列を検出する
    ///
    /// 列を定義順に、各列のセルを行順に走査し、最初に条件を満たしたセルを含む列の名前を返します。
    /// どの列も該当しない場合は`None`（エラーではありません）。
    ///
    /// ```rust
    /// use bs2ad::{CellValue, ColumnDetector, Table};
    ///
    /// let mut table = Table::new("Sheet1");
    /// table.push_column("A", vec![CellValue::from("foo"), CellValue::from("bar")]).unwrap();
    /// table.push_column("B", vec![CellValue::from("01/01/2079"), CellValue::from("02/02/2080")]).unwrap();
    ///
    /// assert_eq!(ColumnDetector::default().detect(&table).as_deref(), Some("B"));
    /// ```
    pub fn detect(&self, table: &Table) -> Option<String> {
        table
            .columns()
            .iter()
            .find(|column| {
                column.cells().iter().any(|cell| {
                    cell.as_text()
                        .map(|text| self.looks_like_date(&text))
                        .unwrap_or(false)
                })
            })
            .map(|column| column.name().to_string())
    }
}

/// デフォルトの閾値で日付列を検出する
pub fn detect_date_column(table: &Table) -> Option<String> {
    ColumnDetector::default().detect(table)
}
