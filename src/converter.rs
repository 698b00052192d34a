//! Converter Module
//!
//! 1つのセル値をBS暦の日付として解釈し、西暦（AD）の`DD/MM/YYYY`文字列に変換するモジュール。
//!
//! 変換に失敗したセルは[`Absent`]として返され、エラーが呼び出し元に伝播することはありません。

use crate::api::ColumnReport;
use crate::calendar;
use crate::error::Bs2AdError;
use crate::table::{Table, DEFAULT_OUTPUT_COLUMN};
use crate::types::{Absent, AbsentReason, CellValue, ParsedTriple, YearMonthDay};

/// 先頭の値がこれより大きければ年が先頭にあるとみなす（デフォルト値）
pub const DEFAULT_YEAR_FIRST_THRESHOLD: i64 = 2000;

/// 出力する日付の書式
const OUTPUT_FORMAT: &str = "%d/%m/%Y";

/// セル単位のBS→AD変換器
///
/// 状態を持たないため、複数スレッドから共有して使用できます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConverter {
    year_first_threshold: i64,
}

impl Default for DateConverter {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR_FIRST_THRESHOLD)
    }
}

impl DateConverter {
    /// 並び順判定の境界値を指定して生成する
    pub fn new(year_first_threshold: i64) -> Self {
        Self {
            year_first_threshold,
        }
    }

    /// 並び順判定の境界値
    pub fn year_first_threshold(&self) -> i64 {
        self.year_first_threshold
    }

    /// セル値を西暦の`DD/MM/YYYY`文字列に変換する
    ///
    /// # 処理の流れ
    ///
    /// 1. 空セルは`Absent`
    /// 2. ネイティブな日時は西暦とみなし、そのまま書式化する
    /// 3. それ以外は文字列表現を`/`または`-`で3つの整数に分割する
    /// 4. 先頭が境界値より大きければ（年, 月, 日）、そうでなければ（日, 月, 年）
    /// 5. BS暦の日付として検証し、西暦に変換する
    ///
    /// ```rust
    /// use bs2ad::{CellValue, DateConverter};
    ///
    /// let converter = DateConverter::default();
    /// assert_eq!(
    ///     converter.convert(&CellValue::from("2079/01/15")).as_deref(),
    ///     Ok("28/04/2022")
    /// );
    /// assert!(converter.convert(&CellValue::from("13/45/2079")).is_err());
    /// ```
    pub fn convert(&self, value: &CellValue) -> Result<String, Absent> {
        let text = match value {
            CellValue::Empty => return Err(Absent::new(AbsentReason::Missing)),
            CellValue::DateTime(dt) => return Ok(dt.format(OUTPUT_FORMAT).to_string()),
            other => other
                .as_text()
                .ok_or(Absent::new(AbsentReason::Missing))?,
        };

        if text.trim().is_empty() {
            return Err(Absent::new(AbsentReason::Missing));
        }

        let triple = ParsedTriple::parse(&text).ok_or(Absent::new(AbsentReason::Malformed))?;
        let ymd = YearMonthDay::resolve(triple, self.year_first_threshold)
            .ok_or(Absent::new(AbsentReason::InvalidDate))?;

        calendar::bs_to_ad(ymd.year, ymd.month, ymd.day)
            .map(|date| date.format(OUTPUT_FORMAT).to_string())
            .ok_or(Absent::new(AbsentReason::InvalidDate))
    }

    /// 列のすべてのセルを順に変換する
    ///
    /// 戻り値は入力と同じ長さ・同じ順序です。
    pub fn convert_all(&self, cells: &[CellValue]) -> Vec<Result<String, Absent>> {
        cells.iter().map(|cell| self.convert(cell)).collect()
    }

    /// `source`列を変換し、結果を`output`列として右隣に挿入する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ColumnReport)` - 変換結果の集計
    /// * `Err(Bs2AdError::ColumnNotFound)` - `source`列が存在しない
    pub fn convert_column(
        &self,
        table: &mut Table,
        source: &str,
        output: &str,
    ) -> Result<ColumnReport, Bs2AdError> {
        let results = {
            let column = table
                .column(source)
                .ok_or_else(|| Bs2AdError::ColumnNotFound(source.to_string()))?;
            self.convert_all(column.cells())
        };

        table.insert_converted_column(source, output, &results)?;
        Ok(ColumnReport::tally(source, output, &results))
    }
}

/// デフォルト設定で列を変換し、`English_Date`列を挿入する
///
/// ```rust
/// use bs2ad::{convert_column, CellValue, Table};
///
/// let mut table = Table::new("Sheet1");
/// table.push_column("Miti", vec![CellValue::from("2079/01/15"), CellValue::Empty]).unwrap();
///
/// let report = convert_column(&mut table, "Miti").unwrap();
/// assert_eq!(report.converted, 1);
/// assert_eq!(table.column_names(), vec!["Miti", "English_Date"]);
/// ```
pub fn convert_column(table: &mut Table, column: &str) -> Result<ColumnReport, Bs2AdError> {
    DateConverter::default().convert_column(table, column, DEFAULT_OUTPUT_COLUMN)
}
