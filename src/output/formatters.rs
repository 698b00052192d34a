//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use std::io::Write;

use crate::error::Bs2AdError;
use crate::table::Table;
use crate::types::CellValue;

/// ネイティブな日時セルに適用する表示形式
const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// XLSX形式のフォーマッター
///
/// 1行目にヘッダー、2行目以降にデータを書き出します。シート名はテーブルのものを使用します。
pub(crate) struct XlsxFormatter;

impl XlsxFormatter {
    pub fn render<W: Write>(&self, table: &Table, writer: &mut W) -> Result<(), Bs2AdError> {
        let mut workbook = Workbook::new();
        let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        let worksheet = workbook.add_worksheet();
        if !table.sheet_name().is_empty() {
            worksheet.set_name(table.sheet_name())?;
        }

        for (col_idx, column) in table.columns().iter().enumerate() {
            let col = to_col_num(col_idx)?;
            worksheet.write_string(0, col, column.name())?;

            for (row_idx, cell) in column.cells().iter().enumerate() {
                let row = to_row_num(row_idx + 1)?;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(s) => {
                        worksheet.write_string(row, col, s)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(row, col, *n)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row, col, *b)?;
                    }
                    CellValue::DateTime(dt) => {
                        worksheet.write_datetime_with_format(row, col, dt, &datetime_format)?;
                    }
                    CellValue::Error(e) => {
                        worksheet.write_string(row, col, e)?;
                    }
                }
            }
        }

        let buffer = workbook.save_to_buffer()?;
        writer.write_all(&buffer)?;
        writer.flush()?;
        Ok(())
    }
}

/// CSV形式のフォーマッター
pub(crate) struct CsvFormatter;

impl CsvFormatter {
    pub fn render<W: Write>(&self, table: &Table, writer: &mut W) -> Result<(), Bs2AdError> {
        if table.column_count() == 0 {
            return Ok(());
        }

        let header: Vec<String> = table
            .columns()
            .iter()
            .map(|c| escape_csv(c.name()))
            .collect();
        writeln!(writer, "{}", header.join(","))?;

        for row_idx in 0..table.row_count() {
            let fields: Vec<String> = table
                .columns()
                .iter()
                .map(|column| {
                    column
                        .cells()
                        .get(row_idx)
                        .and_then(CellValue::as_text)
                        .map(|text| escape_csv(&text))
                        .unwrap_or_default()
                })
                .collect();
            writeln!(writer, "{}", fields.join(","))?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn to_row_num(idx: usize) -> Result<RowNum, Bs2AdError> {
    RowNum::try_from(idx)
        .map_err(|_| Bs2AdError::Config(format!("Row {} exceeds the XLSX row limit", idx)))
}

fn to_col_num(idx: usize) -> Result<ColNum, Bs2AdError> {
    ColNum::try_from(idx)
        .map_err(|_| Bs2AdError::Config(format!("Column {} exceeds the XLSX column limit", idx)))
}

/// CSV文字列をエスケープ
///
/// ダブルクォート、改行、カンマを含む場合はダブルクォートで囲み、
/// 内部のダブルクォートは2つにエスケープします。
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
