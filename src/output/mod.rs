//! Output Format Module
//!
//! Strategy Patternによる出力フォーマットの抽象化を提供するモジュール。

mod formatters;

use crate::api::OutputFormat;
use crate::error::Bs2AdError;
use crate::table::Table;
use std::io::Write;

pub(crate) use formatters::{CsvFormatter, XlsxFormatter};

/// 出力フォーマッター（Strategy Pattern）
///
/// 各出力フォーマット（XLSX, CSV）をenumとして表現します。
#[derive(Debug, Clone, Copy)]
pub(crate) enum OutputFormatter {
    Xlsx,
    Csv,
}

impl OutputFormatter {
    /// 出力フォーマットからフォーマッターを生成
    pub fn from_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Xlsx => OutputFormatter::Xlsx,
            OutputFormat::Csv => OutputFormatter::Csv,
        }
    }

    /// テーブルを指定されたフォーマットで出力する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(Bs2AdError)` - 書き出しに失敗した場合
    pub fn render<W: Write>(&self, table: &Table, writer: &mut W) -> Result<(), Bs2AdError> {
        match self {
            OutputFormatter::Xlsx => XlsxFormatter.render(table, writer),
            OutputFormatter::Csv => CsvFormatter.render(table, writer),
        }
    }
}
