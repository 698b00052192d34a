//! Public API Types
//!
//! 公開APIで使用する列挙型と結果型を定義するモジュール。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{Absent, AbsentReason};

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// インデックス指定（0始まり）
    ///
    /// デフォルトは`Index(0)`（最初のシート）です。
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// XLSX形式（デフォルト）
    ///
    /// ネイティブな日時セルは日付として書き出され、シート名も保持されます。
    #[default]
    Xlsx,

    /// CSV形式
    ///
    /// ```csv
    /// Name,Miti,English_Date
    /// Ram,2079/01/15,28/04/2022
    /// ```
    Csv,
}

impl OutputFormat {
    /// 出力ファイルの拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

/// 変換対象の列の指定方法
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    /// 日付列を自動検出する
    #[default]
    Auto,

    /// 列名を明示的に指定する（検出は行わない）
    Named(String),
}

impl From<Option<String>> for ColumnSelection {
    fn from(value: Option<String>) -> Self {
        value.map(ColumnSelection::Named).unwrap_or_default()
    }
}

/// 1列分の変換結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    /// 変換元の列名
    pub source_column: String,
    /// 追加した列名
    pub output_column: String,
    /// 行数
    pub rows: usize,
    /// 変換に成功したセル数
    pub converted: usize,
    /// 空セルの数
    pub missing: usize,
    /// 日付として解析できなかったセル数
    pub malformed: usize,
    /// BS暦として不正、またはサポート範囲外だったセル数
    pub invalid: usize,
}

impl ColumnReport {
    pub(crate) fn tally(
        source_column: &str,
        output_column: &str,
        results: &[Result<String, Absent>],
    ) -> Self {
        let mut report = ColumnReport {
            source_column: source_column.to_string(),
            output_column: output_column.to_string(),
            rows: results.len(),
            ..Default::default()
        };
        for result in results {
            match result {
                Ok(_) => report.converted += 1,
                Err(absent) => match absent.reason {
                    AbsentReason::Missing => report.missing += 1,
                    AbsentReason::Malformed => report.malformed += 1,
                    AbsentReason::InvalidDate => report.invalid += 1,
                },
            }
        }
        report
    }

    /// 変換できなかったセル数（空セルを含む）
    pub fn absent(&self) -> usize {
        self.rows.saturating_sub(self.converted)
    }
}

/// ワークブック変換の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// 対象シート名
    pub sheet: String,
    /// 列が自動検出されたかどうか
    pub detected: bool,
    /// 列ごとの集計
    #[serde(flatten)]
    pub column: ColumnReport,
    /// 出力ファイルのパス（ファイルに書き出した場合）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// 変換処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// 変換して出力した
    Converted(ConversionReport),

    /// 日付列が検出できなかった
    ///
    /// 何も出力されていません。呼び出し元は`columns`から列を選び、
    /// [`ColumnSelection::Named`]で再度変換する必要があります。
    NeedsColumnSelection {
        /// 選択可能な列名
        columns: Vec<String>,
    },
}

impl ConversionOutcome {
    /// 変換済みの場合はレポートを返す
    pub fn report(&self) -> Option<&ConversionReport> {
        match self {
            ConversionOutcome::Converted(report) => Some(report),
            ConversionOutcome::NeedsColumnSelection { .. } => None,
        }
    }
}
