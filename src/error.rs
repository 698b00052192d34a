//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! セル単位の変換失敗はここには含まれない（[`crate::Absent`]を参照）。
//! このエラー型が表すのは、テーブル構造や入出力に関わる失敗のみです。

use thiserror::Error;

/// bs2adクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: スプレッドシートの解析中に発生したエラー（calamine由来）
/// - `Write`: XLSX出力中に発生したエラー（rust_xlsxwriter由来）
/// - `Config`: 設定の検証に失敗したエラー
/// - `ColumnNotFound`: 指定された列が存在しない
/// - `RowCountMismatch`: 変換結果の件数がテーブルの行数と一致しない
/// - `UnsupportedFile`: 受け付けないファイル名・拡張子
/// - `SecurityViolation`: 入力サイズ制限などに違反した
///
/// # 使用例
///
/// ```rust,no_run
/// use bs2ad::Bs2AdError;
/// use std::fs::File;
///
/// fn open_sheet(path: &str) -> Result<(), Bs2AdError> {
///     let _file = File::open(path)?; // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Bs2AdError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー
    ///
    /// ファイル形式が不正、破損したファイル、シートが存在しないなどが原因となります。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// XLSXファイルの書き出し中に発生したエラー
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時、または設定ファイルの読み込み時に発生します。
    ///
    /// ```rust,no_run
    /// use bs2ad::{ConverterBuilder, Bs2AdError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_output_column("")
    ///     .build();
    ///
    /// if let Err(Bs2AdError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 指定された列がテーブルに存在しない
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// 挿入する列の件数がテーブルの行数と一致しない
    ///
    /// 変換元と変換結果の対応関係が崩れていることを示すため、
    /// 黙って受け入れずにエラーとして報告します。
    #[error("Row count mismatch: table has {expected} rows, got {actual} values")]
    RowCountMismatch {
        /// テーブルの行数
        expected: usize,
        /// 渡された値の件数
        actual: usize,
    },

    /// 受け付けないファイル（拡張子が許可されていない、ファイル名が空など）
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限を超えた場合などに発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl Bs2AdError {
    /// 設定ファイルの解析エラーを`Config`に変換する
    pub(crate) fn from_toml(err: toml::de::Error) -> Self {
        Bs2AdError::Config(format!("Invalid config file: {}", err))
    }
}
