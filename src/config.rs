//! Config File Module
//!
//! TOML形式の設定ファイルを読み込み、[`ConverterBuilder`]に反映するモジュール。
//!
//! ```toml
//! sheet_name = "Ledger"
//! output_column = "AD_Date"
//! format = "csv"
//! year_first_threshold = 2000
//! detection_threshold = 2000
//! max_input_size = 52428800
//! workdir = "uploads"
//! ```
//!
//! すべてのキーは省略可能で、省略されたものはビルダーのデフォルト値のままになります。

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{OutputFormat, SheetSelector};
use crate::builder::ConverterBuilder;
use crate::error::Bs2AdError;

/// 設定ファイルとして読み込むサイズの上限
const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// 設定ファイルの内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// シートのインデックス（0始まり）
    pub sheet_index: Option<usize>,
    /// シート名（`sheet_index`より優先）
    pub sheet_name: Option<String>,
    pub year_first_threshold: Option<i64>,
    pub detection_threshold: Option<i64>,
    pub output_column: Option<String>,
    pub format: Option<OutputFormat>,
    pub max_input_size: Option<u64>,
    /// アップロード先のディレクトリ（CLIで使用）
    pub workdir: Option<PathBuf>,
}

impl FileConfig {
    /// 文字列から設定を解析する
    pub fn from_toml_str(content: &str) -> Result<Self, Bs2AdError> {
        toml::from_str(content).map_err(Bs2AdError::from_toml)
    }

    /// ファイルから設定を読み込む
    pub fn load(path: &Path) -> Result<Self, Bs2AdError> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(Bs2AdError::Config(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                size,
                MAX_CONFIG_FILE_BYTES
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// シート選択方式（指定されていない場合は`None`）
    pub fn sheet_selector(&self) -> Option<SheetSelector> {
        match (&self.sheet_name, self.sheet_index) {
            (Some(name), _) => Some(SheetSelector::Name(name.clone())),
            (None, Some(index)) => Some(SheetSelector::Index(index)),
            (None, None) => None,
        }
    }

    /// 指定されている項目をビルダーに反映する
    pub fn apply(&self, mut builder: ConverterBuilder) -> ConverterBuilder {
        if let Some(selector) = self.sheet_selector() {
            builder = builder.with_sheet_selector(selector);
        }
        if let Some(threshold) = self.year_first_threshold {
            builder = builder.with_year_first_threshold(threshold);
        }
        if let Some(threshold) = self.detection_threshold {
            builder = builder.with_detection_threshold(threshold);
        }
        if let Some(ref name) = self.output_column {
            builder = builder.with_output_column(name.clone());
        }
        if let Some(format) = self.format {
            builder = builder.with_output_format(format);
        }
        if let Some(bytes) = self.max_input_size {
            builder = builder.with_max_input_size(bytes);
        }
        builder
    }
}
