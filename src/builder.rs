//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::io::{Read, Write};

use tracing::{debug, info, warn};

use crate::api::{ColumnReport, ColumnSelection, ConversionOutcome, ConversionReport};
use crate::api::{OutputFormat, SheetSelector};
use crate::converter::{DateConverter, DEFAULT_YEAR_FIRST_THRESHOLD};
use crate::detector::{ColumnDetector, DEFAULT_DETECTION_THRESHOLD};
use crate::error::Bs2AdError;
use crate::output::OutputFormatter;
use crate::parser::WorkbookParser;
use crate::security::SecurityConfig;
use crate::table::{Table, DEFAULT_OUTPUT_COLUMN};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 先頭の値がこれより大きければ年-月-日として解釈する
    pub year_first_threshold: i64,

    /// 列検出で年とみなす値の下限
    pub detection_threshold: i64,

    /// 追加する列の名前
    pub output_column: String,

    /// 出力フォーマット
    pub output_format: OutputFormat,

    /// 入力サイズの制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::default(),
            year_first_threshold: DEFAULT_YEAR_FIRST_THRESHOLD,
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            output_column: DEFAULT_OUTPUT_COLUMN.to_string(),
            output_format: OutputFormat::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use bs2ad::{ConverterBuilder, OutputFormat, SheetSelector};
///
/// # fn main() -> Result<(), bs2ad::Bs2AdError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Ledger".to_string()))
///     .with_output_column("AD_Date")
///     .with_output_format(OutputFormat::Csv)
///     .build()?;
/// # let _ = converter;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 最初のシート
    /// - 年-月-日と判定する境界値: 2000（これより大きい場合）
    /// - 列検出の閾値: 2000（以上）
    /// - 追加する列名: `English_Date`
    /// - 出力フォーマット: XLSX
    /// - 入力サイズ上限: 100MB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// ```rust
    /// use bs2ad::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Index(1));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 年-月-日の並びと判定する境界値を指定する
    ///
    /// 先頭の値がこの値より**大きい**場合に年が先頭にあるとみなします。
    pub fn with_year_first_threshold(mut self, threshold: i64) -> Self {
        self.config.year_first_threshold = threshold;
        self
    }

    /// 列検出で年とみなす値の下限を指定する
    pub fn with_detection_threshold(mut self, threshold: i64) -> Self {
        self.config.detection_threshold = threshold;
        self
    }

    /// 変換結果を格納する列の名前を指定する
    pub fn with_output_column(mut self, name: impl Into<String>) -> Self {
        self.config.output_column = name.into();
        self
    }

    /// 出力フォーマットを指定する
    ///
    /// ```rust
    /// use bs2ad::{ConverterBuilder, OutputFormat};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_output_format(OutputFormat::Csv);
    /// ```
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `Bs2AdError::Config(String)`: 設定の検証に失敗した場合
    ///   * 追加する列名が空
    ///   * 入力サイズ上限が0
    pub fn build(self) -> Result<Converter, Bs2AdError> {
        if self.config.output_column.trim().is_empty() {
            return Err(Bs2AdError::Config(
                "Output column name must not be empty".to_string(),
            ));
        }

        if self.config.security.max_input_file_size == 0 {
            return Err(Bs2AdError::Config(
                "Maximum input size must be greater than 0".to_string(),
            ));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// スプレッドシートを読み込み、BS暦の日付列を検出・変換し、結果を書き出すための
/// メインエントリーポイントです。内部状態を変更しないため、1つのインスタンスを
/// 複数スレッドで共有できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use bs2ad::{ColumnSelection, ConversionOutcome, ConverterBuilder};
/// use std::fs::File;
///
/// # fn main() -> Result<(), bs2ad::Bs2AdError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("ledger.xlsx")?;
/// let output = File::create("converted_ledger.xlsx")?;
///
/// match converter.convert(input, output, ColumnSelection::Auto)? {
///     ConversionOutcome::Converted(report) => println!("{} rows", report.column.rows),
///     ConversionOutcome::NeedsColumnSelection { columns } => println!("choose one of {:?}", columns),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// セル単位の変換器
    converter: DateConverter,

    /// 日付列の検出器
    detector: ColumnDetector,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionConfig::default())
    }
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            converter: DateConverter::new(config.year_first_threshold),
            detector: ColumnDetector::new(config.detection_threshold),
            config,
        }
    }

    /// 出力フォーマット
    pub fn output_format(&self) -> OutputFormat {
        self.config.output_format
    }

    /// 追加する列の名前
    pub fn output_column(&self) -> &str {
        &self.config.output_column
    }

    /// 入力サイズの制限
    pub fn security(&self) -> &SecurityConfig {
        &self.config.security
    }

    /// スプレッドシートを読み込み、選択されたシートをテーブルとして返す
    ///
    /// 列の順序とセルの型（ネイティブな日時を含む）は保持されます。
    pub fn load_table<R: Read>(&self, input: R) -> Result<Table, Bs2AdError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let sheet = parser.select_sheet(&self.config.sheet_selector)?;
        debug!(
            sheet = %sheet,
            available = parser.sheet_names().len(),
            "selected sheet"
        );

        let table = parser.load_table(&sheet)?;
        debug!(
            sheet = %sheet,
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );
        Ok(table)
    }

    /// 日付列を検出する
    pub fn detect_date_column(&self, table: &Table) -> Option<String> {
        self.detector.detect(table)
    }

    /// 列を変換し、結果の列を右隣に挿入する
    pub fn convert_column(
        &self,
        table: &mut Table,
        column: &str,
    ) -> Result<ColumnReport, Bs2AdError> {
        let report = self
            .converter
            .convert_column(table, column, &self.config.output_column)?;
        info!(
            source = %report.source_column,
            output = %report.output_column,
            rows = report.rows,
            converted = report.converted,
            absent = report.absent(),
            "converted column"
        );
        Ok(report)
    }

    /// テーブルを設定された出力フォーマットで書き出す
    pub fn save_table<W: Write>(&self, table: &Table, mut output: W) -> Result<(), Bs2AdError> {
        OutputFormatter::from_format(self.config.output_format).render(table, &mut output)
    }

    /// スプレッドシートを読み込み、日付列を変換して書き出す
    ///
    /// # 処理フロー
    ///
    /// 1. 入力を読み込み、シートを選択してテーブルを構築
    /// 2. 列の決定（`Named`は検出を行わない、`Auto`は検出する）
    /// 3. 列が見つからない場合は何も出力せずに`NeedsColumnSelection`を返す
    /// 4. 変換列を挿入して書き出し
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionOutcome::Converted)` - 変換して出力した
    /// * `Ok(ConversionOutcome::NeedsColumnSelection)` - 日付列が検出できなかった
    /// * `Err(Bs2AdError)` - 読み込み・書き出しに失敗した、または指定列が存在しない
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        selection: ColumnSelection,
    ) -> Result<ConversionOutcome, Bs2AdError> {
        let mut table = self.load_table(input)?;

        let (column, detected) = match selection {
            ColumnSelection::Named(name) => (name, false),
            ColumnSelection::Auto => match self.detect_date_column(&table) {
                Some(name) => {
                    info!(column = %name, sheet = %table.sheet_name(), "detected date column");
                    (name, true)
                }
                None => {
                    let columns = table.column_names();
                    warn!(
                        sheet = %table.sheet_name(),
                        columns = columns.len(),
                        "no date column detected"
                    );
                    return Ok(ConversionOutcome::NeedsColumnSelection { columns });
                }
            },
        };

        let report = self.convert_column(&mut table, &column)?;
        self.save_table(&table, output)?;

        Ok(ConversionOutcome::Converted(ConversionReport {
            sheet: table.sheet_name().to_string(),
            detected,
            column: report,
            output_path: None,
        }))
    }
}
