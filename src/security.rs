//! Security Module
//!
//! アップロードされたファイルに対する制限を実装するモジュール。
//! 入力サイズの上限、許可する拡張子、パストラバーサルを防ぐファイル名の正規化を提供します。

use crate::api::OutputFormat;
use crate::error::Bs2AdError;
use unicode_normalization::UnicodeNormalization;

/// 受け付けるスプレッドシートの拡張子
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// 変換後のファイル名に付ける接頭辞
pub const CONVERTED_PREFIX: &str = "converted_";

/// セキュリティ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 104_857_600, // 100MB
        }
    }
}

impl SecurityConfig {
    /// 入力サイズを検証する
    pub fn check_input_size(&self, size: u64) -> Result<(), Bs2AdError> {
        if size > self.max_input_file_size {
            return Err(Bs2AdError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// ファイル名の拡張子（小文字）
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// 拡張子が許可されているか（大文字小文字は区別しない）
pub fn allowed_file(filename: &str) -> bool {
    extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// ファイル名を安全な形に正規化する
///
/// - NFKD正規化の後、ASCII以外の文字を除去（`é`は`e`になる）
/// - パス区切り（`/`, `\`）は空白として扱う
/// - 空白で区切られた語を`_`で連結
/// - `[A-Za-z0-9_.-]`以外の文字を除去
/// - 先頭・末尾の`.`と`_`を除去
///
/// ```rust
/// use bs2ad::security::secure_filename;
///
/// assert_eq!(secure_filename("My cool sheet.xlsx"), "My_cool_sheet.xlsx");
/// assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
/// ```
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// アップロードされたファイル名を検証し、保存用の名前を返す
///
/// # 戻り値
///
/// * `Ok(String)` - 正規化済みのファイル名
/// * `Err(Bs2AdError::UnsupportedFile)` - 拡張子が許可されていない、または正規化後に空になった
pub fn validate_upload_name(filename: &str) -> Result<String, Bs2AdError> {
    if !allowed_file(filename) {
        return Err(Bs2AdError::UnsupportedFile(format!(
            "'{}' is not an Excel file (allowed: {})",
            filename,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let secured = secure_filename(filename);
    if secured.is_empty() || !allowed_file(&secured) {
        return Err(Bs2AdError::UnsupportedFile(format!(
            "'{}' does not contain a usable file name",
            filename
        )));
    }
    Ok(secured)
}

/// 変換後のファイル名を決定する
///
/// 元のファイル名に`converted_`を付けます。出力形式と拡張子が異なる場合
/// （例: `.xls`の入力をXLSXで出力する場合）は拡張子を置き換えます。
///
/// ```rust
/// use bs2ad::OutputFormat;
/// use bs2ad::security::converted_filename;
///
/// assert_eq!(converted_filename("report.xlsx", OutputFormat::Xlsx), "converted_report.xlsx");
/// assert_eq!(converted_filename("report.xls", OutputFormat::Xlsx), "converted_report.xlsx");
/// assert_eq!(converted_filename("report.xlsx", OutputFormat::Csv), "converted_report.csv");
/// ```
pub fn converted_filename(filename: &str, format: OutputFormat) -> String {
    let target = format.extension();
    match filename.rsplit_once('.') {
        Some((_, ext)) if ext.eq_ignore_ascii_case(target) => {
            format!("{}{}", CONVERTED_PREFIX, filename)
        }
        Some((stem, _)) => format!("{}{}.{}", CONVERTED_PREFIX, stem, target),
        None => format!("{}{}.{}", CONVERTED_PREFIX, filename, target),
    }
}
