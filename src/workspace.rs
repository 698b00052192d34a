//! Upload Workspace
//!
//! アップロードされたファイルの保存と変換結果の書き出しを、1つのディレクトリに閉じて扱うモジュール。
//! グローバルな保存先を持たず、リクエストごとに[`UploadWorkspace`]を渡して使用します。

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::api::{ColumnSelection, ConversionOutcome};
use crate::builder::Converter;
use crate::error::Bs2AdError;
use crate::security::{self, SecurityConfig};

/// アップロードファイルを保存するディレクトリ
#[derive(Debug, Clone)]
pub struct UploadWorkspace {
    root: PathBuf,
    security: SecurityConfig,
}

impl UploadWorkspace {
    /// ディレクトリを開く（存在しない場合は作成する）
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, Bs2AdError> {
        let root = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        debug!(dir = %root.display(), "opened upload workspace");
        Ok(Self {
            root,
            security: SecurityConfig::default(),
        })
    }

    /// 保存時のサイズ上限を変更する
    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// ワークスペース内のパス
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// アップロードされたファイルを保存する
    ///
    /// ファイル名を検証・正規化してから保存し、保存した名前を返します。
    /// 同名のファイルが既にある場合は上書きします。
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 保存したファイル名
    /// * `Err(Bs2AdError::UnsupportedFile)` - 拡張子が許可されていない、または名前が空になった
    /// * `Err(Bs2AdError::SecurityViolation)` - サイズ上限を超えた
    pub fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<String, Bs2AdError> {
        let stored = security::validate_upload_name(filename)?;
        self.security.check_input_size(bytes.len() as u64)?;

        let path = self.path_of(&stored);
        std::fs::write(&path, bytes)?;
        info!(file = %stored, bytes = bytes.len(), "stored upload");
        Ok(stored)
    }

    /// 保存済みのファイルを変換し、`converted_<name>`として書き出す
    ///
    /// 日付列が検出できなかった場合は出力ファイルを作成しません。
    pub fn convert(
        &self,
        converter: &Converter,
        stored_name: &str,
        selection: ColumnSelection,
    ) -> Result<ConversionOutcome, Bs2AdError> {
        let stored = security::secure_filename(stored_name);
        if stored != stored_name || !security::allowed_file(&stored) {
            return Err(Bs2AdError::UnsupportedFile(format!(
                "'{}' is not a stored upload",
                stored_name
            )));
        }

        let input_path = self.path_of(&stored);
        let input = BufReader::new(File::open(&input_path)?);

        // 列が決まるまで出力ファイルは作成しない
        let mut buffer = Vec::new();
        let outcome = converter.convert(input, &mut buffer, selection)?;

        match outcome {
            ConversionOutcome::Converted(mut report) => {
                let output_name = security::converted_filename(&stored, converter.output_format());
                let output_path = self.path_of(&output_name);

                let mut writer = BufWriter::new(File::create(&output_path)?);
                writer.write_all(&buffer)?;
                writer.flush()?;

                info!(input = %stored, output = %output_name, "wrote converted workbook");
                report.output_path = Some(output_path);
                Ok(ConversionOutcome::Converted(report))
            }
            needs => Ok(needs),
        }
    }
}
