//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::NaiveDateTime;
use std::borrow::Cow;

/// セルの値を表す列挙型
///
/// 読み込み時の型（文字列か、ネイティブな日時か）を保持したまま扱います。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 空セル
    Empty,

    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),

    /// 論理値
    Bool(bool),

    /// ネイティブな日時（スプレッドシート上で日付型として保存されていたもの）
    DateTime(NaiveDateTime),

    /// エラー値（例: #DIV/0!）
    Error(String),
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 検出・変換に使う文字列表現を取得する
    ///
    /// 空セルは`None`。数値は整数値なら小数点なしで表現し、
    /// 日時は`YYYY-MM-DD HH:MM:SS`形式になります。
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            CellValue::Bool(true) => Some(Cow::Borrowed("True")),
            CellValue::Bool(false) => Some(Cow::Borrowed("False")),
            CellValue::DateTime(dt) => {
                Some(Cow::Owned(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            }
            CellValue::Error(e) => Some(Cow::Borrowed(e.as_str())),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::Text).unwrap_or(CellValue::Empty)
    }
}

/// 数値を文字列化する（整数値は小数点なし）
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 変換できなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsentReason {
    /// 空セル
    Missing,
    /// 3つの整数に分割できない
    Malformed,
    /// 年月日がBS暦として不正、またはサポート範囲外
    InvalidDate,
}

/// セル単位の変換失敗（値なし）
///
/// エラーではなく「値が存在しない」ことを表します。
/// 出力列では空セルとして書き出されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Absent {
    /// 理由（集計用）
    pub reason: AbsentReason,
}

impl Absent {
    pub(crate) fn new(reason: AbsentReason) -> Self {
        Self { reason }
    }
}

/// `/`区切りの3つの整数
///
/// `-`は`/`として扱います。各要素の前後の空白は無視されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTriple(pub [i64; 3]);

impl ParsedTriple {
    /// 文字列を3つの整数に分割する
    ///
    /// 要素数が3でない場合、または整数として解析できない要素がある場合は`None`。
    ///
    /// ```rust
    /// use bs2ad::ParsedTriple;
    ///
    /// assert_eq!(ParsedTriple::parse("2079-01-15"), Some(ParsedTriple([2079, 1, 15])));
    /// assert_eq!(ParsedTriple::parse("2079/01"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.replace('-', "/");
        let mut parts = normalized.trim().split('/');

        let mut values = [0i64; 3];
        for slot in values.iter_mut() {
            *slot = parts.next()?.trim().parse().ok()?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(ParsedTriple(values))
    }

    /// 先頭の要素
    pub fn first(&self) -> i64 {
        self.0[0]
    }

    /// 末尾の要素
    pub fn last(&self) -> i64 {
        self.0[2]
    }
}

/// BS暦の年月日
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonthDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl YearMonthDay {
    /// 並び順を判定して年月日を決定する
    ///
    /// 先頭が`year_first_threshold`より大きければ（年, 月, 日）、
    /// そうでなければ（日, 月, 年）として解釈します。
    /// いずれかの要素が正の整数でない場合は`None`。
    pub fn resolve(triple: ParsedTriple, year_first_threshold: i64) -> Option<Self> {
        let [a, b, c] = triple.0;
        let (y, m, d) = if a > year_first_threshold {
            (a, b, c)
        } else {
            (c, b, a)
        };

        if y <= 0 || m <= 0 || d <= 0 {
            return None;
        }

        Some(Self {
            year: i32::try_from(y).ok()?,
            month: u32::try_from(m).ok()?,
            day: u32::try_from(d).ok()?,
        })
    }
}
