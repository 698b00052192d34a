//! Parser Module
//!
//! calamineを使用したスプレッドシート読み込みの実装。

mod workbook;

pub(crate) use workbook::WorkbookParser;
