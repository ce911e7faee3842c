//! Parser Module
//!
//! 前期レポートブックの読み込みとラベル走査を担当するモジュール。

mod scan;
mod source;
mod workbook;

pub(crate) use scan::{first_integer, ReportGrid, ReportRow};
pub(crate) use source::{DataPaths, InputContext};
pub(crate) use workbook::ReportReader;
