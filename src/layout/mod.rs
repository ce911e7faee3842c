//! Layout Module
//!
//! ダッシュボードの書式、セル書き込み、数式組み立ての共通部品。

pub(crate) mod formula;
pub(crate) mod styles;
mod writer;

pub(crate) use writer::{CellInput, Highlight, SheetWriter};
