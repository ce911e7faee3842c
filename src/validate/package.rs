//! XLSX Package Inspection
//!
//! 生成済みブック（ZIPアーカイブ）のXMLを直接解析し、calamineでは取得できない
//! 情報（シート順・グラフ数・条件付き書式・入力規則）を集計します。

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::DashboardError;
use crate::security::{validate_zip_path, SecurityConfig};

/// パッケージの集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSummary {
    /// workbook.xmlに記載された順のシート名
    pub sheets: Vec<String>,
    /// グラフ（`xl/charts/chart*.xml`）の数
    pub charts: usize,
    /// 条件付き書式（`conditionalFormatting`要素）の数
    pub conditional_formats: usize,
    /// 入力規則（`dataValidation`要素）の数
    pub data_validations: usize,
}

fn zip_error(e: zip::result::ZipError) -> DashboardError {
    DashboardError::Zip(format!("{}", e))
}

/// ZIPアーカイブ全体の安全性を確認する
fn check_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    security: &SecurityConfig,
) -> Result<(), DashboardError> {
    if archive.len() > security.max_file_count {
        return Err(DashboardError::SecurityViolation(format!(
            "ZIP archive contains too many files: {} (max: {})",
            archive.len(),
            security.max_file_count
        )));
    }

    let mut total = 0u64;
    for i in 0..archive.len() {
        let file = archive.by_index(i).map_err(zip_error)?;
        let name = file.name();
        validate_zip_path(name).map_err(|e| {
            DashboardError::SecurityViolation(format!("Invalid ZIP path: {}", e))
        })?;

        if file.size() > security.max_file_size {
            return Err(DashboardError::SecurityViolation(format!(
                "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                name,
                file.size(),
                security.max_file_size
            )));
        }
        total = total.checked_add(file.size()).ok_or_else(|| {
            DashboardError::SecurityViolation(
                "Total decompressed size calculation overflow".to_string(),
            )
        })?;
        if total > security.max_decompressed_size {
            return Err(DashboardError::SecurityViolation(format!(
                "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total, security.max_decompressed_size
            )));
        }
    }
    Ok(())
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, DashboardError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(_) => return Ok(None),
    };
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// `<sheet name="..."/>`を出現順に取得
fn parse_sheet_names(xml: &[u8]) -> Result<Vec<String>, DashboardError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut names = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| {
                        DashboardError::Config(format!("XML attribute error: {}", e))
                    })?;
                    if attr.key.as_ref() == b"name" {
                        names.push(std::str::from_utf8(&attr.value)?.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DashboardError::Config(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(names)
}

/// ワークシートXML内の(条件付き書式, 入力規則)の数
fn count_sheet_rules(xml: &[u8]) -> Result<(usize, usize), DashboardError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let (mut conditional, mut validations) = (0, 0);
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"conditionalFormatting" => conditional += 1,
                b"dataValidation" => validations += 1,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DashboardError::Config(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok((conditional, validations))
}

/// 生成済みブックのパッケージを集計
///
/// # 引数
///
/// * `reader` - XLSXファイルのリーダー
/// * `security` - ZIP展開の上限
///
/// # 戻り値
///
/// * `Ok(PackageSummary)` - 集計に成功した場合
/// * `Err(DashboardError::Zip)` - ZIPとして読めない場合
/// * `Err(DashboardError::SecurityViolation)` - 上限やパス検証に違反した場合
pub(crate) fn inspect<R: Read + Seek>(
    reader: R,
    security: &SecurityConfig,
) -> Result<PackageSummary, DashboardError> {
    let mut archive = ZipArchive::new(reader).map_err(zip_error)?;
    check_archive(&mut archive, security)?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut summary = PackageSummary::default();

    if let Some(xml) = read_entry(&mut archive, "xl/workbook.xml")? {
        summary.sheets = parse_sheet_names(&xml)?;
    }

    for name in &names {
        if !name.ends_with(".xml") {
            continue;
        }
        if name.starts_with("xl/charts/chart") {
            summary.charts += 1;
        } else if name.starts_with("xl/worksheets/sheet") {
            if let Some(xml) = read_entry(&mut archive, name)? {
                let (conditional, validations) = count_sheet_rules(&xml)?;
                summary.conditional_formats += conditional;
                summary.data_validations += validations;
            }
        }
    }

    Ok(summary)
}
