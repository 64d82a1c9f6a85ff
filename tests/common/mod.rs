//! Shared fixtures: disclosure archives on disk and an in-memory store.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ixbrl_ingest::api::{ApiError, ApiResult, IngestApi};
use ixbrl_ingest::config::IngestConfig;
use ixbrl_ingest::model::{DocumentKey, Item, ItemKind};

pub const SUMMARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:ix="http://www.xbrl.org/2013/inlineXBRL" xmlns:xbrli="http://www.xbrl.org/2003/instance">
<body>
<ix:header><ix:resources>
  <xbrli:context id="CurrentYearInstant">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.tdnet.info">72030</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:instant>2024-11-06</xbrli:instant></xbrli:period>
  </xbrli:context>
</ix:resources></ix:header>
<ix:nonNumeric name="tse-ed-t:DocumentName" contextRef="CurrentYearInstant">決算短信〔日本基準〕(連結)</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:CompanyNameA" contextRef="CurrentYearInstant">Acme</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:CompanyNameB" contextRef="CurrentYearInstant">Acme Corp</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:SecuritiesCode" contextRef="CurrentYearInstant">72030</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:TypeOfCurrentPeriod" contextRef="CurrentYearInstant">FY</ix:nonNumeric>
<ix:nonFraction name="tse-ed-t:DividendPerShare" contextRef="PriorYearDuration_AnnualMember_ResultMember" unitRef="JPY" decimals="0">100</ix:nonFraction>
<ix:nonFraction name="tse-ed-t:DividendPerShare" contextRef="NextYearDuration_AnnualMember_ForecastMember" unitRef="JPY" decimals="0">120</ix:nonFraction>
</body></html>"#;

pub const STATEMENT: &str = r#"<html xmlns:ix="http://www.xbrl.org/2013/inlineXBRL"><body>
<ix:nonFraction name="jppfs_cor:NetSales" contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6" scale="6">1,234</ix:nonFraction>
</body></html>"#;

pub const CALCULATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:calculationLink xlink:type="extended" xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:type="locator" xlink:href="tse-acedjpfr-72030.xsd#tse-acedjpfr_GrossProfit" xlink:label="GrossProfit"/>
    <link:loc xlink:type="locator" xlink:href="http://disclosure.edinet-fsa.go.jp/taxonomy/jppfs_cor.xsd#jppfs_cor_NetSales" xlink:label="NetSales"/>
    <link:calculationArc xlink:type="arc" xlink:arcrole="http://www.xbrl.org/2003/arcrole/summation-item" xlink:from="GrossProfit" xlink:to="NetSales" order="1" weight="1"/>
  </link:calculationLink>
</link:linkbase>"#;

pub const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <xsd:annotation><xsd:appinfo>
    <link:linkbaseRef xlink:type="simple" xlink:href="tse-acedjpfr-72030_cal.xml" xlink:role="http://www.xbrl.org/2003/role/calculationLinkbaseRef"/>
  </xsd:appinfo></xsd:annotation>
  <xsd:import namespace="http://www.xbrl.org/2003/instance" schemaLocation="http://www.xbrl.org/2003/xbrl-instance-2003-12-31.xsd"/>
  <xsd:element id="tse-acedjpfr_GrossProfit" name="GrossProfit" type="xbrli:monetaryItemType" substitutionGroup="xbrli:item" nillable="true"/>
</xsd:schema>"#;

pub const QUALITATIVE: &str = r#"<html><body>
<h1>1. 経営成績等の概況</h1>
<p>売上高は増加しました。</p>
</body></html>"#;

/// Write a zip with `(name, contents)` entries.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// A complete earnings-summary package.
pub fn earnings_archive(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    write_zip(
        &path,
        &[
            ("XBRLData/Summary/tse-acedjpsm-72030-20241106-ixbrl.htm", SUMMARY),
            (
                "XBRLData/Attachment/0101010-acbs01-tse-acedjpfr-72030-2024-09-30-01-2024-11-06-ixbrl.htm",
                STATEMENT,
            ),
            ("XBRLData/Attachment/tse-acedjpfr-72030_cal.xml", CALCULATION),
            ("XBRLData/Attachment/tse-acedjpfr-72030.xsd", SCHEMA),
            ("XBRLData/Attachment/qualitative.htm", QUALITATIVE),
        ],
    );
    path
}

/// A revision notice carrying two summary files.
pub fn double_revision_archive(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    write_zip(
        &path,
        &[
            ("XBRLData/Summary/tse-rvdf-72030-20241106-ixbrl.htm", SUMMARY),
            ("XBRLData/Summary/tse-rvdf-72030-20241107-ixbrl.htm", SUMMARY),
        ],
    );
    path
}

/// An earnings summary without any statement file.
pub fn summary_only_archive(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    write_zip(
        &path,
        &[("XBRLData/Summary/tse-acedjpsm-72030-20241106-ixbrl.htm", SUMMARY)],
    );
    path
}

/// Config whose scratch space lives under `dir`.
pub fn test_config(dir: &Path) -> IngestConfig {
    IngestConfig {
        scratch_dir: Some(dir.join("scratch")),
        push_workers: 4,
        ..Default::default()
    }
}

/// One call made against [`RecordingApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    IsActive(DocumentKey),
    Push(ItemKind),
    Activate(DocumentKey),
    Generate(DocumentKey),
    Summary(DocumentKey),
}

/// In-memory store that records every call.
///
/// Activating a document makes later `is_active` queries for it true.
#[derive(Default)]
pub struct RecordingApi {
    active: Mutex<HashSet<DocumentKey>>,
    calls: Mutex<Vec<Call>>,
    pushed: Mutex<Vec<Item>>,
    reject: Option<ItemKind>,
}

impl RecordingApi {
    /// A store that answers 422 for every push of `kind`.
    pub fn rejecting(kind: ItemKind) -> Self {
        Self {
            reject: Some(kind),
            ..Default::default()
        }
    }

    pub fn mark_active(&self, key: DocumentKey) {
        self.active.lock().unwrap().insert(key);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pushed(&self) -> Vec<Item> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn push_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Push(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl IngestApi for RecordingApi {
    fn is_active(&self, key: DocumentKey) -> ApiResult<bool> {
        self.record(Call::IsActive(key));
        Ok(self.active.lock().unwrap().contains(&key))
    }

    fn push(&self, item: &Item) -> ApiResult<()> {
        self.record(Call::Push(item.kind));
        if self.reject == Some(item.kind) {
            return Err(ApiError::Rejected {
                endpoint: ixbrl_ingest::api::endpoints::endpoint_for(item.kind).to_string(),
                status: 422,
            });
        }
        self.pushed.lock().unwrap().push(item.clone());
        Ok(())
    }

    fn activate(&self, key: DocumentKey) -> ApiResult<()> {
        self.record(Call::Activate(key));
        self.mark_active(key);
        Ok(())
    }

    fn generate(&self, key: DocumentKey) -> ApiResult<()> {
        self.record(Call::Generate(key));
        Ok(())
    }

    fn request_summary(&self, key: DocumentKey) -> ApiResult<()> {
        self.record(Call::Summary(key));
        Ok(())
    }
}
