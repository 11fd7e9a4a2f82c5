//! Loaders turning source files into flat `NidEntry` records.
//!
//! Four formats are supported:
//! - PSP-Libdoc XML (`PSPLIBDOC/PRXFILES/PRXFILE/...`), parsed with quick-xml.
//! - PSP export files (`PSP_EXPORT_START` / `PSP_EXPORT_FUNC_*` lines).
//! - Bare function lists (`<FUNC><NID/><NAME/></FUNC>` fragments).
//! - PPSSPP HLE tables (`const HLEFunction Lib[] = { {0xNID, wrap, "name", ...}, };`).
//!
//! Records are taken as-is apart from NID normalization; a function element
//! missing its NID or name aborts the load.

mod export;
mod functions;
mod hle;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::model::NidEntry;
use crate::nid::{normalize_nid, NidError};

pub use export::parse_export_file;
pub use functions::parse_function_list;
pub use hle::parse_hle_tables;

/// Error type for source file loading.
#[derive(Debug, Error)]
pub enum LibdocError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A mandatory child element was absent or empty.
    #[error("<{element}> is missing <{field}> (library '{library}')")]
    MissingField { element: &'static str, field: &'static str, library: String },

    #[error("Malformed export line {line}: {text}")]
    MalformedExportLine { line: usize, text: String },

    #[error("HLE table '{library}' has no closing '}};'")]
    UnterminatedTable { library: String },

    #[error("Malformed entry in HLE table '{library}': {{{text}}}")]
    MalformedTableEntry { library: String, text: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Nid(#[from] NidError),
}

pub type LibdocResult<T> = Result<T, LibdocError>;

/// Source file formats understood by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Libdoc,
    Export,
    FunctionList,
    Hle,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 4] =
        [SourceFormat::Libdoc, SourceFormat::Export, SourceFormat::FunctionList, SourceFormat::Hle];

    /// Guess the format from a file extension.
    ///
    /// Function lists have no conventional extension and must be named
    /// explicitly.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("xml") => Some(SourceFormat::Libdoc),
            Some("exp") => Some(SourceFormat::Export),
            Some("cpp" | "cc" | "h") => Some(SourceFormat::Hle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Libdoc => "libdoc",
            SourceFormat::Export => "export",
            SourceFormat::FunctionList => "functions",
            SourceFormat::Hle => "hle",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceFormat::ALL.into_iter().find(|format| format.as_str() == s).ok_or_else(|| {
            let known: Vec<&str> = SourceFormat::ALL.iter().map(|f| f.as_str()).collect();
            format!("unknown source format '{s}' (expected one of: {})", known.join(", "))
        })
    }
}

/// Labels for formats that do not name their own library or module.
///
/// Libdoc XML ignores both; export files and HLE tables use `module`;
/// function lists use both.
#[derive(Debug, Clone, Copy)]
pub struct SourceLabels<'a> {
    pub library: &'a str,
    pub module: &'a str,
}

/// Read and parse a source file.
pub fn load_file(
    path: &Path,
    format: SourceFormat,
    version: &str,
    labels: SourceLabels<'_>,
) -> LibdocResult<Vec<NidEntry>> {
    let body = std::fs::read_to_string(path)
        .map_err(|source| LibdocError::Io { path: path.display().to_string(), source })?;
    match format {
        SourceFormat::Libdoc => parse_libdoc(&body, version),
        SourceFormat::Export => parse_export_file(&body, version, labels.module),
        SourceFormat::FunctionList => {
            parse_function_list(&body, version, labels.library, labels.module)
        }
        SourceFormat::Hle => parse_hle_tables(&body, version, labels.module),
    }
}

#[derive(Default)]
struct FunctionFields {
    nid: Option<String>,
    name: Option<String>,
}

/// Parse a PSP-Libdoc document into records stamped with `version`.
pub fn parse_libdoc(xml: &str, version: &str) -> LibdocResult<Vec<NidEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    let mut prx = String::new();
    let mut library: Option<String> = None;
    let mut function: Option<FunctionFields> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match tag.as_str() {
                    "PRXFILE" => prx.clear(),
                    "LIBRARY" => library = None,
                    "FUNCTION" => function = Some(FunctionFields::default()),
                    _ => {}
                }
                path.push(tag);
                text.clear();
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(_) => {
                let Some(tag) = path.pop() else {
                    continue;
                };
                let parent = path.last().map(String::as_str);
                let value = text.trim().to_string();
                text.clear();

                match (parent, tag.as_str()) {
                    (Some("PRXFILE"), "PRX") => prx = value,
                    (Some("LIBRARY"), "NAME") => library = Some(value),
                    (Some("FUNCTION"), "NID") => {
                        if let Some(f) = function.as_mut() {
                            f.nid = Some(normalize_nid(&value)).filter(|n| !n.is_empty());
                        }
                    }
                    (Some("FUNCTION"), "NAME") => {
                        if let Some(f) = function.as_mut() {
                            f.name = Some(value).filter(|n| !n.is_empty());
                        }
                    }
                    (_, "FUNCTION") => {
                        let fields = function.take().unwrap_or_default();
                        let library_name = library.clone().ok_or(LibdocError::MissingField {
                            element: "LIBRARY",
                            field: "NAME",
                            library: String::new(),
                        })?;
                        let nid = fields.nid.ok_or_else(|| LibdocError::MissingField {
                            element: "FUNCTION",
                            field: "NID",
                            library: library_name.clone(),
                        })?;
                        let name = fields.name.ok_or_else(|| LibdocError::MissingField {
                            element: "FUNCTION",
                            field: "NAME",
                            library: library_name.clone(),
                        })?;
                        entries.push(NidEntry::new(nid, name, library_name, prx.clone(), version));
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!("parsed {} libdoc entries for {}", entries.len(), version);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_format_follows_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a/sysmem.XML")), Some(SourceFormat::Libdoc));
        assert_eq!(SourceFormat::from_path(Path::new("exports.exp")), Some(SourceFormat::Export));
        assert_eq!(SourceFormat::from_path(Path::new("sceIo.cpp")), Some(SourceFormat::Hle));
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn source_format_names_parse_back() {
        for format in SourceFormat::ALL {
            assert_eq!(format.as_str().parse::<SourceFormat>(), Ok(format));
        }
        assert!("yaml".parse::<SourceFormat>().unwrap_err().contains("functions"));
    }

    #[test]
    fn cdata_names_are_kept() {
        let xml = r#"<PSPLIBDOC><PRXFILES><PRXFILE><PRX>kd/a.prx</PRX><LIBRARIES><LIBRARY>
            <NAME>Lib</NAME><FUNCTIONS><FUNCTION><NID>0x446d8de6</NID>
            <NAME><![CDATA[sceKernelCreateThread]]></NAME></FUNCTION></FUNCTIONS>
            </LIBRARY></LIBRARIES></PRXFILE></PRXFILES></PSPLIBDOC>"#;
        let entries = parse_libdoc(xml, "1.00").expect("parse");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].nid, "446D8DE6");
        assert_eq!(entries[0].name, "sceKernelCreateThread");
    }
}
