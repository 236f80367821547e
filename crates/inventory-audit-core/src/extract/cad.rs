//! CAD metadata: release detection without loading geometry.
//!
//! - DWG: the first six bytes are the release magic (`AC1032`, ...).
//! - DXF: the `$ACADVER` and `$INSUNITS` header variables and BLOCK xref flags,
//!   read from a bounded prefix.
//! - RVT/RFA/RTE: the `BasicFileInfo` stream of the compound container.
//! - IFC: the `FILE_SCHEMA` token and georeference entities in a bounded prefix.

use crate::config::normalize_extension;
use crate::storage::models::{CadMeta, SatelliteRecord};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::trace;

const SIGNATURE_LEN: usize = 6;
const HEADER_PREFIX_LEN: u64 = 64 * 1024;
const BINARY_DXF_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

/// Release magic → product release. Codes shorter than six bytes match as prefixes.
const DWG_RELEASES: &[(&str, &str)] = &[
    ("MC0.0", "AutoCAD R1.0"),
    ("AC1.2", "AutoCAD R1.2"),
    ("AC1.40", "AutoCAD R1.40"),
    ("AC1.50", "AutoCAD R2.05"),
    ("AC2.10", "AutoCAD R2.10"),
    ("AC1001", "AutoCAD R2.22"),
    ("AC1002", "AutoCAD R2.50"),
    ("AC1003", "AutoCAD R2.60"),
    ("AC1004", "AutoCAD R9"),
    ("AC1006", "AutoCAD R10"),
    ("AC1009", "AutoCAD R11/R12"),
    ("AC1012", "AutoCAD R13"),
    ("AC1014", "AutoCAD R14"),
    ("AC1015", "AutoCAD 2000"),
    ("AC1018", "AutoCAD 2004"),
    ("AC1021", "AutoCAD 2007"),
    ("AC1024", "AutoCAD 2010"),
    ("AC1027", "AutoCAD 2013"),
    ("AC1032", "AutoCAD 2018"),
];

/// Longest tokens first so `IFC4X3` is not reported as `IFC4`.
const IFC_SCHEMAS: &[&str] = &["IFC4X3", "IFC4X2", "IFC4X1", "IFC4", "IFC2X3", "IFC2X2"];
const IFC_GEOREF_MARKERS: &[&str] = &["IFCMAPCONVERSION", "IFCPROJECTEDCRS"];

#[cfg(feature = "revit")]
const BASIC_FILE_INFO_STREAM: &str = "/BasicFileInfo";
const WORKSHARING_MARKERS: &[&str] = &[
    "Worksharing: Central",
    "Worksharing: Local",
    "Central Model Path",
];

lazy_static! {
    static ref REVIT_RELEASE: Regex = Regex::new(r"Revit (\d{4})").expect("valid release pattern");
    static ref YEAR_TOKEN: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year pattern");
}

pub fn extract(path: &Path) -> Option<SatelliteRecord> {
    Some(SatelliteRecord::Cad(extract_cad(path)))
}

pub fn extract_cad(path: &Path) -> CadMeta {
    let ext = path
        .extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default();

    let result = match ext.as_str() {
        "dwg" => read_dwg(path),
        "dxf" => read_dxf(path),
        "rvt" | "rfa" | "rte" => read_revit(path),
        "ifc" => read_ifc(path),
        _ => Ok(CadMeta::default()),
    };

    result.unwrap_or_else(|e| {
        trace!("CAD extraction failed for {}: {}", path.display(), e);
        CadMeta::default()
    })
}

/// Human-readable release for a DWG magic, or a label carrying the raw bytes.
pub fn dwg_release(signature: &[u8]) -> String {
    DWG_RELEASES
        .iter()
        .find(|(code, _)| signature.starts_with(code.as_bytes()))
        .map(|(_, release)| release.to_string())
        .unwrap_or_else(|| format!("Legacy/Unknown ({})", printable(signature)))
}

fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                (b as char).to_string()
            } else {
                format!("\\x{:02X}", b)
            }
        })
        .collect()
}

fn read_prefix(path: &Path, limit: u64) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    File::open(path)?.take(limit).read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn read_dwg(path: &Path) -> io::Result<CadMeta> {
    let signature = read_prefix(path, SIGNATURE_LEN as u64)?;
    Ok(CadMeta {
        software_version: dwg_release(&signature),
        ..CadMeta::default()
    })
}

fn read_dxf(path: &Path) -> io::Result<CadMeta> {
    let prefix = read_prefix(path, HEADER_PREFIX_LEN)?;
    if prefix.starts_with(BINARY_DXF_SENTINEL) {
        return Ok(CadMeta {
            software_version: "Binary DXF".to_string(),
            ..CadMeta::default()
        });
    }
    Ok(parse_dxf_header(&String::from_utf8_lossy(&prefix)))
}

/// Walk DXF group-code/value pairs. A truncated trailing pair is ignored.
pub fn parse_dxf_header(text: &str) -> CadMeta {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut meta = CadMeta::default();
    let mut version = None;
    let mut current_var: Option<&str> = None;
    let mut in_block = false;

    for pair in lines.chunks_exact(2) {
        let (code, value) = (pair[0], pair[1]);
        match code {
            "0" => {
                current_var = None;
                in_block = value == "BLOCK";
            }
            "9" => current_var = Some(value),
            "1" if current_var == Some("$ACADVER") => version = Some(value),
            "70" if current_var == Some("$INSUNITS") => {
                meta.scale = value.parse::<i32>().ok().and_then(insunits_name);
            }
            "70" if in_block => {
                if value.parse::<i32>().map(|flags| flags & 4 != 0).unwrap_or(false) {
                    meta.has_xrefs = true;
                }
            }
            _ => {}
        }
    }

    meta.software_version = match version {
        Some(v) => dwg_release(v.as_bytes()),
        None => "DXF (no version header)".to_string(),
    };
    meta
}

fn insunits_name(code: i32) -> Option<String> {
    let name = match code {
        0 => return None,
        1 => "inches",
        2 => "feet",
        3 => "miles",
        4 => "millimeters",
        5 => "centimeters",
        6 => "meters",
        7 => "kilometers",
        10 => "yards",
        14 => "decimeters",
        other => return Some(format!("units:{}", other)),
    };
    Some(name.to_string())
}

#[cfg(feature = "revit")]
fn read_revit(path: &Path) -> io::Result<CadMeta> {
    let mut container = cfb::open(path)?;
    let mut stream = container.open_stream(BASIC_FILE_INFO_STREAM)?;
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw)?;
    Ok(parse_basic_file_info(&decode_permissive(&raw)))
}

#[cfg(not(feature = "revit"))]
fn read_revit(_path: &Path) -> io::Result<CadMeta> {
    Ok(CadMeta::default())
}

/// Decode as both UTF-16LE and UTF-8, dropping anything that does not decode.
/// `BasicFileInfo` mixes the two encodings.
pub fn decode_permissive(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let wide = String::from_utf16_lossy(&units);
    let narrow = String::from_utf8_lossy(raw);

    wide.chars()
        .chain(std::iter::once('\n'))
        .chain(narrow.chars())
        .filter(|c| *c != char::REPLACEMENT_CHARACTER && *c != '\0')
        .collect()
}

pub fn parse_basic_file_info(text: &str) -> CadMeta {
    let year = REVIT_RELEASE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .or_else(|| YEAR_TOKEN.find(text))
        .map(|m| m.as_str().to_string());

    CadMeta {
        software_version: match year {
            Some(year) => format!("Revit {}", year),
            None => "Revit (unknown release)".to_string(),
        },
        is_workshared: WORKSHARING_MARKERS.iter().any(|m| text.contains(m)),
        ..CadMeta::default()
    }
}

fn read_ifc(path: &Path) -> io::Result<CadMeta> {
    let prefix = read_prefix(path, HEADER_PREFIX_LEN)?;
    Ok(parse_ifc_prefix(&String::from_utf8_lossy(&prefix)))
}

pub fn parse_ifc_prefix(text: &str) -> CadMeta {
    let upper = text.to_ascii_uppercase();
    let schema_area = upper
        .find("FILE_SCHEMA")
        .map(|idx| &upper[idx..])
        .unwrap_or(&upper);

    let schema = IFC_SCHEMAS.iter().find(|token| schema_area.contains(*token));

    let scale = if IFC_GEOREF_MARKERS.iter().any(|m| upper.contains(m)) {
        Some("georeferenced".to_string())
    } else if upper.contains("IFCSITE") {
        Some("site".to_string())
    } else {
        None
    };

    CadMeta {
        software_version: schema
            .map(|s| s.to_string())
            .unwrap_or_else(|| "IFC (unknown schema)".to_string()),
        scale,
        ..CadMeta::default()
    }
}
