use regex::Regex;

use crate::libdoc::{LibdocError, LibdocResult};
use crate::model::NidEntry;
use crate::nid::normalize_nid;

/// Parse PPSSPP HLE tables:
///
/// ```text
/// const HLEFunction ThreadManForUser[] = {
///     {0x446D8DE6, &WrapI_CUUIUU<sceKernelCreateThread>, "sceKernelCreateThread", 'i', "sxxixx"},
/// };
/// ```
///
/// Each table is one library; the third field of an entry is the quoted name.
pub fn parse_hle_tables(body: &str, version: &str, module: &str) -> LibdocResult<Vec<NidEntry>> {
    let table_start = Regex::new(r"HLEFunction\s+([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*\]")?;
    let table_entry = Regex::new(r"\{([^{}]*)\}")?;

    let mut entries = Vec::new();
    for table in table_start.captures_iter(body) {
        let (Some(whole), Some(library)) = (table.get(0), table.get(1)) else {
            continue;
        };
        let library = library.as_str();
        let rest = &body[whole.end()..];
        let end = rest
            .find("};")
            .ok_or_else(|| LibdocError::UnterminatedTable { library: library.to_string() })?;

        for entry in table_entry.captures_iter(&rest[..end]) {
            let Some(fields) = entry.get(1) else {
                continue;
            };
            let malformed = || LibdocError::MalformedTableEntry {
                library: library.to_string(),
                text: fields.as_str().trim().to_string(),
            };
            let parts: Vec<&str> = fields.as_str().split(',').map(str::trim).collect();
            if parts.len() < 3 {
                return Err(malformed());
            }
            let name = parts[2]
                .strip_prefix('"')
                .and_then(|n| n.strip_suffix('"'))
                .ok_or_else(malformed)?;
            entries.push(NidEntry::new(normalize_nid(parts[0]), name, library, module, version));
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCE_IO: &str = r#"
const HLEFunction IoFileMgrForUser[] = {
	{0X109F50BC, &WrapU_CIU<sceIoOpen>,  "sceIoOpen",  'i', "sxx"},
	{0x810c4bc3, &WrapU_I<sceIoClose>,   "sceIoClose", 'i', "i"  },
};

const HLEFunction IoFileMgrForKernel[] = {
	{0x6A638D83, &WrapU_IUU<sceIoRead>,  "sceIoRead",  'i', "ixx"},
};
"#;

    #[test]
    fn every_table_becomes_a_library() {
        let entries = parse_hle_tables(SCE_IO, "6.60", "iofilemgr.prx").expect("parse");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].nid, "109F50BC");
        assert_eq!(entries[0].name, "sceIoOpen");
        assert_eq!(entries[1].nid, "810C4BC3");
        assert_eq!(entries[1].library, "IoFileMgrForUser");
        assert_eq!(entries[2].library, "IoFileMgrForKernel");
        assert_eq!(entries[2].module, "iofilemgr.prx");
    }

    #[test]
    fn unterminated_table_is_rejected() {
        let err = parse_hle_tables("const HLEFunction Lib[] = {\n{0x1, f, \"f\"},\n", "1.00", "m")
            .unwrap_err();
        assert!(matches!(err, LibdocError::UnterminatedTable { .. }));
    }

    #[test]
    fn unquoted_name_is_rejected() {
        let body = "const HLEFunction Lib[] = {\n{0x1, f, sceFoo, 'i'},\n};";
        let err = parse_hle_tables(body, "1.00", "m").unwrap_err();
        assert!(matches!(err, LibdocError::MalformedTableEntry { .. }));
    }
}
