use crate::libdoc::{LibdocError, LibdocResult};
use crate::model::NidEntry;
use crate::nid::{compute_nid, normalize_nid};

/// Text between the first `(` and the following `)` of a directive line.
fn arguments(line: &str) -> Option<&str> {
    let open = line.find('(')?;
    let close = line[open..].find(')')? + open;
    Some(&line[open + 1..close])
}

/// Parse a PSP export file.
///
/// `PSP_EXPORT_FUNC_HASH(name)` entries get their NID from the name hash.
pub fn parse_export_file(body: &str, version: &str, module: &str) -> LibdocResult<Vec<NidEntry>> {
    let mut entries = Vec::new();
    let mut library = String::new();

    for (idx, raw_line) in body.lines().enumerate() {
        let line = raw_line.trim();
        let malformed =
            || LibdocError::MalformedExportLine { line: idx + 1, text: line.to_string() };

        if line.starts_with("PSP_EXPORT_START") {
            let args = arguments(line).ok_or_else(malformed)?;
            let mut parts = args.split(',');
            library = parts.next().map(str::trim).unwrap_or_default().to_string();
            if library.is_empty() || parts.count() != 2 {
                return Err(malformed());
            }
        } else if line.starts_with("PSP_EXPORT_FUNC_NID") {
            let args = arguments(line).ok_or_else(malformed)?;
            let (name, nid) = args.split_once(',').ok_or_else(malformed)?;
            entries.push(NidEntry::new(
                normalize_nid(nid),
                name.trim(),
                library.as_str(),
                module,
                version,
            ));
        } else if line.starts_with("PSP_EXPORT_FUNC_HASH") {
            let name = arguments(line).ok_or_else(malformed)?.trim();
            let nid = compute_nid(name)?;
            entries.push(NidEntry::new(nid, name, library.as_str(), module, version));
        } else if line.starts_with("PSP_EXPORT_END") {
            library.clear();
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORTS: &str = "\
# Export file
PSP_BEGIN_EXPORTS

PSP_EXPORT_START(ThreadManForUser, 0, 0x4001)
PSP_EXPORT_FUNC_NID(sceKernelCreateThread, 0x446d8de6)
PSP_EXPORT_FUNC_HASH(sceKernelStartThread)
PSP_EXPORT_END

PSP_END_EXPORTS
";

    #[test]
    fn parses_nid_and_hash_directives() {
        let entries = parse_export_file(EXPORTS, "6.60", "threadman.prx").expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].nid, "446D8DE6");
        assert_eq!(entries[0].name, "sceKernelCreateThread");
        assert_eq!(entries[0].library, "ThreadManForUser");
        assert_eq!(entries[1].nid, "F475845D");
        assert_eq!(entries[1].module, "threadman.prx");
    }

    #[test]
    fn rejects_unterminated_directive() {
        let err = parse_export_file("PSP_EXPORT_FUNC_NID(sceFoo, 0x1", "1.00", "m").unwrap_err();
        assert!(matches!(err, LibdocError::MalformedExportLine { line: 1, .. }));
    }
}
