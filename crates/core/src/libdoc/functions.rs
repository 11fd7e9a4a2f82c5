use quick_xml::events::Event;
use quick_xml::Reader;

use crate::libdoc::{LibdocError, LibdocResult};
use crate::model::NidEntry;
use crate::nid::normalize_nid;

/// Parse a bare function list: a sequence of `<FUNC><NID/><NAME/></FUNC>`
/// fragments with no enclosing root element.
///
/// The fragments carry neither library nor module, so both are supplied by
/// the caller.
pub fn parse_function_list(
    body: &str,
    version: &str,
    library: &str,
    module: &str,
) -> LibdocResult<Vec<NidEntry>> {
    let wrapped = format!("<FUNCS>{body}</FUNCS>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_func = false;
    let mut field: Option<&'static str> = None;
    let mut nid: Option<String> = None;
    let mut name: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => match start.name().as_ref() {
                b"FUNC" => {
                    in_func = true;
                    nid = None;
                    name = None;
                }
                b"NID" if in_func => field = Some("NID"),
                b"NAME" if in_func => field = Some("NAME"),
                _ => {}
            },
            Event::Text(t) => {
                let value = t.unescape()?.trim().to_string();
                match field {
                    Some("NID") => nid = Some(normalize_nid(&value)),
                    Some("NAME") => name = Some(value),
                    _ => {}
                }
            }
            Event::End(end) => match end.name().as_ref() {
                b"NID" | b"NAME" => field = None,
                b"FUNC" => {
                    in_func = false;
                    let missing = |field| LibdocError::MissingField {
                        element: "FUNC",
                        field,
                        library: library.to_string(),
                    };
                    let nid = nid.take().filter(|n| !n.is_empty()).ok_or_else(|| missing("NID"))?;
                    let name =
                        name.take().filter(|n| !n.is_empty()).ok_or_else(|| missing("NAME"))?;
                    entries.push(NidEntry::new(nid, name, library, module, version));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}
