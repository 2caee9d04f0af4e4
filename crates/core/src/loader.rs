use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::sheet::cue::CueSheet;
use crate::sheet::normalizer::normalize_sheet;

/// Fetch-like capability for obtaining raw cue sheets by file name.
/// Implementations return parsed JSON or nothing; transport and parse
/// failures are both "nothing".
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Option<Value>;
}

/// Reads cue sheets from a directory on disk.
pub struct FsSheetSource {
    dir: PathBuf,
}

impl FsSheetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SheetSource for FsSheetSource {
    async fn fetch(&self, name: &str) -> Option<Value> {
        let path = self.dir.join(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(_) => return None,
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("unparseable cue sheet {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// Candidate file names for a slide, tried in order: the raw id, then the
/// shorter spellings derived from the `slide-AB01_SLD_003` naming scheme.
pub fn sheet_candidates(slide_id: &str) -> Vec<String> {
    let mut names = Vec::new();
    if !slide_id.is_empty() {
        names.push(format!("{}.json", slide_id));
    }

    if let Some((code, number)) = parse_slide_code(slide_id) {
        names.push(format!("{}.json", code));
        let padded = format!("0{}", number);
        names.push(format!("slide-{}.json", &padded[padded.len() - 2..]));
        names.push(format!("slide-{:03}.json", number));
    }

    let mut out = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Match ids of the form `slide-AB01_SLD_003`, yielding the inner code and
/// the slide number.
fn parse_slide_code(slide_id: &str) -> Option<(String, u32)> {
    let code = slide_id.strip_prefix("slide-")?;
    let bytes = code.as_bytes();
    if bytes.len() != 12 {
        return None;
    }
    if !(bytes[0].is_ascii_uppercase() && bytes[1].is_ascii_uppercase()) {
        return None;
    }
    if !(bytes[2].is_ascii_digit() && bytes[3].is_ascii_digit()) {
        return None;
    }
    if &code[4..9] != "_SLD_" {
        return None;
    }
    let digits = &code[9..12];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = digits.parse().ok()?;
    Some((code.to_string(), number))
}

/// Try each candidate until one fetches, then normalize the first hit.
/// Returns `None` when no candidate loads or the loaded document is not
/// sheet-shaped; the caller's simpler fallback path runs instead.
pub async fn load_cue_sheet(source: &dyn SheetSource, slide_id: &str) -> Option<CueSheet> {
    for name in sheet_candidates(slide_id) {
        if let Some(raw) = source.fetch(&name).await {
            let sheet = normalize_sheet(&raw);
            match &sheet {
                Some(sheet) => {
                    log::debug!("loaded cue sheet {} ({} cues)", name, sheet.cues.len())
                }
                None => log::debug!("cue sheet {} is not sheet-shaped", name),
            }
            return sheet;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    struct MapSheetSource {
        sheets: HashMap<String, Value>,
    }

    #[async_trait]
    impl SheetSource for MapSheetSource {
        async fn fetch(&self, name: &str) -> Option<Value> {
            self.sheets.get(name).cloned()
        }
    }

    #[test]
    fn test_candidates_for_coded_slide_id() {
        assert_eq!(
            sheet_candidates("slide-AB01_SLD_003"),
            vec![
                "slide-AB01_SLD_003.json",
                "AB01_SLD_003.json",
                "slide-03.json",
                "slide-003.json"
            ]
        );
    }

    #[test]
    fn test_candidates_for_plain_id() {
        assert_eq!(sheet_candidates("intro"), vec!["intro.json"]);
        assert!(sheet_candidates("").is_empty());
        // near-misses of the naming scheme stay as-is
        assert_eq!(sheet_candidates("slide-ab01_SLD_003").len(), 1);
        assert_eq!(sheet_candidates("slide-AB01_XXX_003").len(), 1);
    }

    #[tokio::test]
    async fn test_load_tries_candidates_in_order() {
        let mut sheets = HashMap::new();
        sheets.insert(
            "slide-03.json".to_string(),
            json!({ "cues": [{ "at": 0, "target": "title" }] }),
        );
        let source = MapSheetSource { sheets };

        let sheet = load_cue_sheet(&source, "slide-AB01_SLD_003").await.unwrap();
        assert_eq!(sheet.cues.len(), 1);
    }

    #[tokio::test]
    async fn test_load_stops_at_first_parseable_document() {
        let mut sheets = HashMap::new();
        // first candidate parses but is not sheet-shaped; later candidates
        // are not consulted
        sheets.insert("slide-AB01_SLD_003.json".to_string(), json!({ "oops": 1 }));
        sheets.insert(
            "AB01_SLD_003.json".to_string(),
            json!({ "cues": [{ "at": 0, "target": "title" }] }),
        );
        let source = MapSheetSource { sheets };

        assert!(load_cue_sheet(&source, "slide-AB01_SLD_003").await.is_none());
    }

    #[tokio::test]
    async fn test_load_missing() {
        let source = MapSheetSource {
            sheets: HashMap::new(),
        };
        assert!(load_cue_sheet(&source, "slide-AB01_SLD_003").await.is_none());
    }

    #[tokio::test]
    async fn test_fs_source_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("good.json"), r#"{"cues": []}"#).unwrap();

        let source = FsSheetSource::new(dir.path());
        assert!(source.fetch("missing.json").await.is_none());
        assert!(source.fetch("bad.json").await.is_none());
        assert!(source.fetch("good.json").await.is_some());
    }
}
